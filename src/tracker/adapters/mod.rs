//! Adapter implementations for tracker persistence ports.

pub mod memory;
pub mod sqlite;
