//! Personal task tracking: users, boards, and staged tasks.
//!
//! Tasks move through a fixed workflow (`Backlog`, `ToDo`, `InProgress`,
//! `Done`, `Archive`) guarded by [`domain::LifecyclePolicy`]. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The persistence gateway in [`services`]
//! - Deployment settings in [`config`]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;
