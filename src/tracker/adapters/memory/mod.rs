//! In-memory adapters for tracker persistence.

mod store;

pub use store::InMemoryRecordStore;
