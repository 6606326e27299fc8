//! Port contracts for tracker persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by the gateway.

pub mod store;

pub use store::{
    BoardRecord, RecordStore, Row, StorageError, StorageResult, Stored, Table, TaskRecord,
    TaskScope, UserRecord, Visibility,
};
