//! Application services for tracker persistence.

mod gateway;
mod snapshot;

pub use gateway::{CorruptRecordError, GatewayError, GatewayResult, PersistenceGateway};
pub use snapshot::{TrackerSnapshot, UserIndex};
