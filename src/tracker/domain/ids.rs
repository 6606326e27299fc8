//! Durable key types assigned by storage.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// A positive, storage-generated key identifying a persisted entity.
pub trait DurableKey: Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display {
    /// Validates a raw storage key.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidKey`] when the value is not positive.
    fn from_key(value: i64) -> Result<Self, ValidationError>;

    /// Returns the raw storage key.
    fn key(self) -> i64;
}

macro_rules! durable_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Creates a key from a storage-generated value.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::InvalidKey`] when the value is zero
            /// or negative.
            pub const fn new(value: i64) -> Result<Self, ValidationError> {
                if value <= 0 {
                    return Err(ValidationError::InvalidKey(value));
                }
                Ok(Self(value))
            }

            /// Returns the underlying storage key.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl DurableKey for $name {
            fn from_key(value: i64) -> Result<Self, ValidationError> {
                Self::new(value)
            }

            fn key(self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = ValidationError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

durable_key!(
    /// Durable key of a persisted user.
    UserId
);

durable_key!(
    /// Durable key of a persisted board.
    BoardId
);

durable_key!(
    /// Durable key of a persisted task.
    TaskId
);
