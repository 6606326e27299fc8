//! Deployment configuration for the tracker.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration and a partial one only overrides what it names.

use super::domain::LifecyclePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What deleting an entity does to its row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// The row is removed. Board removal cascades to its tasks.
    Hard,
    /// The row's active flag is cleared and default loads skip it.
    #[default]
    Soft,
}

/// How a load reacts to a row that fails hydration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrationMode {
    /// Drop the row from the result and log a warning.
    #[default]
    SkipAndLog,
    /// Fail the whole load on the first corrupt row.
    Strict,
}

/// Tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// `SQLite` database path, or `:memory:`.
    pub database_url: String,
    /// Deletion behaviour for users, boards, and tasks.
    pub delete_policy: DeletePolicy,
    /// Corrupt row handling during loads.
    pub hydration: HydrationMode,
    /// Stage transition rules.
    pub lifecycle: LifecyclePolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_url: "kanban.db".to_owned(),
            delete_policy: DeletePolicy::default(),
            hydration: HydrationMode::default(),
            lifecycle: LifecyclePolicy::default(),
        }
    }
}

impl TrackerConfig {
    /// Configuration for an in-memory database with default policies.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            database_url: ":memory:".to_owned(),
            ..Self::default()
        }
    }

    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown enum
    /// values.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, or
    /// [`ConfigError::Parse`] when its contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&document)
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read tracker config {}: {source}", .path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration document is not valid.
    #[error("invalid tracker config: {0}")]
    Parse(#[from] serde_json::Error),
}
