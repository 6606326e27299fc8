//! Workflow stages and their durable string codec.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a task in its workflow.
///
/// Stages are totally ordered by progression:
/// `Backlog < ToDo < InProgress < Done < Archive`. The ordinal is only used
/// for ordering in memory; storage uses [`Stage::as_str`] codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Captured but not yet planned.
    Backlog,
    /// Planned and ready to pick up.
    #[serde(rename = "todo")]
    ToDo,
    /// Being worked on.
    InProgress,
    /// Work finished.
    Done,
    /// Retired from the active board.
    Archive,
}

impl Stage {
    /// All stages in progression order.
    pub const ALL: [Self; 5] = [
        Self::Backlog,
        Self::ToDo,
        Self::InProgress,
        Self::Done,
        Self::Archive,
    ];

    /// Returns the canonical storage code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::ToDo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Archive => "archive",
        }
    }

    /// Returns the label shown to people.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
            Self::Archive => "Archive",
        }
    }

    /// Returns the progression rank, starting at zero for `Backlog`.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Backlog => 0,
            Self::ToDo => 1,
            Self::InProgress => 2,
            Self::Done => 3,
            Self::Archive => 4,
        }
    }

    /// Returns the stage that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Backlog => Some(Self::ToDo),
            Self::ToDo => Some(Self::InProgress),
            Self::InProgress => Some(Self::Done),
            Self::Done => Some(Self::Archive),
            Self::Archive => None,
        }
    }

    /// Returns the stage that precedes this one, if any.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Backlog => None,
            Self::ToDo => Some(Self::Backlog),
            Self::InProgress => Some(Self::ToDo),
            Self::Done => Some(Self::InProgress),
            Self::Archive => Some(Self::Done),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Stage {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "backlog" => Ok(Self::Backlog),
            "todo" => Ok(Self::ToDo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "archive" => Ok(Self::Archive),
            _ => Err(ValidationError::UnknownStage(value.to_owned())),
        }
    }
}

/// Encodes a stage as its durable code.
#[must_use]
pub const fn stage_to_code(stage: Stage) -> &'static str {
    stage.as_str()
}

/// Decodes a durable stage code.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownStage`] for any unrecognised code;
/// there is no fallback stage.
pub fn code_to_stage(code: &str) -> Result<Stage, ValidationError> {
    Stage::try_from(code)
}
