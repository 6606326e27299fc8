//! Error types for tracker domain validation.

use super::{Stage, UserId};
use thiserror::Error;

/// Expected, user-triggerable failures raised while mutating domain values.
///
/// A `ValidationError` never leaves the receiver in a modified state: the
/// operation that produced it is rejected as a whole.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A board or task title is empty after trimming.
    #[error("Title can't be empty.")]
    EmptyTitle,

    /// A board or task title exceeds its character ceiling.
    #[error("Title can't exceed {max} characters (got {actual}).")]
    TitleTooLong {
        /// Maximum permitted characters.
        max: usize,
        /// Characters supplied.
        actual: usize,
    },

    /// A user display name is empty after trimming.
    #[error("Name can't be empty.")]
    EmptyName,

    /// A task description exceeds its character ceiling.
    #[error("Description can't exceed {max} characters (got {actual}).")]
    DescriptionTooLong {
        /// Maximum permitted characters.
        max: usize,
        /// Characters supplied.
        actual: usize,
    },

    /// A difficulty score lies outside `1..=5`.
    #[error("Difficulty must be a number 1 - 5 (got {0}).")]
    DifficultyOutOfRange(i64),

    /// A stored stage code is not recognised.
    #[error("unknown stage code: {0}")]
    UnknownStage(String),

    /// A durable key is zero or negative.
    #[error("invalid durable key {0}, expected a positive integer")]
    InvalidKey(i64),

    /// The task is missing fields the target stage requires.
    #[error("Task needs {requirement} for '{}' stage.", .stage.label())]
    StageRequirementsUnmet {
        /// Stage the task attempted to enter.
        stage: Stage,
        /// Human-readable list of the required fields.
        requirement: &'static str,
    },

    /// The transition would jump over an intermediate stage.
    #[error("Cannot skip '{}' stage when moving from '{}' to '{}'.", .skipped.label(), .from.label(), .to.label())]
    SkippedStage {
        /// Current stage.
        from: Stage,
        /// Requested stage.
        to: Stage,
        /// First stage that would be skipped.
        skipped: Stage,
    },

    /// The transition would move the task backwards.
    #[error("Cannot move a task back from '{}' to '{}'.", .from.label(), .to.label())]
    BackwardTransition {
        /// Current stage.
        from: Stage,
        /// Requested stage.
        to: Stage,
    },

    /// A revert was requested towards a stage that is not earlier.
    #[error("Can only revert to an earlier stage than '{}' (requested '{}').", .from.label(), .to.label())]
    InvalidRevert {
        /// Current stage.
        from: Stage,
        /// Requested stage.
        to: Stage,
    },

    /// Only active tasks may be placed on a board.
    #[error("Task must be active.")]
    TaskNotActive,

    /// The task belongs to another board, or the board has not been saved.
    #[error("Task belongs to a different board.")]
    TaskBoardMismatch,

    /// Removing the user would strand tasks that require an assignee.
    #[error("User {user} still has {tasks} task(s) that need an assignee; choose a replacement.")]
    ReplacementRequired {
        /// User being deleted.
        user: UserId,
        /// Number of affected tasks.
        tasks: usize,
    },
}

/// Errors raised while binding a storage-generated key to an entity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The entity already carries a durable key.
    #[error("entity already has durable key {existing}, refusing to bind {attempted}")]
    AlreadyAssigned {
        /// Key already held by the entity.
        existing: i64,
        /// Key that storage reported.
        attempted: i64,
    },

    /// Storage reported a key that is not a valid durable key.
    #[error("storage generated invalid key {0}")]
    InvalidKey(i64),
}
