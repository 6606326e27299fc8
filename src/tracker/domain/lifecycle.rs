//! Stage transition guards for tasks.
//!
//! Every transition is checked against two kinds of guard:
//!
//! - **Field guards**: the task must carry the fields the target stage
//!   needs. These always apply, including when a row is being restored from
//!   storage.
//! - **Order guards**: the target must be reachable from the current stage
//!   under the configured [`StageOrdering`]. Rows restored from storage skip
//!   this check because they reached their stage through earlier validated
//!   transitions.

use super::{Stage, Task, ValidationError};
use serde::{Deserialize, Serialize};

/// How far a single edit may move a task through the workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOrdering {
    /// Each stage is entered only from its immediate predecessor.
    #[default]
    Sequential,
    /// Any forward move is allowed, including skips; never backwards.
    Forward,
    /// Any stage may be assigned directly.
    Unrestricted,
}

/// Where a requested transition comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionOrigin {
    /// A user edit; all guards apply.
    Edit,
    /// A row restored from storage; order guards are bypassed.
    Storage,
}

/// Deployment-level configuration of the task lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecyclePolicy {
    /// Ordering rule applied to edits.
    pub ordering: StageOrdering,
    /// Whether entering `InProgress` also needs an assignee and a due date.
    pub in_progress_requires_assignment: bool,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self::strict()
    }
}

impl LifecyclePolicy {
    /// Sequential advance with the full `InProgress` field guard.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            ordering: StageOrdering::Sequential,
            in_progress_requires_assignment: true,
        }
    }

    /// Sequential advance where `InProgress` only needs a description and a
    /// difficulty.
    #[must_use]
    pub const fn relaxed() -> Self {
        Self {
            ordering: StageOrdering::Sequential,
            in_progress_requires_assignment: false,
        }
    }

    /// Returns this policy with a different ordering rule.
    #[must_use]
    pub const fn with_ordering(mut self, ordering: StageOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Returns whether a task in `stage` must keep an assigned user.
    #[must_use]
    pub const fn requires_assignee(&self, stage: Stage) -> bool {
        matches!(stage, Stage::InProgress) && self.in_progress_requires_assignment
    }

    /// Checks whether `task` may enter `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::StageRequirementsUnmet`] when a field guard
    /// fails, and [`ValidationError::SkippedStage`] or
    /// [`ValidationError::BackwardTransition`] when an order guard fails for
    /// an [`TransitionOrigin::Edit`].
    pub fn can_enter(
        &self,
        target: Stage,
        task: &Task,
        origin: TransitionOrigin,
    ) -> Result<(), ValidationError> {
        self.check_fields(target, task)?;
        match origin {
            TransitionOrigin::Storage => Ok(()),
            TransitionOrigin::Edit => self.check_order(task.stage(), target),
        }
    }

    fn check_fields(&self, target: Stage, task: &Task) -> Result<(), ValidationError> {
        let has_basics = !task.description().is_empty() && task.difficulty().is_some();
        let (satisfied, requirement) = match target {
            Stage::ToDo => (has_basics, "description and difficulty"),
            Stage::InProgress if self.in_progress_requires_assignment => (
                has_basics && task.assigned_user().is_some() && task.due_date().is_some(),
                "description, difficulty, an assigned user and a due date",
            ),
            Stage::InProgress => (has_basics, "description and difficulty"),
            Stage::Backlog | Stage::Done | Stage::Archive => (true, ""),
        };
        if satisfied {
            Ok(())
        } else {
            Err(ValidationError::StageRequirementsUnmet {
                stage: target,
                requirement,
            })
        }
    }

    fn check_order(&self, from: Stage, to: Stage) -> Result<(), ValidationError> {
        if from == to || self.ordering == StageOrdering::Unrestricted {
            return Ok(());
        }
        if to < from {
            return Err(ValidationError::BackwardTransition { from, to });
        }
        match (self.ordering, from.next()) {
            (StageOrdering::Sequential, Some(next)) if next != to => {
                Err(ValidationError::SkippedStage {
                    from,
                    to,
                    skipped: next,
                })
            }
            _ => Ok(()),
        }
    }
}
