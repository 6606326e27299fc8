//! Task entity and its lifecycle operations.

use super::{
    BoardId, Description, Difficulty, Identifiable, IdentitySlot, LifecyclePolicy, Stage, TaskId,
    Title, TransitionOrigin, UserId, ValidationError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of work on a board.
///
/// A task always belongs to a persisted board. The assigned user is a weak
/// reference: the task stores the user's key, never the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: Option<TaskId>,
    board_id: BoardId,
    title: Title,
    description: Description,
    stage: Stage,
    difficulty: Option<Difficulty>,
    assigned_user: Option<UserId>,
    due_date: Option<DateTime<Utc>>,
    active: bool,
}

/// Field values read back from storage, before validation.
///
/// Converted into a [`Task`] by [`Task::from_persisted`], which applies
/// every domain rule except the stage order guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PersistedTaskData {
    /// Persisted task key.
    pub id: TaskId,
    /// Owning board key.
    pub board_id: BoardId,
    /// Stored title.
    pub title: String,
    /// Stored description.
    pub description: String,
    /// Stored stage code.
    pub stage: String,
    /// Stored difficulty score.
    pub difficulty: Option<i64>,
    /// Stored assignee key.
    pub assigned_user: Option<UserId>,
    /// Stored due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Stored active flag.
    pub active: bool,
}

impl Task {
    /// Creates a new, unsaved task in the `Backlog` stage.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTitle`] or
    /// [`ValidationError::TitleTooLong`] for an invalid title.
    pub fn new(board_id: BoardId, title: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            board_id,
            title: Title::new(title)?,
            description: Description::default(),
            stage: Stage::Backlog,
            difficulty: None,
            assigned_user: None,
            due_date: None,
            active: true,
        })
    }

    /// Rebuilds a task from stored fields.
    ///
    /// The stage is entered with [`TransitionOrigin::Storage`], so field
    /// guards still apply while the order guard is bypassed.
    pub(crate) fn from_persisted(
        data: PersistedTaskData,
        policy: &LifecyclePolicy,
    ) -> Result<Self, ValidationError> {
        let stage = Stage::try_from(data.stage.as_str())?;
        let difficulty = data.difficulty.map(Difficulty::new).transpose()?;
        let mut task = Self {
            id: Some(data.id),
            board_id: data.board_id,
            title: Title::new(data.title)?,
            description: Description::new(data.description)?,
            stage: Stage::Backlog,
            difficulty,
            assigned_user: data.assigned_user,
            due_date: data.due_date,
            active: data.active,
        };
        policy.can_enter(stage, &task, TransitionOrigin::Storage)?;
        task.stage = stage;
        Ok(task)
    }

    /// Returns the durable key, if persisted.
    #[must_use]
    pub const fn id(&self) -> Option<TaskId> {
        self.id
    }

    /// Returns the owning board key.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &Title {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub const fn description(&self) -> &Description {
        &self.description
    }

    /// Returns the current stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the difficulty score, if set.
    #[must_use]
    pub const fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    /// Returns the assignee key, if any.
    #[must_use]
    pub const fn assigned_user(&self) -> Option<UserId> {
        self.assigned_user
    }

    /// Returns the due date, if set.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns whether the task is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Replaces the title.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty or over-long title; the task
    /// is left unchanged.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), ValidationError> {
        self.title = Title::new(title)?;
        Ok(())
    }

    /// Replaces the description.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DescriptionTooLong`] above 500 characters.
    pub fn set_description(
        &mut self,
        description: impl Into<String>,
    ) -> Result<(), ValidationError> {
        self.description = Description::new(description)?;
        Ok(())
    }

    /// Sets the difficulty score.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DifficultyOutOfRange`] unless
    /// `1 <= score <= 5`.
    pub fn set_difficulty_score(&mut self, score: i64) -> Result<(), ValidationError> {
        self.difficulty = Some(Difficulty::new(score)?);
        Ok(())
    }

    /// Sets or clears the assignee.
    pub const fn set_assigned_user(&mut self, user: Option<UserId>) {
        self.assigned_user = user;
    }

    /// Sets or clears the due date.
    pub const fn set_due_date(&mut self, due_date: Option<DateTime<Utc>>) {
        self.due_date = due_date;
    }

    /// Sets the active flag.
    pub const fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Moves the task to `target` if the lifecycle guards allow it.
    ///
    /// # Errors
    ///
    /// Returns the guard's [`ValidationError`]; the stage is unchanged.
    pub fn advance_to(
        &mut self,
        target: Stage,
        policy: &LifecyclePolicy,
    ) -> Result<(), ValidationError> {
        policy.can_enter(target, self, TransitionOrigin::Edit)?;
        self.stage = target;
        Ok(())
    }

    /// Moves the task back to an earlier stage without field guards.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRevert`] unless `target` is strictly
    /// earlier than the current stage.
    pub fn revert_to(&mut self, target: Stage) -> Result<(), ValidationError> {
        if target >= self.stage {
            return Err(ValidationError::InvalidRevert {
                from: self.stage,
                to: target,
            });
        }
        self.stage = target;
        Ok(())
    }

    pub(crate) const fn restore_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }
}

impl Identifiable for Task {
    type Id = TaskId;

    fn identity(&self) -> Option<TaskId> {
        self.id
    }
}

impl IdentitySlot for Task {
    fn identity_slot(&mut self) -> &mut Option<TaskId> {
        &mut self.id
    }
}
