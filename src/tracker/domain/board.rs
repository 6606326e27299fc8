//! Board entity and its owned task list.

use super::{BoardId, Identifiable, IdentitySlot, Task, TaskId, Title, ValidationError};
use serde::{Deserialize, Serialize};

/// A named collection of tasks.
///
/// The board exclusively owns its in-memory task list; removing or
/// replacing tasks drops them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    id: Option<BoardId>,
    title: Title,
    active: bool,
    tasks: Vec<Task>,
}

impl Board {
    /// Creates a new, unsaved, active board with no tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty or over-long title.
    pub fn new(title: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            title: Title::new(title)?,
            active: true,
            tasks: Vec::new(),
        })
    }

    pub(crate) const fn restore(id: BoardId, title: Title, active: bool) -> Self {
        Self {
            id: Some(id),
            title,
            active,
            tasks: Vec::new(),
        }
    }

    /// Returns the durable key, if persisted.
    #[must_use]
    pub const fn id(&self) -> Option<BoardId> {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &Title {
        &self.title
    }

    /// Returns whether the board is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Replaces the title.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty or over-long title; the
    /// board is left unchanged.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), ValidationError> {
        self.title = Title::new(title)?;
        Ok(())
    }

    /// Sets the active flag.
    pub const fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Returns the tasks currently held by the board.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns mutable access to a held task by key.
    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id() == Some(id))
    }

    /// Returns a held task by key.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == Some(id))
    }

    /// Takes ownership of a task.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TaskNotActive`] for an inactive task and
    /// [`ValidationError::TaskBoardMismatch`] when the task belongs to
    /// another board or this board has not been saved.
    pub fn add_task(&mut self, task: Task) -> Result<(), ValidationError> {
        if !task.is_active() {
            return Err(ValidationError::TaskNotActive);
        }
        if self.id != Some(task.board_id()) {
            return Err(ValidationError::TaskBoardMismatch);
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Removes a task by key and hands it back to the caller.
    pub fn remove_task(&mut self, id: TaskId) -> Option<Task> {
        let position = self.tasks.iter().position(|task| task.id() == Some(id))?;
        Some(self.tasks.remove(position))
    }

    /// Replaces the whole task list, dropping the previous tasks.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Removes and returns every task held by the board.
    pub fn take_tasks(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.tasks)
    }
}

impl Identifiable for Board {
    type Id = BoardId;

    fn identity(&self) -> Option<BoardId> {
        self.id
    }
}

impl IdentitySlot for Board {
    fn identity_slot(&mut self) -> &mut Option<BoardId> {
        &mut self.id
    }
}
