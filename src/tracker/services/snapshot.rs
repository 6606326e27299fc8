//! In-memory result of a whole-graph load.

use crate::tracker::domain::{Board, BoardId, Task, User, UserId};
use std::collections::BTreeMap;

/// Loaded users indexed by durable key.
///
/// Used as the arena that task assignee references are resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserIndex {
    users: BTreeMap<UserId, User>,
}

impl UserIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a persisted user, replacing any user with the same key.
    ///
    /// Returns `false` and drops the user when it has never been saved.
    pub fn insert(&mut self, user: User) -> bool {
        let Some(id) = user.id() else {
            return false;
        };
        self.users.insert(id, user);
        true
    }

    /// Looks up a user by key.
    #[must_use]
    pub fn get(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Returns whether a user with `id` is loaded.
    #[must_use]
    pub fn contains(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }

    /// Number of loaded users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns whether no users are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Iterates users in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }
}

impl FromIterator<User> for UserIndex {
    fn from_iter<I: IntoIterator<Item = User>>(iter: I) -> Self {
        let mut index = Self::new();
        for user in iter {
            index.insert(user);
        }
        index
    }
}

/// Users, boards, and their tasks reconstructed from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerSnapshot {
    /// Loaded users.
    pub users: UserIndex,
    /// Loaded boards ordered by title then key, each owning its tasks.
    pub boards: Vec<Board>,
    /// Tasks whose board was not loaded.
    pub orphaned_tasks: Vec<Task>,
}

impl TrackerSnapshot {
    /// Looks up a loaded user.
    #[must_use]
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(id)
    }

    /// Looks up a loaded board.
    #[must_use]
    pub fn board(&self, id: BoardId) -> Option<&Board> {
        self.boards.iter().find(|board| board.id() == Some(id))
    }

    /// Resolves a task's assignee against the loaded users.
    #[must_use]
    pub fn assignee(&self, task: &Task) -> Option<&User> {
        task.assigned_user().and_then(|id| self.users.get(id))
    }

    /// Iterates every task owned by a loaded board.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.boards.iter().flat_map(Board::tasks)
    }
}
