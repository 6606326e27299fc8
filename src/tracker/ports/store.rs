//! Storage port: row-level access to the users, boards, and tasks tables.
//!
//! Records carry raw column values. Validation and reference resolution
//! happen in the persistence gateway, so an adapter never rejects a row for
//! business reasons and never coerces a malformed value.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Logical tables of the tracker schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// `users(id, name, active)`
    Users,
    /// `boards(id, title, active)`
    Boards,
    /// `tasks(id, title, description, stage, difficulty, assigned_user,
    /// due_date, active, board_id)`
    Tasks,
}

impl Table {
    /// Returns the SQL table name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Boards => "boards",
            Self::Tasks => "tasks",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row visibility filter for loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Only rows with `active = true`.
    #[default]
    ActiveOnly,
    /// Every row, including soft-deleted ones.
    IncludeInactive,
}

/// Which task rows a load should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskScope {
    /// Every task row.
    All,
    /// Tasks owned by the given board key.
    Board(i64),
    /// Tasks assigned to the given user key.
    AssignedTo(i64),
}

/// Column values of a `users` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Display name.
    pub name: String,
    /// Active flag.
    pub active: bool,
}

/// Column values of a `boards` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRecord {
    /// Board title.
    pub title: String,
    /// Active flag.
    pub active: bool,
}

/// Column values of a `tasks` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    /// Owning board key.
    pub board_id: i64,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Stage code.
    pub stage: String,
    /// Difficulty score.
    pub difficulty: Option<i64>,
    /// Assignee key.
    pub assigned_user: Option<i64>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Active flag.
    pub active: bool,
}

/// A row to be written to one of the tracker tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// A `users` row.
    User(UserRecord),
    /// A `boards` row.
    Board(BoardRecord),
    /// A `tasks` row.
    Task(TaskRecord),
}

impl Row {
    /// Returns the table this row belongs to.
    #[must_use]
    pub const fn table(&self) -> Table {
        match self {
            Self::User(_) => Table::Users,
            Self::Board(_) => Table::Boards,
            Self::Task(_) => Table::Tasks,
        }
    }
}

/// A record read back together with its primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored<R> {
    /// Primary key.
    pub id: i64,
    /// Column values.
    pub record: R,
}

/// Row-level persistence contract.
///
/// Every call completes or fails synchronously. Implementations serialise
/// writes so a caller always reads its own previous write.
#[cfg_attr(test, mockall::automock)]
pub trait RecordStore {
    /// Inserts a new row and returns the key generated by storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ForeignKeyViolation`] when a referenced row
    /// does not exist, or [`StorageError::Persistence`] on engine failure.
    fn insert(&self, row: &Row) -> StorageResult<i64>;

    /// Replaces every column of the row keyed by `id`, inserting it when
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ForeignKeyViolation`] when a referenced row
    /// does not exist, or [`StorageError::Persistence`] on engine failure.
    fn upsert(&self, id: i64, row: &Row) -> StorageResult<()>;

    /// Loads `users` rows in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Persistence`] on engine failure.
    fn users(&self, visibility: Visibility) -> StorageResult<Vec<Stored<UserRecord>>>;

    /// Loads `boards` rows in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Persistence`] on engine failure.
    fn boards(&self, visibility: Visibility) -> StorageResult<Vec<Stored<BoardRecord>>>;

    /// Loads `tasks` rows in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Persistence`] on engine failure.
    fn tasks(
        &self,
        scope: TaskScope,
        visibility: Visibility,
    ) -> StorageResult<Vec<Stored<TaskRecord>>>;

    /// Clears the active flag of a row.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when no row has the key.
    fn deactivate(&self, table: Table, id: i64) -> StorageResult<()>;

    /// Clears the active flag of a user row, first moving its tasks onto
    /// `replacement` when one is given. Either both writes land or neither
    /// does.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when no user has the key and
    /// [`StorageError::ForeignKeyViolation`] when `replacement` does not
    /// exist or is the user itself.
    fn retire_user(&self, id: i64, replacement: Option<i64>) -> StorageResult<()>;

    /// Removes a task row.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when no row has the key.
    fn remove_task(&self, id: i64) -> StorageResult<()>;

    /// Removes a board row and every task row it owns, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when no board has the key.
    fn remove_board(&self, id: i64) -> StorageResult<()>;

    /// Reassigns the user's tasks to `replacement` (or unassigns them) and
    /// removes the user row, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when no user has the key and
    /// [`StorageError::ForeignKeyViolation`] when `replacement` does not
    /// exist.
    fn remove_user(&self, id: i64, replacement: Option<i64>) -> StorageResult<()>;
}

/// Errors returned by storage adapters.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// No row has the requested key.
    #[error("{table} row {id} not found")]
    NotFound {
        /// Table searched.
        table: Table,
        /// Key searched for.
        id: i64,
    },

    /// A referenced row does not exist.
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Engine or connection failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    /// Wraps an engine or connection failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
