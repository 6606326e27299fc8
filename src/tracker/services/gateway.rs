//! Persistence gateway: maps entities to storage rows and rebuilds the
//! entity graph from them.
//!
//! Graph reconstruction runs in two passes. Users and boards are loaded
//! first and indexed by key; tasks are then loaded and their references
//! resolved by lookup into that index. A reference to a user or board that
//! was not loaded is left unset rather than failing the load.

use super::snapshot::{TrackerSnapshot, UserIndex};
use crate::tracker::config::{DeletePolicy, HydrationMode, TrackerConfig};
use crate::tracker::domain::{
    Board, BoardId, DisplayName, DurableKey, IdentityError, IdentitySlot, LifecyclePolicy,
    PersistedTaskData, SortKey, Stage, Task, TaskId, Title, TransitionOrigin, User, UserId,
    ValidationError, assign_identity, code_to_stage, sort_boards, sort_tasks, stage_to_code,
};
use crate::tracker::ports::{
    BoardRecord, RecordStore, Row, StorageError, Stored, Table, TaskRecord, TaskScope,
    UserRecord, Visibility,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// A stored row that could not be turned back into an entity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("corrupt {table} row {id}: {reason}")]
pub struct CorruptRecordError {
    /// Table the row came from.
    pub table: Table,
    /// Key of the row.
    pub id: i64,
    /// Domain rule the row violates.
    pub reason: ValidationError,
}

/// Errors returned by gateway operations.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// A field value or stage transition was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Storage rejected or failed the operation.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A row failed hydration under strict hydration.
    #[error(transparent)]
    Corrupt(#[from] CorruptRecordError),
    /// Storage returned a key that could not be bound to the entity.
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// The operation needs an entity that has been saved at least once.
    #[error("{0} entity has not been saved yet")]
    NotPersisted(Table),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// An entity with a row representation in one tracker table.
pub(crate) trait Persistable: IdentitySlot {
    const TABLE: Table;

    fn to_row(&self) -> Row;
}

impl Persistable for User {
    const TABLE: Table = Table::Users;

    fn to_row(&self) -> Row {
        Row::User(UserRecord {
            name: self.name().as_str().to_owned(),
            active: self.is_active(),
        })
    }
}

impl Persistable for Board {
    const TABLE: Table = Table::Boards;

    fn to_row(&self) -> Row {
        Row::Board(BoardRecord {
            title: self.title().as_str().to_owned(),
            active: self.is_active(),
        })
    }
}

impl Persistable for Task {
    const TABLE: Table = Table::Tasks;

    fn to_row(&self) -> Row {
        Row::Task(TaskRecord {
            board_id: self.board_id().value(),
            title: self.title().as_str().to_owned(),
            description: self.description().as_str().to_owned(),
            stage: stage_to_code(self.stage()).to_owned(),
            difficulty: self.difficulty().map(|score| i64::from(score.value())),
            assigned_user: self.assigned_user().map(UserId::value),
            due_date: self.due_date(),
            active: self.is_active(),
        })
    }
}

/// Maps users, boards, and tasks to storage and back.
#[derive(Debug)]
pub struct PersistenceGateway<S>
where
    S: RecordStore,
{
    store: Arc<S>,
    delete_policy: DeletePolicy,
    hydration: HydrationMode,
    lifecycle: LifecyclePolicy,
}

impl<S> Clone for PersistenceGateway<S>
where
    S: RecordStore,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            delete_policy: self.delete_policy,
            hydration: self.hydration,
            lifecycle: self.lifecycle,
        }
    }
}

impl<S> PersistenceGateway<S>
where
    S: RecordStore,
{
    /// Creates a gateway with the policies from `config`.
    #[must_use]
    pub fn new(store: Arc<S>, config: &TrackerConfig) -> Self {
        Self {
            store,
            delete_policy: config.delete_policy,
            hydration: config.hydration,
            lifecycle: config.lifecycle,
        }
    }

    /// Creates a gateway with default policies.
    #[must_use]
    pub fn with_defaults(store: Arc<S>) -> Self {
        Self::new(store, &TrackerConfig::default())
    }

    /// Returns the lifecycle policy applied to transitions and loads.
    #[must_use]
    pub const fn lifecycle(&self) -> &LifecyclePolicy {
        &self.lifecycle
    }

    /// Returns the configured deletion policy.
    #[must_use]
    pub const fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    /// Returns the underlying record store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Saves a user, assigning its key on first save.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] when the write fails; the user is
    /// left unchanged.
    pub fn save_user(&self, user: &mut User) -> GatewayResult<UserId> {
        self.save_entity(user)
    }

    /// Saves a board row, assigning its key on first save.
    ///
    /// The board's tasks are saved individually with [`Self::save_task`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] when the write fails; the board is
    /// left unchanged.
    pub fn save_board(&self, board: &mut Board) -> GatewayResult<BoardId> {
        self.save_entity(board)
    }

    /// Saves a task, assigning its key on first save.
    ///
    /// The task's stage is re-checked against the field guards first, so a
    /// row that could not be loaded back is never written.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when the stage's field guard
    /// fails and [`GatewayError::Storage`] when the write fails, including a
    /// [`StorageError::ForeignKeyViolation`] for a missing board or user.
    pub fn save_task(&self, task: &mut Task) -> GatewayResult<TaskId> {
        self.lifecycle
            .can_enter(task.stage(), task, TransitionOrigin::Storage)?;
        self.save_entity(task)
    }

    /// Moves a task to `target` and saves it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when a lifecycle guard rejects
    /// the move, or the save error. In both cases the task keeps its previous
    /// stage.
    pub fn transition_task(&self, task: &mut Task, target: Stage) -> GatewayResult<TaskId> {
        let previous = task.stage();
        task.advance_to(target, &self.lifecycle)?;
        self.save_task(task).inspect_err(|_| task.restore_stage(previous))
    }

    /// Loads users in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] when the query fails, or
    /// [`GatewayError::Corrupt`] for a malformed row under strict hydration.
    pub fn load_users(&self, visibility: Visibility) -> GatewayResult<Vec<User>> {
        let rows = self.store.users(visibility)?;
        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            if let Some(user) = self.hydrate(Table::Users, id, hydrate_user(row))? {
                users.push(user);
            }
        }
        Ok(users)
    }

    /// Loads boards ordered by title, then key. Their task lists are empty.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] when the query fails, or
    /// [`GatewayError::Corrupt`] for a malformed row under strict hydration.
    pub fn load_boards(&self, visibility: Visibility) -> GatewayResult<Vec<Board>> {
        let rows = self.store.boards(visibility)?;
        let mut boards = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            if let Some(board) = self.hydrate(Table::Boards, id, hydrate_board(row))? {
                boards.push(board);
            }
        }
        sort_boards(&mut boards);
        Ok(boards)
    }

    /// Loads the tasks of one board ordered by stage, then key.
    ///
    /// Assignees not present in `users` are cleared on the loaded task.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotPersisted`] for an unsaved board,
    /// [`GatewayError::Storage`] when the query fails, or
    /// [`GatewayError::Corrupt`] for a malformed row under strict hydration.
    pub fn load_tasks(
        &self,
        board: &Board,
        users: &UserIndex,
        visibility: Visibility,
    ) -> GatewayResult<Vec<Task>> {
        let board_id = board.id().ok_or(GatewayError::NotPersisted(Table::Boards))?;
        self.load_task_rows(TaskScope::Board(board_id.value()), users, visibility)
    }

    /// Rebuilds users, boards, and tasks in two passes.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] when a query fails, or
    /// [`GatewayError::Corrupt`] for a malformed row under strict hydration.
    pub fn load_graph(&self, visibility: Visibility) -> GatewayResult<TrackerSnapshot> {
        let users: UserIndex = self.load_users(visibility)?.into_iter().collect();
        let mut boards = self.load_boards(visibility)?;

        let mut by_board: BTreeMap<BoardId, Vec<Task>> = BTreeMap::new();
        for task in self.load_task_rows(TaskScope::All, &users, visibility)? {
            by_board.entry(task.board_id()).or_default().push(task);
        }
        for board in &mut boards {
            if let Some(tasks) = board.id().and_then(|id| by_board.remove(&id)) {
                board.replace_tasks(tasks);
            }
        }
        let orphaned_tasks: Vec<Task> = by_board.into_values().flatten().collect();
        if !orphaned_tasks.is_empty() {
            debug!(
                count = orphaned_tasks.len(),
                "loaded tasks whose board is not loaded"
            );
        }

        let mut snapshot = TrackerSnapshot {
            users,
            boards,
            orphaned_tasks,
        };
        sort_tasks(&mut snapshot.orphaned_tasks, SortKey::Stage);
        Ok(snapshot)
    }

    /// Deletes a task according to the configured policy.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotPersisted`] for an unsaved task, or
    /// [`GatewayError::Storage`] when the row is missing or the write fails.
    pub fn delete_task(&self, task: &mut Task) -> GatewayResult<()> {
        let id = task.id().ok_or(GatewayError::NotPersisted(Table::Tasks))?;
        match self.delete_policy {
            DeletePolicy::Hard => self.store.remove_task(id.value())?,
            DeletePolicy::Soft => {
                self.store.deactivate(Table::Tasks, id.value())?;
                task.set_active(false);
            }
        }
        debug!(id = id.value(), policy = ?self.delete_policy, "deleted task");
        Ok(())
    }

    /// Deletes a board according to the configured policy.
    ///
    /// A hard delete removes the board's task rows in the same transaction
    /// and empties the in-memory task list. A soft delete leaves task rows
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotPersisted`] for an unsaved board, or
    /// [`GatewayError::Storage`] when the row is missing or the write fails.
    pub fn delete_board(&self, board: &mut Board) -> GatewayResult<()> {
        let id = board.id().ok_or(GatewayError::NotPersisted(Table::Boards))?;
        match self.delete_policy {
            DeletePolicy::Hard => {
                self.store.remove_board(id.value())?;
                board.take_tasks();
            }
            DeletePolicy::Soft => {
                self.store.deactivate(Table::Boards, id.value())?;
                board.set_active(false);
            }
        }
        debug!(id = id.value(), policy = ?self.delete_policy, "deleted board");
        Ok(())
    }

    /// Deletes a user according to the configured policy.
    ///
    /// With a `replacement`, the user's tasks are reassigned to it. Without
    /// one, a hard delete unassigns the tasks and a soft delete leaves them
    /// pointing at the inactive user.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ReplacementRequired`] when a hard delete
    /// without replacement would unassign a task whose stage needs an
    /// assignee, [`GatewayError::NotPersisted`] for an unsaved user, or
    /// [`GatewayError::Storage`] when the replacement does not exist or the
    /// write fails.
    pub fn delete_user(&self, user: &mut User, replacement: Option<UserId>) -> GatewayResult<()> {
        let id = user.id().ok_or(GatewayError::NotPersisted(Table::Users))?;
        let replacement_key = replacement.map(UserId::value);
        match self.delete_policy {
            DeletePolicy::Hard => {
                if replacement.is_none() {
                    self.ensure_no_stranded_tasks(id)?;
                }
                self.store.remove_user(id.value(), replacement_key)?;
            }
            DeletePolicy::Soft => {
                self.store.retire_user(id.value(), replacement_key)?;
                user.set_active(false);
            }
        }
        debug!(
            id = id.value(),
            replacement = ?replacement_key,
            policy = ?self.delete_policy,
            "deleted user"
        );
        Ok(())
    }

    fn save_entity<E>(&self, entity: &mut E) -> GatewayResult<E::Id>
    where
        E: Persistable,
    {
        let row = entity.to_row();
        if let Some(id) = entity.identity() {
            self.store.upsert(id.key(), &row)?;
            debug!(table = %E::TABLE, id = id.key(), "updated row");
            return Ok(id);
        }
        let key = self.store.insert(&row)?;
        let id = assign_identity(entity, key)?;
        debug!(table = %E::TABLE, id = key, "inserted row");
        Ok(id)
    }

    fn ensure_no_stranded_tasks(&self, user: UserId) -> GatewayResult<()> {
        let assigned = self
            .store
            .tasks(TaskScope::AssignedTo(user.value()), Visibility::IncludeInactive)?;
        let stranded = assigned
            .iter()
            .filter(|row| {
                code_to_stage(&row.record.stage)
                    .is_ok_and(|stage| self.lifecycle.requires_assignee(stage))
            })
            .count();
        if stranded > 0 {
            return Err(ValidationError::ReplacementRequired {
                user,
                tasks: stranded,
            }
            .into());
        }
        Ok(())
    }

    fn load_task_rows(
        &self,
        scope: TaskScope,
        users: &UserIndex,
        visibility: Visibility,
    ) -> GatewayResult<Vec<Task>> {
        let rows = self.store.tasks(scope, visibility)?;
        let mut tasks = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            let hydrated = hydrate_task(row, &self.lifecycle);
            let Some(mut task) = self.hydrate(Table::Tasks, id, hydrated)? else {
                continue;
            };
            if task
                .assigned_user()
                .is_some_and(|assignee| !users.contains(assignee))
            {
                task.set_assigned_user(None);
            }
            tasks.push(task);
        }
        sort_tasks(&mut tasks, SortKey::Stage);
        Ok(tasks)
    }

    fn hydrate<T>(
        &self,
        table: Table,
        id: i64,
        result: Result<T, ValidationError>,
    ) -> GatewayResult<Option<T>> {
        match (result, self.hydration) {
            (Ok(entity), _) => Ok(Some(entity)),
            (Err(reason), HydrationMode::Strict) => {
                Err(CorruptRecordError { table, id, reason }.into())
            }
            (Err(reason), HydrationMode::SkipAndLog) => {
                warn!(%table, id, %reason, "skipping corrupt record");
                Ok(None)
            }
        }
    }
}

fn hydrate_user(row: Stored<UserRecord>) -> Result<User, ValidationError> {
    let Stored { id: key, record } = row;
    let id = UserId::new(key)?;
    let name = DisplayName::new(record.name)?;
    Ok(User::restore(id, name, record.active))
}

fn hydrate_board(row: Stored<BoardRecord>) -> Result<Board, ValidationError> {
    let Stored { id: key, record } = row;
    let id = BoardId::new(key)?;
    let title = Title::new(record.title)?;
    Ok(Board::restore(id, title, record.active))
}

fn hydrate_task(row: Stored<TaskRecord>, policy: &LifecyclePolicy) -> Result<Task, ValidationError> {
    let Stored { id: key, record } = row;
    let data = PersistedTaskData {
        id: TaskId::new(key)?,
        board_id: BoardId::new(record.board_id)?,
        title: record.title,
        description: record.description,
        stage: record.stage,
        difficulty: record.difficulty,
        assigned_user: record.assigned_user.map(UserId::new).transpose()?,
        due_date: record.due_date,
        active: record.active,
    };
    Task::from_persisted(data, policy)
}
