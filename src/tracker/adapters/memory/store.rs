//! In-memory record store for tests and ephemeral sessions.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::tracker::ports::{
    BoardRecord, RecordStore, Row, StorageError, StorageResult, Stored, Table, TaskRecord,
    TaskScope, UserRecord, Visibility,
};

/// Thread-safe in-memory record store.
///
/// Keys are generated per table and never reused, matching an
/// `AUTOINCREMENT` primary key. Foreign keys are checked on every write.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    users: BTreeMap<i64, UserRecord>,
    boards: BTreeMap<i64, BoardRecord>,
    tasks: BTreeMap<i64, TaskRecord>,
    user_sequence: i64,
    board_sequence: i64,
    task_sequence: i64,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, InMemoryState>> {
        self.state
            .read()
            .map_err(|err| StorageError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, InMemoryState>> {
        self.state
            .write()
            .map_err(|err| StorageError::persistence(std::io::Error::other(err.to_string())))
    }
}

impl InMemoryState {
    fn next_key(&mut self, table: Table) -> i64 {
        let sequence = match table {
            Table::Users => &mut self.user_sequence,
            Table::Boards => &mut self.board_sequence,
            Table::Tasks => &mut self.task_sequence,
        };
        *sequence += 1;
        *sequence
    }

    fn observe_key(&mut self, table: Table, id: i64) {
        let sequence = match table {
            Table::Users => &mut self.user_sequence,
            Table::Boards => &mut self.board_sequence,
            Table::Tasks => &mut self.task_sequence,
        };
        *sequence = (*sequence).max(id);
    }

    fn check_user_exists(&self, id: i64) -> StorageResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StorageError::ForeignKeyViolation(format!(
                "users row {id} does not exist"
            )))
        }
    }

    fn check_replaceable(&self, id: i64, replacement: Option<i64>) -> StorageResult<()> {
        if !self.users.contains_key(&id) {
            return Err(StorageError::NotFound {
                table: Table::Users,
                id,
            });
        }
        if replacement == Some(id) {
            return Err(StorageError::ForeignKeyViolation(format!(
                "users row {id} cannot replace itself"
            )));
        }
        replacement.map_or(Ok(()), |target| self.check_user_exists(target))
    }

    fn check_task_references(&self, record: &TaskRecord) -> StorageResult<()> {
        if !self.boards.contains_key(&record.board_id) {
            return Err(StorageError::ForeignKeyViolation(format!(
                "boards row {} does not exist",
                record.board_id
            )));
        }
        record
            .assigned_user
            .map_or(Ok(()), |user| self.check_user_exists(user))
    }

    fn put(&mut self, id: i64, row: &Row) -> StorageResult<()> {
        match row {
            Row::User(record) => {
                self.users.insert(id, record.clone());
            }
            Row::Board(record) => {
                self.boards.insert(id, record.clone());
            }
            Row::Task(record) => {
                self.check_task_references(record)?;
                self.tasks.insert(id, record.clone());
            }
        }
        Ok(())
    }

    fn reassign(&mut self, from: i64, to: Option<i64>) -> StorageResult<usize> {
        if let Some(target) = to {
            self.check_user_exists(target)?;
        }
        let mut changed = 0;
        for record in self.tasks.values_mut() {
            if record.assigned_user == Some(from) {
                record.assigned_user = to;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

fn visible<R>(
    rows: &BTreeMap<i64, R>,
    visibility: Visibility,
    is_active: impl Fn(&R) -> bool,
) -> Vec<Stored<R>>
where
    R: Clone,
{
    rows.iter()
        .filter(|(_, record)| visibility == Visibility::IncludeInactive || is_active(record))
        .map(|(id, record)| Stored {
            id: *id,
            record: record.clone(),
        })
        .collect()
}

impl RecordStore for InMemoryRecordStore {
    fn insert(&self, row: &Row) -> StorageResult<i64> {
        let mut state = self.write()?;
        let table = row.table();
        if let Row::Task(record) = row {
            state.check_task_references(record)?;
        }
        let id = state.next_key(table);
        state.put(id, row)?;
        Ok(id)
    }

    fn upsert(&self, id: i64, row: &Row) -> StorageResult<()> {
        let mut state = self.write()?;
        state.put(id, row)?;
        state.observe_key(row.table(), id);
        Ok(())
    }

    fn users(&self, visibility: Visibility) -> StorageResult<Vec<Stored<UserRecord>>> {
        let state = self.read()?;
        Ok(visible(&state.users, visibility, |record| record.active))
    }

    fn boards(&self, visibility: Visibility) -> StorageResult<Vec<Stored<BoardRecord>>> {
        let state = self.read()?;
        Ok(visible(&state.boards, visibility, |record| record.active))
    }

    fn tasks(
        &self,
        scope: TaskScope,
        visibility: Visibility,
    ) -> StorageResult<Vec<Stored<TaskRecord>>> {
        let state = self.read()?;
        let mut rows = visible(&state.tasks, visibility, |record| record.active);
        rows.retain(|row| match scope {
            TaskScope::All => true,
            TaskScope::Board(board_id) => row.record.board_id == board_id,
            TaskScope::AssignedTo(user_id) => row.record.assigned_user == Some(user_id),
        });
        Ok(rows)
    }

    fn deactivate(&self, table: Table, id: i64) -> StorageResult<()> {
        let mut state = self.write()?;
        let active = match table {
            Table::Users => state.users.get_mut(&id).map(|record| &mut record.active),
            Table::Boards => state.boards.get_mut(&id).map(|record| &mut record.active),
            Table::Tasks => state.tasks.get_mut(&id).map(|record| &mut record.active),
        };
        let flag = active.ok_or(StorageError::NotFound { table, id })?;
        *flag = false;
        Ok(())
    }

    fn retire_user(&self, id: i64, replacement: Option<i64>) -> StorageResult<()> {
        let mut state = self.write()?;
        state.check_replaceable(id, replacement)?;
        if replacement.is_some() {
            state.reassign(id, replacement)?;
        }
        if let Some(record) = state.users.get_mut(&id) {
            record.active = false;
        }
        Ok(())
    }

    fn remove_task(&self, id: i64) -> StorageResult<()> {
        let mut state = self.write()?;
        state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound {
                table: Table::Tasks,
                id,
            })
    }

    fn remove_board(&self, id: i64) -> StorageResult<()> {
        let mut state = self.write()?;
        if state.boards.remove(&id).is_none() {
            return Err(StorageError::NotFound {
                table: Table::Boards,
                id,
            });
        }
        state.tasks.retain(|_, record| record.board_id != id);
        Ok(())
    }

    fn remove_user(&self, id: i64, replacement: Option<i64>) -> StorageResult<()> {
        let mut state = self.write()?;
        state.check_replaceable(id, replacement)?;
        state.reassign(id, replacement)?;
        state.users.remove(&id);
        Ok(())
    }
}
