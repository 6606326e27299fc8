//! `SQLite` record store for tracker persistence.

use super::{
    models::{BoardRow, BoardValues, TaskRow, TaskValues, UserRow, UserValues},
    schema::{boards, tasks, users},
};
use crate::tracker::ports::{
    BoardRecord, RecordStore, Row, StorageError, StorageResult, Stored, Table, TaskRecord,
    TaskScope, UserRecord, Visibility,
};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use tracing::{debug, info};

/// `SQLite` connection pool type used by the tracker store.
pub type TrackerSqlitePool = Pool<ConnectionManager<SqliteConnection>>;

const SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-03-01-000000_create_tracker_tables/up.sql");
const DROP_SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-03-01-000000_create_tracker_tables/down.sql");

/// Turns on foreign key enforcement for every pooled connection.
#[derive(Debug, Clone, Copy)]
struct EnforceForeignKeys;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for EnforceForeignKeys {
    fn on_acquire(&self, connection: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        connection
            .batch_execute("PRAGMA foreign_keys = ON;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// `SQLite`-backed record store.
///
/// The pool holds a single long-lived connection, so writes are serialised
/// and `:memory:` databases survive for the lifetime of the store.
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: TrackerSqlitePool,
}

impl SqliteRecordStore {
    /// Opens (or creates) the database at `database_url` and applies the
    /// tracker schema.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Persistence`] when the database cannot be
    /// opened or the schema cannot be applied.
    pub fn open(database_url: &str) -> StorageResult<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(1)
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None)
            .connection_customizer(Box::new(EnforceForeignKeys))
            .build(manager)
            .map_err(StorageError::persistence)?;
        let store = Self::from_pool(pool);
        store.apply_schema()?;
        info!(database_url, "opened tracker database");
        Ok(store)
    }

    /// Wraps an existing pool without touching the schema.
    #[must_use]
    pub const fn from_pool(pool: TrackerSqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the tracker tables when they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Persistence`] when the DDL fails.
    pub fn apply_schema(&self) -> StorageResult<()> {
        self.run(|connection| {
            connection
                .batch_execute(SCHEMA_SQL)
                .map_err(StorageError::persistence)
        })
    }

    /// Drops every tracker table and recreates them empty, in one
    /// transaction. Key sequences restart from one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Persistence`] when the DDL fails; the
    /// previous contents are kept in that case.
    pub fn reset_schema(&self) -> StorageResult<()> {
        self.run(|connection| {
            connection.transaction::<_, StorageError, _>(|tx| {
                tx.batch_execute(DROP_SCHEMA_SQL)
                    .map_err(StorageError::persistence)?;
                tx.batch_execute(SCHEMA_SQL)
                    .map_err(StorageError::persistence)
            })
        })?;
        info!("reset tracker schema");
        Ok(())
    }

    fn run<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut SqliteConnection) -> StorageResult<T>,
    {
        let mut connection = self.pool.get().map_err(StorageError::persistence)?;
        f(&mut connection)
    }
}

impl From<DieselError> for StorageError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::ForeignKeyViolation(info.message().to_owned())
            }
            other => Self::persistence(other),
        }
    }
}

impl RecordStore for SqliteRecordStore {
    fn insert(&self, row: &Row) -> StorageResult<i64> {
        let id = self.run(|connection| {
            let id: i64 = match row {
                Row::User(record) => diesel::insert_into(users::table)
                    .values(&user_values(record))
                    .returning(users::id)
                    .get_result(connection)?,
                Row::Board(record) => diesel::insert_into(boards::table)
                    .values(&board_values(record))
                    .returning(boards::id)
                    .get_result(connection)?,
                Row::Task(record) => diesel::insert_into(tasks::table)
                    .values(&task_values(record))
                    .returning(tasks::id)
                    .get_result(connection)?,
            };
            Ok(id)
        })?;
        debug!(table = %row.table(), id, "inserted row");
        Ok(id)
    }

    fn upsert(&self, id: i64, row: &Row) -> StorageResult<()> {
        self.run(|connection| {
            match row {
                Row::User(record) => {
                    let values = user_values(record);
                    diesel::insert_into(users::table)
                        .values((users::id.eq(id), &values))
                        .on_conflict(users::id)
                        .do_update()
                        .set(&values)
                        .execute(connection)?
                }
                Row::Board(record) => {
                    let values = board_values(record);
                    diesel::insert_into(boards::table)
                        .values((boards::id.eq(id), &values))
                        .on_conflict(boards::id)
                        .do_update()
                        .set(&values)
                        .execute(connection)?
                }
                Row::Task(record) => {
                    let values = task_values(record);
                    diesel::insert_into(tasks::table)
                        .values((tasks::id.eq(id), &values))
                        .on_conflict(tasks::id)
                        .do_update()
                        .set(&values)
                        .execute(connection)?
                }
            };
            Ok(())
        })?;
        debug!(table = %row.table(), id, "upserted row");
        Ok(())
    }

    fn users(&self, visibility: Visibility) -> StorageResult<Vec<Stored<UserRecord>>> {
        self.run(|connection| {
            let mut query = users::table
                .select(UserRow::as_select())
                .order(users::id.asc())
                .into_boxed();
            if visibility == Visibility::ActiveOnly {
                query = query.filter(users::active.eq(true));
            }
            let rows = query.load::<UserRow>(connection)?;
            Ok(rows.into_iter().map(row_to_user).collect())
        })
    }

    fn boards(&self, visibility: Visibility) -> StorageResult<Vec<Stored<BoardRecord>>> {
        self.run(|connection| {
            let mut query = boards::table
                .select(BoardRow::as_select())
                .order(boards::id.asc())
                .into_boxed();
            if visibility == Visibility::ActiveOnly {
                query = query.filter(boards::active.eq(true));
            }
            let rows = query.load::<BoardRow>(connection)?;
            Ok(rows.into_iter().map(row_to_board).collect())
        })
    }

    fn tasks(
        &self,
        scope: TaskScope,
        visibility: Visibility,
    ) -> StorageResult<Vec<Stored<TaskRecord>>> {
        self.run(|connection| {
            let mut query = tasks::table
                .select(TaskRow::as_select())
                .order(tasks::id.asc())
                .into_boxed();
            match scope {
                TaskScope::All => {}
                TaskScope::Board(board_id) => query = query.filter(tasks::board_id.eq(board_id)),
                TaskScope::AssignedTo(user_id) => {
                    query = query.filter(tasks::assigned_user.eq(user_id));
                }
            }
            if visibility == Visibility::ActiveOnly {
                query = query.filter(tasks::active.eq(true));
            }
            let rows = query.load::<TaskRow>(connection)?;
            Ok(rows.into_iter().map(row_to_task).collect())
        })
    }

    fn deactivate(&self, table: Table, id: i64) -> StorageResult<()> {
        let changed = self.run(|connection| {
            let changed = match table {
                Table::Users => diesel::update(users::table.find(id))
                    .set(users::active.eq(false))
                    .execute(connection)?,
                Table::Boards => diesel::update(boards::table.find(id))
                    .set(boards::active.eq(false))
                    .execute(connection)?,
                Table::Tasks => diesel::update(tasks::table.find(id))
                    .set(tasks::active.eq(false))
                    .execute(connection)?,
            };
            Ok(changed)
        })?;
        if changed == 0 {
            return Err(StorageError::NotFound { table, id });
        }
        debug!(%table, id, "deactivated row");
        Ok(())
    }

    fn retire_user(&self, id: i64, replacement: Option<i64>) -> StorageResult<()> {
        let reassigned = self.run(|connection| {
            connection.transaction::<_, StorageError, _>(|tx| {
                ensure_replaceable(tx, id, replacement)?;
                let reassigned = if replacement.is_some() {
                    reassign(tx, id, replacement)?
                } else {
                    0
                };
                diesel::update(users::table.find(id))
                    .set(users::active.eq(false))
                    .execute(tx)?;
                Ok(reassigned)
            })
        })?;
        debug!(id, ?replacement, reassigned, "retired user row");
        Ok(())
    }

    fn remove_task(&self, id: i64) -> StorageResult<()> {
        let removed =
            self.run(|connection| Ok(diesel::delete(tasks::table.find(id)).execute(connection)?))?;
        if removed == 0 {
            return Err(StorageError::NotFound {
                table: Table::Tasks,
                id,
            });
        }
        debug!(id, "removed task row");
        Ok(())
    }

    fn remove_board(&self, id: i64) -> StorageResult<()> {
        let cascaded = self.run(|connection| {
            connection.transaction::<_, StorageError, _>(|tx| {
                let cascaded =
                    diesel::delete(tasks::table.filter(tasks::board_id.eq(id))).execute(tx)?;
                let removed = diesel::delete(boards::table.find(id)).execute(tx)?;
                if removed == 0 {
                    return Err(StorageError::NotFound {
                        table: Table::Boards,
                        id,
                    });
                }
                Ok(cascaded)
            })
        })?;
        debug!(id, cascaded, "removed board row");
        Ok(())
    }

    fn remove_user(&self, id: i64, replacement: Option<i64>) -> StorageResult<()> {
        let reassigned = self.run(|connection| {
            connection.transaction::<_, StorageError, _>(|tx| {
                ensure_replaceable(tx, id, replacement)?;
                let reassigned = reassign(tx, id, replacement)?;
                diesel::delete(users::table.find(id)).execute(tx)?;
                Ok(reassigned)
            })
        })?;
        debug!(id, ?replacement, reassigned, "removed user row");
        Ok(())
    }
}

fn user_exists(connection: &mut SqliteConnection, id: i64) -> StorageResult<bool> {
    let found = users::table
        .find(id)
        .select(users::id)
        .first::<i64>(connection)
        .optional()?;
    Ok(found.is_some())
}

fn ensure_user_exists(connection: &mut SqliteConnection, id: i64) -> StorageResult<()> {
    if user_exists(connection, id)? {
        Ok(())
    } else {
        Err(StorageError::ForeignKeyViolation(format!(
            "users row {id} does not exist"
        )))
    }
}

fn ensure_replaceable(
    connection: &mut SqliteConnection,
    id: i64,
    replacement: Option<i64>,
) -> StorageResult<()> {
    if !user_exists(connection, id)? {
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
    Ok(())
}

fn reassign(connection: &mut SqliteConnection, from: i64, to: Option<i64>) -> StorageResult<usize> {
    if let Some(target) = to {
        ensure_user_exists(connection, target)?;
    }
    let changed = diesel::update(tasks::table.filter(tasks::assigned_user.eq(from)))
        .set(tasks::assigned_user.eq(to))
        .execute(connection)?;
    Ok(changed)
}

fn user_values(record: &UserRecord) -> UserValues<'_> {
    UserValues {
        name: &record.name,
        active: record.active,
    }
}

fn board_values(record: &BoardRecord) -> BoardValues<'_> {
    BoardValues {
        title: &record.title,
        active: record.active,
    }
}

fn task_values(record: &TaskRecord) -> TaskValues<'_> {
    TaskValues {
        title: &record.title,
        description: &record.description,
        stage: &record.stage,
        difficulty: record.difficulty,
        assigned_user: record.assigned_user,
        due_date: record.due_date.map(|due| due.naive_utc()),
        active: record.active,
        board_id: record.board_id,
    }
}

fn row_to_user(row: UserRow) -> Stored<UserRecord> {
    let UserRow { id, name, active } = row;
    Stored {
        id,
        record: UserRecord { name, active },
    }
}

fn row_to_board(row: BoardRow) -> Stored<BoardRecord> {
    let BoardRow { id, title, active } = row;
    Stored {
        id,
        record: BoardRecord { title, active },
    }
}

fn row_to_task(row: TaskRow) -> Stored<TaskRecord> {
    let TaskRow {
        id,
        title,
        description,
        stage,
        difficulty,
        assigned_user,
        due_date,
        active,
        board_id,
    } = row;
    Stored {
        id,
        record: TaskRecord {
            board_id,
            title,
            description,
            stage,
            difficulty,
            assigned_user,
            due_date: due_date.map(|naive| naive.and_utc()),
            active,
        },
    }
}
