//! Shared helpers for `SQLite` integration tests.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use kanban::tracker::{
    adapters::sqlite::SqliteRecordStore,
    config::{DeletePolicy, HydrationMode, TrackerConfig},
    domain::{Board, Stage, Task, User},
    services::PersistenceGateway,
};
use tempfile::TempDir;

/// Gateway type used by the `SQLite` tests.
pub type SqliteGateway = PersistenceGateway<SqliteRecordStore>;

/// A database file in a temporary directory, removed on drop.
pub struct SqliteContext {
    /// Path of the database file.
    pub path: PathBuf,
    /// Gateway over the open database.
    pub gateway: SqliteGateway,
    _dir: TempDir,
}

impl SqliteContext {
    /// Opens a fresh database with the given policies.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created.
    pub fn open(delete_policy: DeletePolicy, hydration: HydrationMode) -> eyre::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("kanban.db");
        let gateway = gateway_for(&path, delete_policy, hydration)?;
        Ok(Self {
            path,
            gateway,
            _dir: dir,
        })
    }

    /// Opens a fresh database with default policies.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created.
    pub fn open_default() -> eyre::Result<Self> {
        Self::open(DeletePolicy::Soft, HydrationMode::SkipAndLog)
    }

    /// Opens a second, independent gateway on the same database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reopened.
    pub fn reopen(&self, hydration: HydrationMode) -> eyre::Result<SqliteGateway> {
        gateway_for(&self.path, DeletePolicy::Soft, hydration)
    }
}

fn gateway_for(
    path: &std::path::Path,
    delete_policy: DeletePolicy,
    hydration: HydrationMode,
) -> eyre::Result<SqliteGateway> {
    let database_url = path
        .to_str()
        .ok_or_else(|| eyre::eyre!("temporary path is not valid UTF-8"))?
        .to_owned();
    let store = SqliteRecordStore::open(&database_url)?;
    let config = TrackerConfig {
        database_url,
        delete_policy,
        hydration,
        ..TrackerConfig::default()
    };
    Ok(PersistenceGateway::new(Arc::new(store), &config))
}

/// A due date with whole-second precision.
///
/// # Errors
///
/// Returns an error if the timestamp is ambiguous.
pub fn due_date() -> eyre::Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 30, 0)
        .single()
        .ok_or_else(|| eyre::eyre!("ambiguous due date"))
}

/// Saves a user, a board, and a task that has reached `InProgress`.
///
/// # Errors
///
/// Returns an error if any save or transition fails.
pub fn seed_in_progress(gateway: &SqliteGateway) -> eyre::Result<(User, Board, Task)> {
    let mut user = User::new("Ada")?;
    let user_id = gateway.save_user(&mut user)?;
    let mut board = Board::new("Work")?;
    let board_id = gateway.save_board(&mut board)?;

    let mut task = Task::new(board_id, "Review pull request")?;
    task.set_description("Check the migration")?;
    task.set_difficulty_score(4)?;
    task.set_assigned_user(Some(user_id));
    task.set_due_date(Some(due_date()?));
    gateway.save_task(&mut task)?;
    gateway.transition_task(&mut task, Stage::ToDo)?;
    gateway.transition_task(&mut task, Stage::InProgress)?;
    Ok((user, board, task))
}
