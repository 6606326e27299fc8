//! Shared test helpers for in-memory gateway integration tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use kanban::tracker::{
    adapters::memory::InMemoryRecordStore,
    config::{DeletePolicy, TrackerConfig},
    domain::{BoardId, Task, UserId},
    services::PersistenceGateway,
};
use rstest::fixture;

/// Gateway type used by the in-memory tests.
pub type MemoryGateway = PersistenceGateway<InMemoryRecordStore>;

/// Provides a gateway with default policies over a fresh store.
#[fixture]
pub fn gateway() -> MemoryGateway {
    PersistenceGateway::with_defaults(Arc::new(InMemoryRecordStore::new()))
}

/// Provides a gateway that hard-deletes rows.
#[fixture]
pub fn hard_gateway() -> MemoryGateway {
    let config = TrackerConfig {
        delete_policy: DeletePolicy::Hard,
        ..TrackerConfig::in_memory()
    };
    PersistenceGateway::new(Arc::new(InMemoryRecordStore::new()), &config)
}

/// Builds an unsaved task carrying every field the strict lifecycle needs.
///
/// # Errors
///
/// Returns an error if any field value is rejected.
pub fn complete_task(board_id: BoardId, title: &str, assignee: UserId) -> eyre::Result<Task> {
    let mut task = Task::new(board_id, title)?;
    task.set_description(format!("Details for {title}"))?;
    task.set_difficulty_score(3)?;
    task.set_assigned_user(Some(assignee));
    task.set_due_date(Some(Utc::now() + Duration::days(7)));
    Ok(task)
}
