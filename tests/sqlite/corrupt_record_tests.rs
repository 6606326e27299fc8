//! Hydration of malformed rows under both hydration modes.

use super::helpers::SqliteContext;
use eyre::{bail, ensure};
use kanban::tracker::{
    config::HydrationMode,
    domain::{Board, BoardId, Task, ValidationError},
    ports::{RecordStore, Row, Table, TaskRecord, UserRecord, Visibility},
    services::{CorruptRecordError, GatewayError},
};
use rstest::rstest;

fn task_row(board_id: BoardId, title: &str, stage: &str, difficulty: Option<i64>) -> Row {
    Row::Task(TaskRecord {
        board_id: board_id.value(),
        title: title.to_owned(),
        description: "written directly".to_owned(),
        stage: stage.to_owned(),
        difficulty,
        assigned_user: None,
        due_date: None,
        active: true,
    })
}

/// Saves a board holding one valid task and inserts `corrupt` beside it.
fn seed_with_corrupt_row(
    ctx: &SqliteContext,
    corrupt: &dyn Fn(BoardId) -> Row,
) -> eyre::Result<i64> {
    let mut board = Board::new("Mixed")?;
    let board_id = ctx.gateway.save_board(&mut board)?;
    let mut valid = Task::new(board_id, "Valid task")?;
    ctx.gateway.save_task(&mut valid)?;
    Ok(ctx.gateway.store().insert(&corrupt(board_id))?)
}

#[rstest]
#[case::unknown_stage(|board| task_row(board, "Stray", "doing", Some(2)))]
#[case::difficulty_out_of_range(|board| task_row(board, "Stray", "backlog", Some(9)))]
#[case::blank_title(|board| task_row(board, "   ", "backlog", None))]
#[case::todo_without_difficulty(|board| task_row(board, "Stray", "todo", None))]
fn corrupt_tasks_are_skipped_by_default(#[case] corrupt: fn(BoardId) -> Row) -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    seed_with_corrupt_row(&ctx, &corrupt)?;

    let snapshot = ctx.gateway.load_graph(Visibility::ActiveOnly)?;

    let titles: Vec<&str> = snapshot.tasks().map(|task| task.title().as_str()).collect();
    ensure!(titles == vec!["Valid task"]);
    Ok(())
}

#[rstest]
fn strict_hydration_reports_the_corrupt_row() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let corrupt_id =
        seed_with_corrupt_row(&ctx, &|board| task_row(board, "Stray", "doing", Some(2)))?;
    let strict = ctx.reopen(HydrationMode::Strict)?;

    let result = strict.load_graph(Visibility::ActiveOnly);

    let Err(GatewayError::Corrupt(CorruptRecordError { table, id, reason })) = result else {
        bail!("strict hydration should fail on the corrupt row");
    };
    ensure!(table == Table::Tasks);
    ensure!(id == corrupt_id);
    ensure!(reason == ValidationError::UnknownStage("doing".to_owned()));
    Ok(())
}

#[rstest]
fn blank_user_names_are_skipped() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let blank = ctx.gateway.store().insert(&Row::User(UserRecord {
        name: "  ".to_owned(),
        active: true,
    }))?;
    ensure!(ctx.gateway.load_users(Visibility::ActiveOnly)?.is_empty());

    let strict = ctx.reopen(HydrationMode::Strict)?;
    let Err(GatewayError::Corrupt(error)) = strict.load_users(Visibility::ActiveOnly) else {
        bail!("strict hydration should reject a blank name");
    };
    ensure!(error.table == Table::Users);
    ensure!(error.id == blank);
    ensure!(error.reason == ValidationError::EmptyName);
    Ok(())
}
