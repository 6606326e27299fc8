//! Key generation, upsert, and column round-trip tests against `SQLite`.

use super::helpers::{SqliteContext, due_date, seed_in_progress};
use eyre::{bail, ensure};
use kanban::tracker::{
    config::{DeletePolicy, HydrationMode},
    domain::{Board, BoardId, Difficulty, Stage, Task, User},
    ports::{RecordStore, StorageError, TaskScope, Visibility},
    services::{GatewayError, UserIndex},
};
use rstest::rstest;

#[rstest]
fn inserts_receive_increasing_keys() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let mut first = User::new("Ada")?;
    let mut second = User::new("Grace")?;

    let first_id = ctx.gateway.save_user(&mut first)?;
    let second_id = ctx.gateway.save_user(&mut second)?;

    ensure!(first_id.value() > 0);
    ensure!(second_id > first_id);
    Ok(())
}

#[rstest]
fn resaving_updates_in_place() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let mut board = Board::new("Home")?;
    let id = ctx.gateway.save_board(&mut board)?;
    board.set_title("House")?;

    ensure!(ctx.gateway.save_board(&mut board)? == id);

    let rows = ctx.gateway.store().boards(Visibility::IncludeInactive)?;
    ensure!(rows.len() == 1);
    ensure!(rows.first().map(|row| row.record.title.as_str()) == Some("House"));
    Ok(())
}

#[rstest]
fn every_task_column_round_trips() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let (_, board, task) = seed_in_progress(&ctx.gateway)?;
    let users = ctx.gateway.load_graph(Visibility::ActiveOnly)?.users;

    let loaded = ctx
        .gateway
        .load_tasks(&board, &users, Visibility::ActiveOnly)?;

    let Some(reloaded) = loaded.first() else {
        bail!("seeded task should load");
    };
    ensure!(reloaded == &task);
    ensure!(reloaded.due_date() == Some(due_date()?));
    ensure!(reloaded.difficulty().map(Difficulty::value) == Some(4));
    Ok(())
}

#[rstest]
fn stage_is_stored_as_text_code() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    seed_in_progress(&ctx.gateway)?;

    let rows = ctx
        .gateway
        .store()
        .tasks(TaskScope::All, Visibility::ActiveOnly)?;

    let codes: Vec<&str> = rows.iter().map(|row| row.record.stage.as_str()).collect();
    ensure!(codes == vec!["in_progress"]);
    Ok(())
}

#[rstest]
fn clearing_optional_fields_nulls_the_columns() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let mut user = User::new("Ada")?;
    let user_id = ctx.gateway.save_user(&mut user)?;
    let mut board = Board::new("Home")?;
    let board_id = ctx.gateway.save_board(&mut board)?;
    let mut task = Task::new(board_id, "Water plants")?;
    task.set_assigned_user(Some(user_id));
    task.set_due_date(Some(due_date()?));
    ctx.gateway.save_task(&mut task)?;

    task.set_assigned_user(None);
    task.set_due_date(None);
    ctx.gateway.save_task(&mut task)?;

    let rows = ctx
        .gateway
        .store()
        .tasks(TaskScope::All, Visibility::ActiveOnly)?;
    let Some(row) = rows.first() else {
        bail!("task row should exist");
    };
    ensure!(row.record.assigned_user.is_none());
    ensure!(row.record.due_date.is_none());
    Ok(())
}

#[rstest]
fn data_survives_reopening_the_file() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let (user, board, task) = seed_in_progress(&ctx.gateway)?;

    let reopened = ctx.reopen(HydrationMode::Strict)?;
    let snapshot = reopened.load_graph(Visibility::ActiveOnly)?;

    ensure!(user.id().and_then(|id| snapshot.user(id)) == Some(&user));
    let Some(loaded_board) = board.id().and_then(|id| snapshot.board(id)) else {
        bail!("board should load after reopening");
    };
    ensure!(loaded_board.tasks() == [task]);
    Ok(())
}

#[rstest]
fn reopening_does_not_reset_the_schema() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let mut board = Board::new("Home")?;
    ctx.gateway.save_board(&mut board)?;

    let reopened = ctx.reopen(HydrationMode::SkipAndLog)?;

    ensure!(reopened.load_boards(Visibility::ActiveOnly)?.len() == 1);
    Ok(())
}

#[rstest]
fn reset_schema_empties_every_table() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    seed_in_progress(&ctx.gateway)?;

    ctx.gateway.store().reset_schema()?;

    let snapshot = ctx.gateway.load_graph(Visibility::IncludeInactive)?;
    ensure!(snapshot.users.is_empty());
    ensure!(snapshot.boards.is_empty());
    ensure!(snapshot.orphaned_tasks.is_empty());
    let mut user = User::new("Grace")?;
    ensure!(ctx.gateway.save_user(&mut user)?.value() == 1);
    Ok(())
}

#[rstest]
fn keys_are_never_reused_after_hard_delete() -> eyre::Result<()> {
    let ctx = SqliteContext::open(DeletePolicy::Hard, HydrationMode::SkipAndLog)?;
    let mut first = Board::new("First")?;
    let first_id = ctx.gateway.save_board(&mut first)?;
    ctx.gateway.delete_board(&mut first)?;

    let mut second = Board::new("Second")?;
    let second_id = ctx.gateway.save_board(&mut second)?;

    ensure!(second_id > first_id);
    Ok(())
}

#[rstest]
fn task_for_unknown_board_violates_foreign_key() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let mut task = Task::new(BoardId::new(41)?, "Nowhere")?;

    let result = ctx.gateway.save_task(&mut task);

    ensure!(matches!(
        result,
        Err(GatewayError::Storage(StorageError::ForeignKeyViolation(_)))
    ));
    ensure!(task.id().is_none());
    Ok(())
}

#[rstest]
fn each_load_sees_later_writes() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let mut board = Board::new("Home")?;
    let board_id = ctx.gateway.save_board(&mut board)?;
    let users = UserIndex::new();
    ensure!(
        ctx.gateway
            .load_tasks(&board, &users, Visibility::ActiveOnly)?
            .is_empty()
    );

    let mut task = Task::new(board_id, "Dust shelves")?;
    ctx.gateway.save_task(&mut task)?;

    let loaded = ctx
        .gateway
        .load_tasks(&board, &users, Visibility::ActiveOnly)?;
    ensure!(loaded.iter().map(Task::stage).collect::<Vec<_>>() == vec![Stage::Backlog]);
    Ok(())
}
