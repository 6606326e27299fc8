//! Two-pass graph reconstruction tests against `SQLite`.

use super::helpers::{SqliteContext, seed_in_progress};
use eyre::{bail, ensure};
use kanban::tracker::{
    domain::{Board, Stage, Task, TaskId, User, UserId},
    ports::Visibility,
};
use rstest::rstest;

fn titles(boards: &[Board]) -> Vec<&str> {
    boards.iter().map(|board| board.title().as_str()).collect()
}

#[rstest]
fn graph_attaches_tasks_and_resolves_assignees() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let (user, board, task) = seed_in_progress(&ctx.gateway)?;

    let snapshot = ctx.gateway.load_graph(Visibility::ActiveOnly)?;

    ensure!(snapshot.users.len() == 1);
    ensure!(snapshot.orphaned_tasks.is_empty());
    let Some(loaded_board) = board.id().and_then(|id| snapshot.board(id)) else {
        bail!("board should be in the snapshot");
    };
    let Some(loaded_task) = loaded_board.tasks().first() else {
        bail!("board should own the seeded task");
    };
    ensure!(loaded_task == &task);
    ensure!(snapshot.assignee(loaded_task) == Some(&user));
    Ok(())
}

#[rstest]
fn boards_load_by_title_then_key() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    for title in ["Work", "Errands", "Home", "Errands"] {
        let mut board = Board::new(title)?;
        ctx.gateway.save_board(&mut board)?;
    }

    let boards = ctx.gateway.load_boards(Visibility::ActiveOnly)?;

    ensure!(titles(&boards) == vec!["Errands", "Errands", "Home", "Work"]);
    let first_errands = boards.first().and_then(Board::id);
    let second_errands = boards.get(1).and_then(Board::id);
    ensure!(first_errands < second_errands);
    Ok(())
}

#[rstest]
fn tasks_load_in_stage_order() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let mut board = Board::new("Chores")?;
    let board_id = ctx.gateway.save_board(&mut board)?;

    let mut finished = Task::new(board_id, "Buy milk")?;
    finished.set_description("Semi-skimmed")?;
    finished.set_difficulty_score(1)?;
    ctx.gateway.save_task(&mut finished)?;
    ctx.gateway.transition_task(&mut finished, Stage::ToDo)?;
    let mut idle = Task::new(board_id, "Clean garage")?;
    ctx.gateway.save_task(&mut idle)?;

    let snapshot = ctx.gateway.load_graph(Visibility::ActiveOnly)?;
    let Some(loaded) = snapshot.board(board_id) else {
        bail!("board should be in the snapshot");
    };

    let stages: Vec<Stage> = loaded.tasks().iter().map(Task::stage).collect();
    ensure!(stages == vec![Stage::Backlog, Stage::ToDo]);
    Ok(())
}

#[rstest]
fn inactive_assignee_is_cleared_on_active_load() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let (mut user, board, _) = seed_in_progress(&ctx.gateway)?;
    ctx.gateway.delete_user(&mut user, None)?;

    let active = ctx.gateway.load_graph(Visibility::ActiveOnly)?;
    let everything = ctx.gateway.load_graph(Visibility::IncludeInactive)?;

    let Some(board_id) = board.id() else {
        bail!("board should be saved");
    };
    ensure!(active.tasks().count() == 1);
    ensure!(active.tasks().all(|task| task.assigned_user().is_none()));
    let kept_assignees: Vec<Option<UserId>> = everything
        .board(board_id)
        .map(|loaded| loaded.tasks().iter().map(Task::assigned_user).collect())
        .unwrap_or_default();
    ensure!(kept_assignees == vec![user.id()]);
    Ok(())
}

#[rstest]
fn tasks_of_inactive_boards_are_orphaned() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let mut board = Board::new("Old")?;
    let board_id = ctx.gateway.save_board(&mut board)?;
    let mut task = Task::new(board_id, "Leftover")?;
    let task_id = ctx.gateway.save_task(&mut task)?;
    ctx.gateway.delete_board(&mut board)?;

    let snapshot = ctx.gateway.load_graph(Visibility::ActiveOnly)?;

    ensure!(snapshot.boards.is_empty());
    let orphans: Vec<Option<TaskId>> = snapshot.orphaned_tasks.iter().map(Task::id).collect();
    ensure!(orphans == vec![Some(task_id)]);
    Ok(())
}

#[rstest]
fn inactive_users_are_only_loaded_on_request() -> eyre::Result<()> {
    let ctx = SqliteContext::open_default()?;
    let mut kept = User::new("Ada")?;
    ctx.gateway.save_user(&mut kept)?;
    let mut removed = User::new("Grace")?;
    ctx.gateway.save_user(&mut removed)?;
    ctx.gateway.delete_user(&mut removed, None)?;

    let active = ctx.gateway.load_users(Visibility::ActiveOnly)?;
    let everyone = ctx.gateway.load_users(Visibility::IncludeInactive)?;

    ensure!(active == vec![kept.clone()]);
    ensure!(everyone == vec![kept, removed]);
    Ok(())
}
