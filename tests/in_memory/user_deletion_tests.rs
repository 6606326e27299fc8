//! User and board deletion over the in-memory store.

use super::helpers::{MemoryGateway, complete_task, gateway, hard_gateway};
use eyre::{bail, ensure};
use kanban::tracker::{
    domain::{Board, Stage, User, ValidationError},
    ports::Visibility,
    services::GatewayError,
};
use rstest::rstest;

#[rstest]
fn hard_delete_with_replacement_moves_active_work(
    hard_gateway: MemoryGateway,
) -> eyre::Result<()> {
    let gateway = hard_gateway;
    let mut leaving = User::new("Ada")?;
    let leaving_id = gateway.save_user(&mut leaving)?;
    let mut staying = User::new("Grace")?;
    let staying_id = gateway.save_user(&mut staying)?;
    let mut board = Board::new("Ops")?;
    let board_id = gateway.save_board(&mut board)?;
    let mut task = complete_task(board_id, "Rotate keys", leaving_id)?;
    gateway.save_task(&mut task)?;
    gateway.transition_task(&mut task, Stage::ToDo)?;
    gateway.transition_task(&mut task, Stage::InProgress)?;

    let refused = gateway.delete_user(&mut leaving, None);
    ensure!(matches!(
        refused,
        Err(GatewayError::Validation(
            ValidationError::ReplacementRequired { .. }
        ))
    ));

    gateway.delete_user(&mut leaving, Some(staying_id))?;

    let snapshot = gateway.load_graph(Visibility::IncludeInactive)?;
    ensure!(snapshot.user(leaving_id).is_none());
    let assignees: Vec<_> = snapshot
        .tasks()
        .filter_map(|loaded| snapshot.assignee(loaded))
        .collect();
    ensure!(assignees == vec![&staying]);
    Ok(())
}

#[rstest]
fn soft_delete_without_replacement_keeps_the_reference(
    gateway: MemoryGateway,
) -> eyre::Result<()> {
    let mut user = User::new("Ada")?;
    let user_id = gateway.save_user(&mut user)?;
    let mut board = Board::new("Ops")?;
    let board_id = gateway.save_board(&mut board)?;
    let mut task = complete_task(board_id, "Rotate keys", user_id)?;
    gateway.save_task(&mut task)?;

    gateway.delete_user(&mut user, None)?;

    let everything = gateway.load_graph(Visibility::IncludeInactive)?;
    let Some(loaded) = everything.tasks().next() else {
        bail!("task should survive a soft user delete");
    };
    ensure!(loaded.assigned_user() == Some(user_id));
    ensure!(everything.assignee(loaded).is_some_and(|found| !found.is_active()));
    Ok(())
}

#[rstest]
fn hard_board_delete_cascades_to_tasks(hard_gateway: MemoryGateway) -> eyre::Result<()> {
    let gateway = hard_gateway;
    let mut user = User::new("Ada")?;
    let user_id = gateway.save_user(&mut user)?;
    let mut kept = Board::new("Kept")?;
    let kept_id = gateway.save_board(&mut kept)?;
    let mut dropped = Board::new("Dropped")?;
    let dropped_id = gateway.save_board(&mut dropped)?;
    for board_id in [kept_id, dropped_id] {
        let mut task = complete_task(board_id, "Chore", user_id)?;
        gateway.save_task(&mut task)?;
    }

    gateway.delete_board(&mut dropped)?;

    let snapshot = gateway.load_graph(Visibility::IncludeInactive)?;
    ensure!(snapshot.boards.len() == 1);
    ensure!(snapshot.orphaned_tasks.is_empty());
    ensure!(snapshot.tasks().all(|task| task.board_id() == kept_id));
    Ok(())
}
