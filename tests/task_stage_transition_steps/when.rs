//! When steps for task stage transition BDD scenarios.

use super::world::{TaskTransitionWorld, parse_stage};
use kanban::tracker::services::GatewayError;
use rstest_bdd_macros::when;

#[when(r#"the task is moved to "{stage}""#)]
fn move_task(world: &mut TaskTransitionWorld, stage: String) -> Result<(), eyre::Report> {
    let target = parse_stage(&stage)?;
    let gateway = world.gateway.clone();
    let result = gateway.transition_task(world.task_mut()?, target);
    world.last_result = Some(result);
    Ok(())
}

#[when(r#"the task is reverted to "{stage}""#)]
fn revert_task(world: &mut TaskTransitionWorld, stage: String) -> Result<(), eyre::Report> {
    let target = parse_stage(&stage)?;
    let gateway = world.gateway.clone();
    let task = world.task_mut()?;
    let result = task
        .revert_to(target)
        .map_err(GatewayError::from)
        .and_then(|()| gateway.save_task(task));
    world.last_result = Some(result);
    Ok(())
}
