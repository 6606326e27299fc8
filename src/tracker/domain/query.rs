//! Search and deterministic ordering over loaded collections.

use super::{Board, Task};
use std::cmp::Ordering;

/// Field used to order a task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Title, byte-wise ascending.
    Title,
    /// Stage rank, `Backlog` first.
    Stage,
    /// Difficulty score ascending; unscored tasks first.
    Difficulty,
}

/// Returns the tasks whose title or description contains `needle`.
///
/// Matching is case-sensitive. The input order is preserved and the input
/// slice is not modified.
#[must_use]
pub fn search<'a>(tasks: &'a [Task], needle: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| {
            task.title().as_str().contains(needle) || task.description().as_str().contains(needle)
        })
        .collect()
}

/// Sorts tasks by `key`, breaking ties by ascending key.
///
/// The sort is stable, so repeated sorts of the same data always produce the
/// same order.
pub fn sort_tasks(tasks: &mut [Task], key: SortKey) {
    tasks.sort_by(|left, right| compare_tasks(left, right, key));
}

/// Sorts boards by title, breaking ties by ascending key.
pub fn sort_boards(boards: &mut [Board]) {
    boards.sort_by(|left, right| {
        left.title()
            .cmp(right.title())
            .then_with(|| left.id().cmp(&right.id()))
    });
}

fn compare_tasks(left: &Task, right: &Task, key: SortKey) -> Ordering {
    let primary = match key {
        SortKey::Title => left.title().cmp(right.title()),
        SortKey::Stage => left.stage().rank().cmp(&right.stage().rank()),
        SortKey::Difficulty => left.difficulty().cmp(&right.difficulty()),
    };
    primary.then_with(|| left.id().cmp(&right.id()))
}
