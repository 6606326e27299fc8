//! Domain model for task tracking.
//!
//! Users, boards, and tasks hold validated field state and reject invalid
//! mutations synchronously. Stage changes go through the lifecycle guards in
//! [`LifecyclePolicy`]. Nothing in this module touches storage.

mod board;
mod error;
mod identity;
mod ids;
mod lifecycle;
mod query;
mod stage;
mod task;
mod user;
mod values;

pub use board::Board;
pub use error::{IdentityError, ValidationError};
pub use identity::Identifiable;
pub(crate) use identity::{IdentitySlot, assign_identity};
pub use ids::{BoardId, DurableKey, TaskId, UserId};
pub use lifecycle::{LifecyclePolicy, StageOrdering, TransitionOrigin};
pub use query::{SortKey, search, sort_boards, sort_tasks};
pub use stage::{Stage, code_to_stage, stage_to_code};
pub(crate) use task::PersistedTaskData;
pub use task::Task;
pub use user::User;
pub use values::{Description, Difficulty, DisplayName, Title};
