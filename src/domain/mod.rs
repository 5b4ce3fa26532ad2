//! Domain models for planboard
//!
//! Contains the task and milestone records plus their derived flags,
//! without any I/O concerns.

mod id;
mod milestone;
mod task;

pub use id::{IdError, MilestoneId, ProjectId, TaskId};
pub use milestone::{Milestone, MilestoneDraft, MilestonePatch, MilestoneStatus};
pub use task::{Priority, Task, TaskDraft, TaskPatch, TaskStatus, DUE_SOON_DAYS};
