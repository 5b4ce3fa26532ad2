//! Planboard - Task and milestone scheduling from the terminal
//!
//! Planboard keeps a project's tasks and milestones in a local workspace
//! (or synced against a portal API) and renders them as a status board,
//! a timeline, a month calendar, and milestone progress views.

pub mod cli;
pub mod domain;
pub mod portal;
pub mod sched;
pub mod service;
pub mod storage;
pub mod store;

pub use domain::{Milestone, MilestoneId, MilestoneStatus, Task, TaskId, TaskStatus};
