//! # Scheduling Layer
//!
//! Pure derivations over tasks and milestones. Nothing here performs I/O
//! or mutates shared state; every function maps a snapshot of records to
//! view geometry or groupings.
//!
//! | Concern | Entry point |
//! |---------|-------------|
//! | Timeline day ranges | [`DayWindow`] (week / month / full span) |
//! | Month grids | [`MonthMatrix`] |
//! | Bar placement | [`task_bar`], [`layout_rows`] |
//! | Filtering | [`TaskFilter`] |
//! | Kanban grouping | [`board_columns`], [`DropCommand`] |
//! | Milestone progress | [`milestone_progress`], [`group_by_milestone`] |

mod board;
mod calendar;
mod filter;
mod layout;
mod progress;
mod window;

pub use board::{board_columns, BoardColumn, BoardStats, DropCommand, BOARD_DUE_SOON_DAYS};
pub use calendar::MonthMatrix;
pub use filter::{MilestoneFilter, StatusFilter, TaskFilter};
pub use layout::{layout_rows, task_bar, TaskBar};
pub use progress::{group_by_milestone, milestone_progress, GroupedTasks, MilestoneGroup};
pub use window::{DayWindow, WindowMode};
