//! Kanban board grouping and drag-drop commands

use serde::{Deserialize, Serialize};

use chrono::NaiveDate;

use crate::domain::{Task, TaskId, TaskStatus};

/// Lookahead for the board's "due soon" stat, in days.
///
/// Deliberately wider than [`crate::domain::DUE_SOON_DAYS`]: the board
/// header warns earlier than the per-task badge does.
pub const BOARD_DUE_SOON_DAYS: i64 = 3;

/// One board column: a status and the tasks currently in it
#[derive(Debug, Clone, PartialEq)]
pub struct BoardColumn<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
}

impl BoardColumn<'_> {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Groups `tasks` into one column per status.
///
/// Every status gets a column even when empty, in [`TaskStatus::all`]
/// order. Within a column, tasks keep the order they had in the input.
pub fn board_columns(tasks: &[Task]) -> Vec<BoardColumn<'_>> {
    TaskStatus::all()
        .iter()
        .map(|status| BoardColumn {
            status: *status,
            tasks: tasks.iter().filter(|t| t.status == *status).collect(),
        })
        .collect()
}

/// A card dropped onto a column: move `task_id` to `target`.
///
/// Carries only identifiers, so it can cross thread and serialization
/// boundaries without borrowing board state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropCommand {
    pub task_id: TaskId,
    pub target: TaskStatus,
}

impl DropCommand {
    pub fn new(task_id: TaskId, target: TaskStatus) -> Self {
        Self { task_id, target }
    }

    /// A drop onto the column the card already lives in changes nothing
    pub fn is_noop(&self, current: TaskStatus) -> bool {
        self.target == current
    }
}

/// Headline numbers shown above the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub review: usize,
    pub done: usize,
    pub due_soon: usize,
    pub overdue: usize,
}

impl BoardStats {
    /// Tallies `tasks` as of `today`.
    ///
    /// `due_soon` counts open tasks due within [`BOARD_DUE_SOON_DAYS`];
    /// `overdue` counts open tasks whose due date has passed.
    pub fn collect(tasks: &[Task], today: NaiveDate) -> Self {
        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
        Self {
            total: tasks.len(),
            todo: count(TaskStatus::Todo),
            in_progress: count(TaskStatus::InProgress),
            review: count(TaskStatus::Review),
            done: count(TaskStatus::Done),
            due_soon: tasks
                .iter()
                .filter(|t| t.is_due_soon(today, BOARD_DUE_SOON_DAYS))
                .count(),
            overdue: tasks.iter().filter(|t| t.is_overdue(today)).count(),
        }
    }

    /// Count for one status column
    pub fn for_status(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Review => self.review,
            TaskStatus::Done => self.done,
        }
    }
}
