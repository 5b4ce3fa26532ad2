//! Horizontal bar placement for timeline views
//!
//! Maps a task's date interval onto a [`DayWindow`] as percentage
//! offsets, so the same geometry drives terminal cells and any other
//! proportional renderer.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::Task;
use crate::sched::window::DayWindow;

/// Position of a task bar inside a window, in percent of the window width.
///
/// `left` is the offset of the bar's first day, `width` the span of days
/// it covers. Both are fractions of the full window, scaled to 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskBar {
    pub left: f64,
    pub width: f64,
}

/// Computes the bar for `task` within `window`.
///
/// The plotted interval runs from the task's start date (or its due date
/// when no start is set) through its due date (or the start for tasks with
/// only a start). Tasks with neither date, and tasks whose interval lies
/// wholly outside the window, yield `None`. Intervals overhanging the
/// window are clipped to it, so a bar never extends past either edge.
pub fn task_bar(task: &Task, window: &DayWindow) -> Option<TaskBar> {
    let start = task.start_date.or(task.due_date)?;
    let end = effective_end(start, task.due_date);

    if end < window.first() || start > window.last() {
        return None;
    }

    let clip_start = start.max(window.first());
    let clip_end = end.min(window.last());

    let day_width = 100.0 / window.len() as f64;
    let offset = (clip_start - window.first()).num_days() as f64;
    let span = (clip_end - clip_start).num_days() as f64 + 1.0;

    Some(TaskBar {
        left: offset * day_width,
        width: span * day_width,
    })
}

/// Pairs every task with its bar, keeping the input order.
///
/// Each task occupies its own row; un-plottable tasks stay in the result
/// with no bar so views can still show their label.
pub fn layout_rows<'a>(tasks: &'a [Task], window: &DayWindow) -> Vec<(&'a Task, Option<TaskBar>)> {
    tasks
        .iter()
        .map(|task| (task, task_bar(task, window)))
        .collect()
}

// Collapses inverted intervals (due before start) onto the start day
fn effective_end(start: NaiveDate, due: Option<NaiveDate>) -> NaiveDate {
    due.map_or(start, |d| d.max(start))
}
