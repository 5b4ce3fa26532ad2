//! Date-window construction for timeline views
//!
//! A [`DayWindow`] is the contiguous run of calendar days a timeline view
//! renders. Three modes exist:
//!
//! | Mode     | Range                                            |
//! |----------|--------------------------------------------------|
//! | Week     | today - 3 through today + 3 (always 7 days)      |
//! | Month    | first through last day of the reference month    |
//! | FullSpan | earliest through latest date on any task/milestone |
//!
//! A full-span window over a project with no dated records falls back to
//! the week window.

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::domain::{Milestone, Task};

/// How a day window was built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    Week,
    Month,
    FullSpan,
}

/// A contiguous, ascending, duplicate-free run of calendar days.
///
/// Always contains at least one day; every constructor yields a non-empty
/// range.
#[derive(Debug, Clone, PartialEq)]
pub struct DayWindow {
    mode: WindowMode,
    days: Vec<NaiveDate>,
}

impl DayWindow {
    fn from_range(mode: WindowMode, first: NaiveDate, last: NaiveDate) -> Self {
        let days: Vec<NaiveDate> = first.iter_days().take_while(|d| *d <= last).collect();
        Self { mode, days }
    }

    /// Seven days centred on `today`: the 3 days before through the 3 after.
    ///
    /// `today` always sits at index 3.
    pub fn week(today: NaiveDate) -> Self {
        Self::from_range(
            WindowMode::Week,
            today - Duration::days(3),
            today + Duration::days(3),
        )
    }

    /// Every day of the calendar month containing `reference` (28-31 days)
    pub fn month(reference: NaiveDate) -> Self {
        let first = NaiveDate::from_ymd_opt(reference.year(), reference.month(), 1)
            .unwrap_or(reference);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(reference);
        Self::from_range(WindowMode::Month, first, last)
    }

    /// The span from the earliest to the latest date found on any task
    /// (`start_date`/`due_date`) or milestone (`due_date`).
    ///
    /// Falls back to [`DayWindow::week`] when no record carries a date.
    pub fn full_span(tasks: &[Task], milestones: &[Milestone], today: NaiveDate) -> Self {
        let task_dates = tasks
            .iter()
            .flat_map(|t| [t.start_date, t.due_date])
            .flatten();
        let milestone_dates = milestones.iter().filter_map(|m| m.due_date);

        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for date in task_dates.chain(milestone_dates) {
            bounds = Some(match bounds {
                None => (date, date),
                Some((lo, hi)) => (lo.min(date), hi.max(date)),
            });
        }

        match bounds {
            Some((lo, hi)) => Self::from_range(WindowMode::FullSpan, lo, hi),
            None => Self::week(today),
        }
    }

    /// How the window was built
    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    /// The days in ascending order
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// Number of days in the window
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether the window holds no days (never true for a constructed window)
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// First day of the window
    pub fn first(&self) -> NaiveDate {
        self.days[0]
    }

    /// Last day of the window
    pub fn last(&self) -> NaiveDate {
        self.days[self.days.len() - 1]
    }

    /// Returns true if `date` falls inside the window
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first() && date <= self.last()
    }

    /// Index of `date` within the window, if present
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        if self.contains(date) {
            Some((date - self.first()).num_days() as usize)
        } else {
            None
        }
    }

    /// Index of today's column.
    ///
    /// When today falls outside the window (possible in month and full-span
    /// modes) this degrades to the midpoint index rather than erroring; the
    /// views still need somewhere to centre their scroll.
    pub fn today_index(&self, today: NaiveDate) -> usize {
        self.position(today).unwrap_or(self.len() / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::{MilestoneDraft, TaskDraft};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_window_centres_on_reference_day() {
        // 2026-08-26 is a Wednesday
        let wednesday = day(2026, 8, 26);
        let window = DayWindow::week(wednesday);

        assert_eq!(window.len(), 7);
        assert_eq!(window.first(), day(2026, 8, 23));
        assert_eq!(window.last(), day(2026, 8, 29));
        assert_eq!(window.position(wednesday), Some(3));
        assert_eq!(window.today_index(wednesday), 3);
    }

    #[test]
    fn week_window_days_are_consecutive() {
        let window = DayWindow::week(day(2026, 1, 1));
        for pair in window.days().windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 1);
        }
    }

    #[test]
    fn week_window_spans_month_boundaries() {
        let window = DayWindow::week(day(2026, 9, 1));

        assert_eq!(window.first(), day(2026, 8, 29));
        assert_eq!(window.last(), day(2026, 9, 4));
    }

    #[test]
    fn month_window_covers_whole_month() {
        let window = DayWindow::month(day(2026, 8, 15));

        assert_eq!(window.len(), 31);
        assert_eq!(window.first(), day(2026, 8, 1));
        assert_eq!(window.last(), day(2026, 8, 31));
        assert_eq!(window.mode(), WindowMode::Month);
    }

    #[test]
    fn month_window_handles_february() {
        assert_eq!(DayWindow::month(day(2026, 2, 10)).len(), 28);
        assert_eq!(DayWindow::month(day(2024, 2, 10)).len(), 29); // leap year
    }

    #[test]
    fn month_window_handles_december() {
        let window = DayWindow::month(day(2026, 12, 31));

        assert_eq!(window.first(), day(2026, 12, 1));
        assert_eq!(window.last(), day(2026, 12, 31));
    }

    #[test]
    fn full_span_covers_min_to_max() {
        let mut early = TaskDraft::new("Early").into_task(Utc::now());
        early.start_date = Some(day(2026, 3, 10));
        early.due_date = Some(day(2026, 3, 20));

        let mut late = TaskDraft::new("Late").into_task(Utc::now());
        late.due_date = Some(day(2026, 5, 2));

        let mut milestone = MilestoneDraft::new("Wrap-up").into_milestone(Utc::now());
        milestone.due_date = Some(day(2026, 6, 15));

        let window = DayWindow::full_span(&[early, late], &[milestone], day(2026, 4, 1));

        assert_eq!(window.mode(), WindowMode::FullSpan);
        assert_eq!(window.first(), day(2026, 3, 10));
        assert_eq!(window.last(), day(2026, 6, 15));
    }

    #[test]
    fn full_span_with_single_dated_record_is_one_day() {
        let mut task = TaskDraft::new("Only").into_task(Utc::now());
        task.due_date = Some(day(2026, 4, 4));

        let window = DayWindow::full_span(&[task], &[], day(2026, 1, 1));

        assert_eq!(window.len(), 1);
        assert_eq!(window.first(), day(2026, 4, 4));
    }

    #[test]
    fn full_span_without_dates_falls_back_to_week() {
        let undated = TaskDraft::new("No dates").into_task(Utc::now());
        let today = day(2026, 8, 26);

        let window = DayWindow::full_span(&[undated], &[], today);

        assert_eq!(window.mode(), WindowMode::Week);
        assert_eq!(window.len(), 7);
        assert_eq!(window.position(today), Some(3));
    }

    #[test]
    fn today_index_defaults_to_midpoint_outside_window() {
        let window = DayWindow::month(day(2026, 8, 15));
        let outside = day(2026, 11, 1);

        assert_eq!(window.position(outside), None);
        assert_eq!(window.today_index(outside), 31 / 2);
    }

    #[test]
    fn position_is_offset_from_first_day() {
        let window = DayWindow::month(day(2026, 8, 1));

        assert_eq!(window.position(day(2026, 8, 1)), Some(0));
        assert_eq!(window.position(day(2026, 8, 31)), Some(30));
        assert_eq!(window.position(day(2026, 7, 31)), None);
    }
}
