//! Month-grid construction for calendar views
//!
//! A [`MonthMatrix`] lays one calendar month out as full Monday-to-Sunday
//! rows. Leading and trailing cells borrowed from the adjacent months are
//! real dates, not blanks, so views can render (and dim) them directly.

use chrono::{Datelike, Duration, Months, NaiveDate};

/// One month rendered as complete weeks.
///
/// Every row holds exactly seven consecutive days and starts on a Monday.
/// Depending on how the month falls, the grid has 4, 5 or 6 rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthMatrix {
    year: i32,
    month: u32,
    weeks: Vec<[NaiveDate; 7]>,
}

impl MonthMatrix {
    /// Builds the grid for the month containing `reference`
    pub fn build(reference: NaiveDate) -> Self {
        let first = NaiveDate::from_ymd_opt(reference.year(), reference.month(), 1)
            .unwrap_or(reference);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(reference);

        // Walk back to the Monday on or before the 1st, then collect through
        // the end of the month.
        let lead = first.weekday().num_days_from_monday() as i64;
        let grid_start = first - Duration::days(lead);
        let mut cells: Vec<NaiveDate> =
            grid_start.iter_days().take_while(|d| *d <= last).collect();

        // Pad the final row with days from the next month
        let trailing = (7 - cells.len() % 7) % 7;
        cells.extend(last.iter_days().skip(1).take(trailing));

        let mut weeks = Vec::with_capacity(cells.len() / 7);
        for chunk in cells.chunks_exact(7) {
            weeks.push([
                chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6],
            ]);
        }

        Self {
            year: first.year(),
            month: first.month(),
            weeks,
        }
    }

    /// The Monday-first week rows
    pub fn weeks(&self) -> &[[NaiveDate; 7]] {
        &self.weeks
    }

    /// Number of week rows (4-6)
    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Year of the month this grid was built for
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month number (1-12) this grid was built for
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns true if `date` belongs to the grid's own month rather than
    /// to a leading/trailing filler row
    pub fn in_month(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rows_start_on_monday() {
        let matrix = MonthMatrix::build(day(2026, 8, 26));
        for week in matrix.weeks() {
            assert_eq!(week[0].weekday(), Weekday::Mon);
            assert_eq!(week[6].weekday(), Weekday::Sun);
        }
    }

    #[test]
    fn fillers_are_real_adjacent_dates() {
        // August 2026 starts on a Saturday, so the first row begins in July
        let matrix = MonthMatrix::build(day(2026, 8, 26));

        assert_eq!(matrix.len(), 6);
        assert_eq!(matrix.weeks()[0][0], day(2026, 7, 27));
        assert_eq!(matrix.weeks()[0][4], day(2026, 7, 31));
        assert_eq!(matrix.weeks()[0][5], day(2026, 8, 1));
        assert_eq!(matrix.weeks()[5][6], day(2026, 9, 6));
    }

    #[test]
    fn month_aligned_to_monday_needs_no_leading_filler() {
        // February 2021: starts on a Monday and has exactly 28 days
        let matrix = MonthMatrix::build(day(2021, 2, 14));

        assert_eq!(matrix.len(), 4);
        assert_eq!(matrix.weeks()[0][0], day(2021, 2, 1));
        assert_eq!(matrix.weeks()[3][6], day(2021, 2, 28));
    }

    #[test]
    fn five_row_month() {
        // September 2025 starts on a Monday with 30 days
        let matrix = MonthMatrix::build(day(2025, 9, 1));

        assert_eq!(matrix.len(), 5);
        assert_eq!(matrix.weeks()[4][1], day(2025, 9, 30));
        assert_eq!(matrix.weeks()[4][2], day(2025, 10, 1));
    }

    #[test]
    fn in_month_distinguishes_fillers() {
        let matrix = MonthMatrix::build(day(2026, 8, 1));

        assert!(matrix.in_month(day(2026, 8, 1)));
        assert!(matrix.in_month(day(2026, 8, 31)));
        assert!(!matrix.in_month(day(2026, 7, 31)));
        assert!(!matrix.in_month(day(2026, 9, 1)));
    }

    #[test]
    fn reference_day_within_month_does_not_matter() {
        assert_eq!(
            MonthMatrix::build(day(2026, 8, 1)),
            MonthMatrix::build(day(2026, 8, 31))
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

        #[test]
        fn grid_is_contiguous_and_covers_month(year in 1990i32..2100, month in 1u32..=12) {
            let reference = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
            let matrix = MonthMatrix::build(reference);
            let cells: Vec<NaiveDate> = matrix.weeks().iter().flatten().copied().collect();

            prop_assert_eq!(cells.len() % 7, 0);
            prop_assert_eq!(cells[0].weekday(), Weekday::Mon);
            for pair in cells.windows(2) {
                prop_assert_eq!((pair[1] - pair[0]).num_days(), 1);
            }

            let in_month = cells.iter().filter(|d| matrix.in_month(**d)).count() as u32;
            let days_in_month = reference
                .checked_add_months(Months::new(1))
                .and_then(|d| d.pred_opt())
                .map(|d| d.day())
                .unwrap();
            prop_assert_eq!(in_month, days_in_month);
        }
    }
}
