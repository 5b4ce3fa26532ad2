//! Shared helpers for TUI views

use chrono::NaiveDate;

/// Truncates to `max` characters, ellipsizing the tail
pub fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", head)
}

/// Short due-date label for card rows: "today", "3d", "-2d" (overdue)
pub fn due_label(due: NaiveDate, today: NaiveDate) -> String {
    let days = (due - today).num_days();
    match days {
        0 => "today".to_string(),
        d => format!("{}d", d),
    }
}
