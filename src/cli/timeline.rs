//! Timeline (gantt) CLI command

use anyhow::Result;
use chrono::{Local, NaiveDate};

use super::output::Output;
use crate::domain::{Milestone, Task};
use crate::sched::{layout_rows, DayWindow, TaskBar, WindowMode};
use crate::service::ProjectService;
use crate::storage::DefaultWindow;

/// Character width of the rendered bar track
const TRACK_WIDTH: usize = 42;

pub fn run(
    output: &Output,
    service: &ProjectService,
    window: DefaultWindow,
    date: Option<&str>,
) -> Result<()> {
    let today = Local::now().date_naive();
    let reference = match date {
        Some(spec) => parse_date(spec)?,
        None => today,
    };
    let (mut tasks, milestones): (Vec<Task>, Vec<Milestone>) =
        service.with_store(|s| (s.tasks().to_vec(), s.milestones().to_vec()));

    let window = match window {
        DefaultWindow::Week => DayWindow::week(reference),
        DefaultWindow::Month => DayWindow::month(reference),
        DefaultWindow::Full => DayWindow::full_span(&tasks, &milestones, reference),
    };

    // Dated tasks first, earliest first; undated tasks sink to the bottom
    tasks.sort_by_key(|t| {
        let anchor = t.start_date.or(t.due_date);
        (anchor.is_none(), anchor, t.due_date)
    });

    let rows = layout_rows(&tasks, &window);
    let today_col = window
        .position(today)
        .map(|idx| idx * TRACK_WIDTH / window.len());

    if output.is_json() {
        output.data(&serde_json::json!({
            "window": {
                "mode": mode_name(window.mode()),
                "first": window.first(),
                "last": window.last(),
                "days": window.len(),
            },
            "rows": rows.iter().map(|(task, bar)| serde_json::json!({
                "id": task.id.to_string(),
                "title": task.title,
                "status": task.status,
                "bar": bar,
            })).collect::<Vec<_>>(),
            "milestones": milestones.iter()
                .filter_map(|m| m.due_date.map(|due| serde_json::json!({
                    "id": m.id.to_string(),
                    "title": m.title,
                    "due_date": due,
                    "in_window": window.contains(due),
                })))
                .collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    println!(
        "Timeline {} to {} ({} days)",
        window.first(),
        window.last(),
        window.len()
    );
    println!();

    if rows.is_empty() {
        println!("No tasks");
    }
    for (task, bar) in &rows {
        println!(
            "  {:<28.28} [{}]",
            task.title,
            render_track(*bar, today_col)
        );
    }

    let dated: Vec<(&Milestone, NaiveDate)> = milestones
        .iter()
        .filter_map(|m| m.due_date.map(|due| (m, due)))
        .collect();
    if !dated.is_empty() {
        println!();
        println!("Milestones:");
        for (milestone, due) in dated {
            match window.position(due) {
                Some(idx) => {
                    let col = idx * TRACK_WIDTH / window.len();
                    println!(
                        "  {:<28.28} [{}]",
                        milestone.title,
                        render_marker(col, today_col)
                    );
                }
                None => println!(
                    "  {:<28.28} (due {}, outside view)",
                    milestone.title, due
                ),
            }
        }
    }

    Ok(())
}

fn mode_name(mode: WindowMode) -> &'static str {
    match mode {
        WindowMode::Week => "week",
        WindowMode::Month => "month",
        WindowMode::FullSpan => "full",
    }
}

fn parse_date(spec: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(spec.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{}'; expected YYYY-MM-DD", spec))
}

/// Renders one task row's track: `=` for the bar, `|` for today's column
/// (`#` where the two overlap), `.` elsewhere.
fn render_track(bar: Option<TaskBar>, today_col: Option<usize>) -> String {
    let mut cells = vec!['.'; TRACK_WIDTH];
    if let Some(bar) = bar {
        let left = ((bar.left / 100.0) * TRACK_WIDTH as f64).floor() as usize;
        let span = (((bar.width / 100.0) * TRACK_WIDTH as f64).ceil() as usize).max(1);
        for cell in cells.iter_mut().skip(left).take(span) {
            *cell = '=';
        }
    }
    mark_today(&mut cells, today_col);
    cells.into_iter().collect()
}

/// Renders a milestone row's track: a single `^` at the due column
fn render_marker(col: usize, today_col: Option<usize>) -> String {
    let mut cells = vec!['.'; TRACK_WIDTH];
    if col < TRACK_WIDTH {
        cells[col] = '^';
    }
    mark_today(&mut cells, today_col);
    cells.into_iter().collect()
}

fn mark_today(cells: &mut [char], today_col: Option<usize>) {
    if let Some(col) = today_col {
        if col < cells.len() {
            cells[col] = match cells[col] {
                '.' => '|',
                '^' => '^',
                _ => '#',
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_paints_bar_and_today() {
        let bar = TaskBar {
            left: 0.0,
            width: 50.0,
        };
        let track = render_track(Some(bar), Some(30));

        assert!(track.starts_with('='));
        assert_eq!(track.chars().nth(30), Some('|'));
        assert_eq!(track.len(), TRACK_WIDTH);
    }

    #[test]
    fn today_inside_bar_becomes_hash() {
        let bar = TaskBar {
            left: 0.0,
            width: 100.0,
        };
        let track = render_track(Some(bar), Some(10));

        assert_eq!(track.chars().nth(10), Some('#'));
    }

    #[test]
    fn barless_track_is_dots_with_today() {
        let track = render_track(None, Some(0));

        assert_eq!(track.chars().next(), Some('|'));
        assert!(track.chars().skip(1).all(|c| c == '.'));
    }

    #[test]
    fn narrow_bar_still_paints_one_cell() {
        // One day of a long full-span window rounds below a single cell
        let bar = TaskBar {
            left: 50.0,
            width: 0.4,
        };
        let track = render_track(Some(bar), None);

        assert_eq!(track.matches('=').count(), 1);
    }

    #[test]
    fn date_spec_parses() {
        assert_eq!(
            parse_date("2026-09-15").unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 15).unwrap()
        );
        assert_eq!(
            parse_date(" 2026-01-02 ").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()
        );
        assert!(parse_date("next week").is_err());
        assert!(parse_date("2026-02-30").is_err());
    }
}
