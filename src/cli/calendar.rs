//! Month calendar CLI command

use std::collections::HashMap;

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};

use super::output::Output;
use crate::domain::{Milestone, Task};
use crate::sched::MonthMatrix;
use crate::service::ProjectService;

pub fn run(output: &Output, service: &ProjectService, month: Option<String>) -> Result<()> {
    let today = Local::now().date_naive();
    let reference = match month {
        Some(spec) => parse_month(&spec)?,
        None => today,
    };

    let (tasks, milestones): (Vec<Task>, Vec<Milestone>) =
        service.with_store(|s| (s.tasks().to_vec(), s.milestones().to_vec()));

    let matrix = MonthMatrix::build(reference);
    let mut due_count: HashMap<NaiveDate, usize> = HashMap::new();
    for due in tasks
        .iter()
        .filter_map(|t| t.due_date)
        .chain(milestones.iter().filter_map(|m| m.due_date))
    {
        *due_count.entry(due).or_insert(0) += 1;
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "year": matrix.year(),
            "month": matrix.month(),
            "weeks": matrix.weeks().iter().map(|week| {
                week.iter().map(|day| serde_json::json!({
                    "date": day,
                    "in_month": matrix.in_month(*day),
                    "today": *day == today,
                    "due": due_count.get(day).copied().unwrap_or(0),
                })).collect::<Vec<_>>()
            }).collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    println!("{} {}", month_name(matrix.month()), matrix.year());
    println!(" Mo  Tu  We  Th  Fr  Sa  Su");
    for week in matrix.weeks() {
        let row: String = week.iter().map(|day| render_cell(*day, &matrix, today, &due_count)).collect();
        println!("{}", row);
    }

    let mut due_in_month: Vec<(NaiveDate, String, String)> = tasks
        .iter()
        .filter_map(|t| {
            t.due_date
                .filter(|d| matrix.in_month(*d))
                .map(|d| (d, t.id.to_string(), t.title.clone()))
        })
        .chain(milestones.iter().filter_map(|m| {
            m.due_date
                .filter(|d| matrix.in_month(*d))
                .map(|d| (d, m.id.to_string(), format!("{} (milestone)", m.title)))
        }))
        .collect();
    due_in_month.sort();

    if !due_in_month.is_empty() {
        println!();
        println!("Due this month:");
        for (due, id, title) in due_in_month {
            println!("  {:>2}  {:<12} {}", due.day(), id, title);
        }
    }

    Ok(())
}

fn parse_month(spec: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", spec.trim()), "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid month '{}'; expected YYYY-MM", spec))
}

/// One fixed-width (4 char) grid cell. Filler days from adjacent months
/// render blank; today is bracketed; `*` flags days with something due.
fn render_cell(
    day: NaiveDate,
    matrix: &MonthMatrix,
    today: NaiveDate,
    due_count: &HashMap<NaiveDate, usize>,
) -> String {
    if !matrix.in_month(day) {
        return "    ".to_string();
    }
    let marker = if due_count.contains_key(&day) { "*" } else { " " };
    if day == today {
        format!("[{:>2}]", day.day())
    } else {
        format!(" {:>2}{}", day.day(), marker)
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_spec_parses() {
        assert_eq!(parse_month("2026-09").unwrap(), day(2026, 9, 1));
        assert_eq!(parse_month(" 2026-01 ").unwrap(), day(2026, 1, 1));
        assert!(parse_month("September").is_err());
        assert!(parse_month("2026-13").is_err());
    }

    #[test]
    fn cells_mark_today_and_due_days() {
        let matrix = MonthMatrix::build(day(2026, 8, 1));
        let today = day(2026, 8, 26);
        let mut due = HashMap::new();
        due.insert(day(2026, 8, 20), 2);

        assert_eq!(render_cell(today, &matrix, today, &due), "[26]");
        assert_eq!(render_cell(day(2026, 8, 20), &matrix, today, &due), " 20*");
        assert_eq!(render_cell(day(2026, 8, 5), &matrix, today, &due), "  5 ");
        // July filler in the first row renders blank
        assert_eq!(render_cell(day(2026, 7, 27), &matrix, today, &due), "    ");
    }
}
