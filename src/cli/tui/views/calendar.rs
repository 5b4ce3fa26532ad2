//! Calendar view: a month grid with due dates highlighted

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::cli::tui::app::App;
use crate::cli::tui::utils::truncate_str;
use crate::sched::MonthMatrix;

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Month grid
            Constraint::Min(3),     // Due list
            Constraint::Length(3),  // Status bar
        ])
        .split(area);

    let matrix = MonthMatrix::build(app.calendar_month());
    let due_counts = collect_due_counts(app);

    draw_grid(frame, app, &matrix, &due_counts, chunks[0]);
    draw_due_list(frame, app, &matrix, chunks[1]);

    super::status_bar(
        frame,
        app,
        chunks[2],
        "[3:Calendar]",
        "h/l:month t:today 1-4:views q:quit",
    );
}

fn collect_due_counts(app: &App) -> HashMap<NaiveDate, usize> {
    let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
    for due in app.visible_tasks().iter().filter_map(|t| t.due_date) {
        *counts.entry(due).or_default() += 1;
    }
    for due in app.milestones().iter().filter_map(|m| m.due_date) {
        *counts.entry(due).or_default() += 1;
    }
    counts
}

fn draw_grid(
    frame: &mut Frame,
    app: &App,
    matrix: &MonthMatrix,
    due_counts: &HashMap<NaiveDate, usize>,
    area: Rect,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(matrix.len() + 1);
    lines.push(Line::from(Span::styled(
        " Mo  Tu  We  Th  Fr  Sa  Su",
        Style::default().add_modifier(Modifier::BOLD),
    )));

    for week in matrix.weeks() {
        let spans: Vec<Span> = week
            .iter()
            .map(|date| day_cell(*date, matrix, app.today(), due_counts))
            .collect();
        lines.push(Line::from(spans));
    }

    let title = app.calendar_month().format("%B %Y").to_string();
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(paragraph, area);
}

fn day_cell<'a>(
    date: NaiveDate,
    matrix: &MonthMatrix,
    today: NaiveDate,
    due_counts: &HashMap<NaiveDate, usize>,
) -> Span<'a> {
    let has_due = due_counts.contains_key(&date);
    let text = if has_due {
        format!(" {:>2}*", date.day())
    } else {
        format!(" {:>2} ", date.day())
    };

    let style = if date == today {
        Style::default().add_modifier(Modifier::REVERSED)
    } else if !matrix.in_month(date) {
        Style::default().fg(Color::DarkGray)
    } else if has_due {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    Span::styled(text, style)
}

fn draw_due_list(frame: &mut Frame, app: &App, matrix: &MonthMatrix, area: Rect) {
    // Everything due in the displayed month, tasks and milestones mixed,
    // ordered by day
    let mut due: Vec<(NaiveDate, String, Style)> = Vec::new();
    for task in app.visible_tasks() {
        if let Some(date) = task.due_date.filter(|d| matrix.in_month(*d)) {
            let style = if task.is_overdue(app.today()) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            due.push((
                date,
                format!(
                    "{:>2}  {:<12} {}",
                    date.day(),
                    task.status.to_string(),
                    truncate_str(&task.title, 40)
                ),
                style,
            ));
        }
    }
    for milestone in app.milestones() {
        if let Some(date) = milestone.due_date.filter(|d| matrix.in_month(*d)) {
            due.push((
                date,
                format!(
                    "{:>2}  {:<12} {} (milestone)",
                    date.day(),
                    milestone.status.to_string(),
                    truncate_str(&milestone.title, 40)
                ),
                Style::default().fg(Color::Magenta),
            ));
        }
    }
    due.sort_by_key(|(date, _, _)| *date);

    let lines: Vec<Line> = if due.is_empty() {
        vec![Line::from(Span::styled(
            "Nothing due this month",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        due.into_iter()
            .map(|(_, text, style)| Line::from(Span::styled(text, style)))
            .collect()
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title("Due this month")
            .borders(Borders::ALL),
    );

    frame.render_widget(paragraph, area);
}
