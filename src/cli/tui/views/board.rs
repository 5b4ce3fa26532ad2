//! Board view: tasks grouped by status in columns, one cursor

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::cli::tui::app::App;
use crate::cli::tui::utils::{due_label, truncate_str};
use crate::domain::TaskStatus;
use crate::sched::{board_columns, BoardStats, BOARD_DUE_SOON_DAYS};

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Stats line
            Constraint::Min(10),   // Columns
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    draw_stats(frame, app, chunks[0]);

    let column_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(chunks[1]);

    let columns = board_columns(app.visible_tasks());
    for (index, column) in columns.iter().enumerate() {
        let selected = index == app.column_index();
        draw_column(frame, app, column, selected, column_areas[index]);
    }

    super::status_bar(
        frame,
        app,
        chunks[2],
        "[1:Board]",
        "space:carry/drop d:done D:delete n:new /:search ?:help q:quit",
    );
}

fn draw_stats(frame: &mut Frame, app: &App, area: Rect) {
    let stats = BoardStats::collect(app.visible_tasks(), app.today());
    let text = format!(
        " {} tasks | {} overdue | {} due soon",
        stats.total, stats.overdue, stats.due_soon
    );
    let style = if stats.overdue > 0 {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn draw_column(
    frame: &mut Frame,
    app: &App,
    column: &crate::sched::BoardColumn,
    selected: bool,
    area: Rect,
) {
    let today = app.today();
    let items: Vec<ListItem> = column
        .tasks
        .iter()
        .map(|task| {
            let mut line = truncate_str(&task.title, 22);
            if let Some(due) = task.due_date {
                line = format!("{} {}", line, due_label(due, today));
            }
            let style = if task.is_overdue(today) {
                Style::default().fg(Color::Red)
            } else if task.is_due_soon(today, BOARD_DUE_SOON_DAYS) {
                Style::default().fg(Color::Yellow)
            } else if task.status.is_complete() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let border_style = if selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(column_color(column.status))
    };

    let title = format!("{} ({})", column.status.label(), column.len());
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("» ");

    // The cursor only shows in the selected column
    let mut state = ListState::default();
    if selected && !column.is_empty() {
        state.select(Some(app.row_index()));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn column_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Green,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Review => Color::Magenta,
        TaskStatus::Done => Color::DarkGray,
    }
}
