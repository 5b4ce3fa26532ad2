//! Timeline view: one bar track per task over a shared day window

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::cli::tui::app::App;
use crate::sched::{layout_rows, DayWindow, TaskBar, WindowMode, BOARD_DUE_SOON_DAYS};
use crate::storage::DefaultWindow;

/// Character width of the task label column
const TITLE_WIDTH: usize = 22;

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),   // Tracks
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    let window = build_window(app);
    draw_tracks(frame, app, &window, chunks[0]);

    super::status_bar(
        frame,
        app,
        chunks[1],
        "[2:Timeline]",
        "w:window /:search x:show-done 1-4:views q:quit",
    );
}

fn build_window(app: &App) -> DayWindow {
    match app.window() {
        DefaultWindow::Week => DayWindow::week(app.today()),
        DefaultWindow::Month => DayWindow::month(app.today()),
        DefaultWindow::Full => {
            DayWindow::full_span(app.visible_tasks(), app.milestones(), app.today())
        }
    }
}

fn draw_tracks(frame: &mut Frame, app: &App, window: &DayWindow, area: Rect) {
    // Label column, one space gutter, track, borders
    let track_width = (area.width as usize)
        .saturating_sub(TITLE_WIDTH + 3)
        .max(7);
    let today = app.today();
    let today_col = window
        .position(today)
        .map(|idx| idx * track_width / window.len());

    let rows = layout_rows(app.visible_tasks(), window);
    let mut lines: Vec<Line> = Vec::with_capacity(rows.len() + app.milestones().len() + 1);

    if rows.is_empty() {
        lines.push(Line::from(Span::styled(
            "No tasks in view",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (task, bar) in &rows {
        let style = if task.is_overdue(today) {
            Style::default().fg(Color::Red)
        } else if task.is_due_soon(today, BOARD_DUE_SOON_DAYS) {
            Style::default().fg(Color::Yellow)
        } else if task.status.is_complete() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let text = format!(
            "{:<width$.width$} {}",
            task.title,
            render_track(*bar, today_col, track_width),
            width = TITLE_WIDTH,
        );
        lines.push(Line::from(Span::styled(text, style)));
    }

    // Milestones sit below the tasks as single-day diamonds
    let dated: Vec<_> = app
        .milestones()
        .iter()
        .filter_map(|m| m.due_date.and_then(|due| window.position(due).map(|p| (m, p))))
        .collect();
    if !dated.is_empty() {
        lines.push(Line::default());
        for (milestone, idx) in dated {
            let col = idx * track_width / window.len();
            let text = format!(
                "{:<width$.width$} {}",
                milestone.title,
                render_marker(col, today_col, track_width),
                width = TITLE_WIDTH,
            );
            lines.push(Line::from(Span::styled(
                text,
                Style::default().fg(Color::Magenta),
            )));
        }
    }

    let title = format!(
        "Timeline {} to {} ({})",
        window.first(),
        window.last(),
        mode_label(window.mode()),
    );
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(paragraph, area);
}

fn mode_label(mode: WindowMode) -> &'static str {
    match mode {
        WindowMode::Week => "week",
        WindowMode::Month => "month",
        WindowMode::FullSpan => "full",
    }
}

/// `█` for the bar, `│` for today's column, `·` elsewhere
fn render_track(bar: Option<TaskBar>, today_col: Option<usize>, width: usize) -> String {
    let mut cells = vec!['·'; width];
    if let Some(bar) = bar {
        let left = ((bar.left / 100.0) * width as f64).floor() as usize;
        let span = (((bar.width / 100.0) * width as f64).ceil() as usize).max(1);
        for cell in cells.iter_mut().skip(left).take(span) {
            *cell = '█';
        }
    }
    mark_today(&mut cells, today_col);
    cells.into_iter().collect()
}

/// A single `◆` at the milestone's due column
fn render_marker(col: usize, today_col: Option<usize>, width: usize) -> String {
    let mut cells = vec!['·'; width];
    if col < width {
        cells[col] = '◆';
    }
    mark_today(&mut cells, today_col);
    cells.into_iter().collect()
}

fn mark_today(cells: &mut [char], today_col: Option<usize>) {
    if let Some(col) = today_col {
        if col < cells.len() && cells[col] == '·' {
            cells[col] = '│';
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_scales_bar_to_width() {
        let bar = TaskBar {
            left: 0.0,
            width: 50.0,
        };
        let track = render_track(Some(bar), None, 20);

        assert_eq!(track.chars().filter(|c| *c == '█').count(), 10);
        assert_eq!(track.chars().count(), 20);
    }

    #[test]
    fn today_never_overwrites_a_bar_cell() {
        let bar = TaskBar {
            left: 0.0,
            width: 100.0,
        };
        let track = render_track(Some(bar), Some(5), 10);

        assert!(track.chars().all(|c| c == '█'));
    }

    #[test]
    fn marker_lands_on_due_column() {
        let track = render_marker(3, Some(7), 10);

        assert_eq!(track.chars().nth(3), Some('◆'));
        assert_eq!(track.chars().nth(7), Some('│'));
    }
}
