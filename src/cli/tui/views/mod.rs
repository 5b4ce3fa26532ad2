//! TUI view renderers

pub mod board;
pub mod calendar;
pub mod milestones;
pub mod timeline;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use super::app::{App, ConfirmAction, InputMode};

/// Bottom status bar shared by every view: input echo, pending
/// confirmation, carried card, or the view's key help.
pub(super) fn status_bar(frame: &mut Frame, app: &App, area: Rect, view_label: &str, help: &str) {
    let (content, style) = match app.input_mode() {
        InputMode::Normal => {
            let msg = match (app.status_message(), app.grabbed_title()) {
                (Some(msg), _) => msg.to_string(),
                (None, Some(title)) => format!("Carrying: {}", title),
                (None, None) => help.to_string(),
            };
            (msg, Style::default())
        }
        InputMode::Search(query) => (
            format!("Search: {}_", query),
            Style::default().fg(Color::Yellow),
        ),
        InputMode::NewTask(title) => (
            format!("New task: {}_", title),
            Style::default().fg(Color::Green),
        ),
        InputMode::Confirm(ConfirmAction::DeleteTask(id)) => (
            format!("Delete task {}? [y/n]", id),
            Style::default().fg(Color::Red),
        ),
    };

    let text = format!("Planboard {} {}", view_label, content);
    let paragraph = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}
