//! Interactive TUI for planboard
//!
//! Terminal interface for the board, timeline, calendar and milestone
//! views, built on ratatui. Every edit goes through the shared project
//! service, so the screen updates immediately and backend rejections
//! roll the change back.

mod app;
mod ui;
mod utils;
mod views;

use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};

use crate::service::ProjectService;
use crate::storage::UiConfig;
use app::App;

/// View mode for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Board,
    Timeline,
    Calendar,
    Milestones,
}

impl FromStr for ViewMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "board" | "b" | "1" => Ok(ViewMode::Board),
            "timeline" | "t" | "2" => Ok(ViewMode::Timeline),
            "calendar" | "c" | "3" => Ok(ViewMode::Calendar),
            "milestones" | "m" | "4" => Ok(ViewMode::Milestones),
            _ => Err(()),
        }
    }
}

/// Launch the TUI
pub async fn run(service: ProjectService, ui_config: &UiConfig) -> Result<()> {
    let mut terminal = ui::init_terminal()?;
    let mut app = App::new(service, ui_config);

    let res = run_app(&mut terminal, &mut app).await;

    ui::restore_terminal()?;
    res
}

async fn run_app(terminal: &mut ui::Terminal, app: &mut App) -> Result<()> {
    while !app.should_quit() {
        terminal.draw(|frame| app.draw(frame))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key).await?;
            }
        }
    }

    Ok(())
}
