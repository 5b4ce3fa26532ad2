//! TUI application state and logic

use anyhow::Result;
use chrono::{Local, Months, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

use super::views;
use super::ViewMode;
use crate::domain::{Milestone, Task, TaskDraft, TaskId, TaskStatus};
use crate::sched::{DropCommand, TaskFilter};
use crate::service::ProjectService;
use crate::storage::{DefaultWindow, UiConfig};

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search(String),
    NewTask(String),
    Confirm(ConfirmAction),
}

/// Confirmation actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTask(TaskId),
}

/// Application state
pub struct App {
    /// Shared project service; every edit goes through it
    service: ProjectService,

    /// Today, fixed at startup
    today: NaiveDate,

    /// Snapshot of all tasks, refreshed after every action
    tasks: Vec<Task>,

    /// Snapshot of all milestones
    milestones: Vec<Milestone>,

    /// Tasks after search and show-done filtering, in store order
    visible: Vec<Task>,

    /// Current view mode
    view_mode: ViewMode,

    /// Input mode
    input_mode: InputMode,

    /// Search filter applied to the visible tasks
    filter: TaskFilter,

    /// Board cursor: selected column
    column_index: usize,

    /// Board cursor: selected row within the column
    row_index: usize,

    /// Card being carried to another column
    grabbed: Option<TaskId>,

    /// Milestone list cursor
    milestone_index: usize,

    /// Month shown by the calendar view
    calendar_month: NaiveDate,

    /// Date window for the timeline view
    window: DefaultWindow,

    /// Include done tasks in the views
    show_done: bool,

    /// Status message to display
    status_message: Option<String>,

    /// Whether to quit
    should_quit: bool,
}

impl App {
    /// Creates the application over an already-connected service
    pub fn new(service: ProjectService, ui: &UiConfig) -> Self {
        let today = Local::now().date_naive();
        let mut app = Self {
            service,
            today,
            tasks: Vec::new(),
            milestones: Vec::new(),
            visible: Vec::new(),
            view_mode: ViewMode::default(),
            input_mode: InputMode::default(),
            filter: TaskFilter::all(),
            column_index: 0,
            row_index: 0,
            grabbed: None,
            milestone_index: 0,
            calendar_month: today,
            window: ui.default_window,
            show_done: !ui.hide_done,
            status_message: None,
            should_quit: false,
        };
        app.sync_from_store();
        app
    }

    /// Draw the UI
    pub fn draw(&self, frame: &mut Frame) {
        match self.view_mode() {
            ViewMode::Board => views::board::draw(frame, self),
            ViewMode::Timeline => views::timeline::draw(frame, self),
            ViewMode::Calendar => views::calendar::draw(frame, self),
            ViewMode::Milestones => views::milestones::draw(frame, self),
        }
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        match self.input_mode.clone() {
            InputMode::Normal => self.handle_normal_key(key).await,
            InputMode::Search(query) => {
                self.handle_search_key(key, query);
                Ok(())
            }
            InputMode::NewTask(title) => self.handle_new_task_key(key, title).await,
            InputMode::Confirm(action) => self.handle_confirm_key(key, action).await,
        }
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }

            // View switching
            KeyCode::Char('1') => self.view_mode = ViewMode::Board,
            KeyCode::Char('2') => self.view_mode = ViewMode::Timeline,
            KeyCode::Char('3') => self.view_mode = ViewMode::Calendar,
            KeyCode::Char('4') => self.view_mode = ViewMode::Milestones,

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('h') | KeyCode::Left => self.move_left(),
            KeyCode::Char('l') | KeyCode::Right => self.move_right(),

            // Board actions
            KeyCode::Char(' ') => self.grab_or_drop().await,
            KeyCode::Esc => {
                if self.grabbed.take().is_some() {
                    self.status_message = Some("Put back".to_string());
                }
            }
            KeyCode::Char('d') => self.mark_done().await,
            KeyCode::Char('D') => self.confirm_delete(),
            KeyCode::Char('n') => {
                self.input_mode = InputMode::NewTask(String::new());
            }

            // Search
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Search(String::new());
            }

            // Toggles and view controls
            KeyCode::Char('x') => {
                self.show_done = !self.show_done;
                self.rebuild_visible();
            }
            KeyCode::Char('w') => self.cycle_window(),
            KeyCode::Char('t') => {
                if self.view_mode == ViewMode::Calendar {
                    self.calendar_month = self.today;
                }
            }
            KeyCode::Char('r') => self.refresh().await,

            // Help
            KeyCode::Char('?') => {
                self.status_message = Some(
                    "space:carry/drop d:done D:delete n:new /:search x:show-done w:window 1-4:views q:quit"
                        .to_string(),
                );
            }

            _ => {}
        }

        Ok(())
    }

    fn handle_search_key(&mut self, key: KeyEvent, query: String) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.set_search("");
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                let mut query = query;
                query.pop();
                self.set_search(&query);
                self.input_mode = InputMode::Search(query);
            }
            KeyCode::Char(c) => {
                let mut query = query;
                query.push(c);
                self.set_search(&query);
                self.input_mode = InputMode::Search(query);
            }
            _ => {}
        }
    }

    async fn handle_new_task_key(&mut self, key: KeyEvent, title: String) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                if !title.trim().is_empty() {
                    self.create_task(title).await;
                }
            }
            KeyCode::Backspace => {
                let mut title = title;
                title.pop();
                self.input_mode = InputMode::NewTask(title);
            }
            KeyCode::Char(c) => {
                let mut title = title;
                title.push(c);
                self.input_mode = InputMode::NewTask(title);
            }
            _ => {}
        }

        Ok(())
    }

    async fn handle_confirm_key(&mut self, key: KeyEvent, action: ConfirmAction) -> Result<()> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                match action {
                    ConfirmAction::DeleteTask(id) => self.delete_task(id).await,
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }

        Ok(())
    }

    // Navigation

    fn move_down(&mut self) {
        match self.view_mode {
            ViewMode::Board => {
                let len = self.column_len(self.column_index);
                if len > 0 {
                    self.row_index = (self.row_index + 1) % len;
                }
            }
            ViewMode::Milestones => {
                let rows = self.milestone_rows();
                self.milestone_index = (self.milestone_index + 1) % rows;
            }
            _ => {}
        }
    }

    fn move_up(&mut self) {
        match self.view_mode {
            ViewMode::Board => {
                let len = self.column_len(self.column_index);
                if len > 0 {
                    self.row_index = if self.row_index == 0 {
                        len - 1
                    } else {
                        self.row_index - 1
                    };
                }
            }
            ViewMode::Milestones => {
                let rows = self.milestone_rows();
                self.milestone_index = if self.milestone_index == 0 {
                    rows - 1
                } else {
                    self.milestone_index - 1
                };
            }
            _ => {}
        }
    }

    fn move_left(&mut self) {
        match self.view_mode {
            ViewMode::Board => {
                let cols = TaskStatus::all().len();
                self.column_index = (self.column_index + cols - 1) % cols;
                self.clamp_row();
            }
            ViewMode::Calendar => {
                if let Some(prev) = self.calendar_month.checked_sub_months(Months::new(1)) {
                    self.calendar_month = prev;
                }
            }
            _ => {}
        }
    }

    fn move_right(&mut self) {
        match self.view_mode {
            ViewMode::Board => {
                let cols = TaskStatus::all().len();
                self.column_index = (self.column_index + 1) % cols;
                self.clamp_row();
            }
            ViewMode::Calendar => {
                if let Some(next) = self.calendar_month.checked_add_months(Months::new(1)) {
                    self.calendar_month = next;
                }
            }
            _ => {}
        }
    }

    // Actions; backend rejections land in the status bar instead of
    // killing the UI, since the store already rolled the change back.

    async fn grab_or_drop(&mut self) {
        if self.view_mode != ViewMode::Board {
            return;
        }

        match self.grabbed.take() {
            None => {
                let picked = self
                    .selected_task()
                    .map(|t| (t.id.clone(), t.title.clone()));
                if let Some((id, title)) = picked {
                    self.grabbed = Some(id);
                    self.status_message =
                        Some(format!("Carrying: {} (space drops, esc cancels)", title));
                }
            }
            Some(id) => {
                let target = TaskStatus::all()[self.column_index];
                let current = self.tasks.iter().find(|t| t.id == id).map(|t| t.status);
                let drop = DropCommand::new(id, target);
                match current {
                    None => {
                        self.status_message = Some("Task no longer exists".to_string());
                    }
                    Some(current) if drop.is_noop(current) => {
                        self.status_message = Some("Put back".to_string());
                    }
                    Some(_) => {
                        match self.service.apply_drop(drop).await {
                            Ok(()) => {
                                self.status_message =
                                    Some(format!("Moved to {}", target.label()));
                            }
                            Err(e) => {
                                self.status_message = Some(format!("Rejected: {}", e));
                            }
                        }
                        self.sync_from_store();
                    }
                }
            }
        }
    }

    async fn mark_done(&mut self) {
        if self.view_mode != ViewMode::Board {
            return;
        }

        let picked = self
            .selected_task()
            .map(|t| (t.id.clone(), t.title.clone(), t.status));
        if let Some((id, title, status)) = picked {
            if status.is_complete() {
                self.status_message = Some("Already done".to_string());
                return;
            }
            match self.service.set_task_status(&id, TaskStatus::Done).await {
                Ok(()) => self.status_message = Some(format!("Done: {}", title)),
                Err(e) => self.status_message = Some(format!("Rejected: {}", e)),
            }
            self.sync_from_store();
        }
    }

    fn confirm_delete(&mut self) {
        if self.view_mode != ViewMode::Board {
            return;
        }

        if let Some(id) = self.selected_task().map(|t| t.id.clone()) {
            self.input_mode = InputMode::Confirm(ConfirmAction::DeleteTask(id));
        }
    }

    async fn delete_task(&mut self, id: TaskId) {
        let title = self
            .tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| id.to_string());
        match self.service.delete_task(&id).await {
            Ok(()) => self.status_message = Some(format!("Deleted: {}", title)),
            Err(e) => self.status_message = Some(format!("Rejected: {}", e)),
        }
        self.sync_from_store();
    }

    async fn create_task(&mut self, title: String) {
        let draft = TaskDraft::new(title.trim());
        match self.service.create_task(draft).await {
            Ok(_) => self.status_message = Some(format!("Created: {}", title.trim())),
            Err(e) => self.status_message = Some(format!("Rejected: {}", e)),
        }
        self.sync_from_store();
    }

    async fn refresh(&mut self) {
        match self.service.refresh().await {
            Ok(()) => self.status_message = Some("Refreshed".to_string()),
            Err(e) => self.status_message = Some(format!("Refresh failed: {}", e)),
        }
        self.sync_from_store();
    }

    fn cycle_window(&mut self) {
        self.window = match self.window {
            DefaultWindow::Week => DefaultWindow::Month,
            DefaultWindow::Month => DefaultWindow::Full,
            DefaultWindow::Full => DefaultWindow::Week,
        };
    }

    fn set_search(&mut self, query: &str) {
        self.filter = TaskFilter::all().with_search(query);
        self.rebuild_visible();
    }

    // State upkeep

    /// Re-reads the snapshots from the shared store
    fn sync_from_store(&mut self) {
        let (tasks, milestones) = self
            .service
            .with_store(|s| (s.tasks().to_vec(), s.milestones().to_vec()));
        self.tasks = tasks;
        self.milestones = milestones;
        self.rebuild_visible();
    }

    fn rebuild_visible(&mut self) {
        self.visible = self
            .filter
            .apply(&self.tasks)
            .into_iter()
            .filter(|t| self.show_done || !t.status.is_complete())
            .cloned()
            .collect();
        self.clamp_row();
        let rows = self.milestone_rows();
        if self.milestone_index >= rows {
            self.milestone_index = rows - 1;
        }
    }

    fn clamp_row(&mut self) {
        let len = self.column_len(self.column_index);
        if self.row_index >= len {
            self.row_index = len.saturating_sub(1);
        }
    }

    fn column_len(&self, column: usize) -> usize {
        let status = TaskStatus::all()[column];
        self.visible.iter().filter(|t| t.status == status).count()
    }

    /// Milestone list length, including the trailing unassigned section
    fn milestone_rows(&self) -> usize {
        self.milestones.len() + 1
    }

    fn selected_task(&self) -> Option<&Task> {
        let status = TaskStatus::all()[self.column_index];
        self.visible
            .iter()
            .filter(|t| t.status == status)
            .nth(self.row_index)
    }

    // Accessors for views

    pub fn visible_tasks(&self) -> &[Task] {
        &self.visible
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn input_mode(&self) -> &InputMode {
        &self.input_mode
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn column_index(&self) -> usize {
        self.column_index
    }

    pub fn row_index(&self) -> usize {
        self.row_index
    }

    pub fn milestone_index(&self) -> usize {
        self.milestone_index
    }

    pub fn grabbed_title(&self) -> Option<&str> {
        let id = self.grabbed.as_ref()?;
        self.tasks.iter().find(|t| &t.id == id).map(|t| t.title.as_str())
    }

    pub fn window(&self) -> DefaultWindow {
        self.window
    }

    pub fn calendar_month(&self) -> NaiveDate {
        self.calendar_month
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}
