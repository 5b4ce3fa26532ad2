//! Milestones view: milestone list on the left, detail pane on the right

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
};

use crate::cli::tui::app::App;
use crate::cli::tui::utils::{due_label, truncate_str};
use crate::domain::{Task, TaskStatus};
use crate::sched::{group_by_milestone, GroupedTasks, MilestoneGroup};

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),   // Panes
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[0]);

    let grouped = group_by_milestone(app.milestones(), app.visible_tasks());

    draw_list(frame, app, &grouped, panes[0]);
    // The row after the last milestone is the unassigned bucket
    if app.milestone_index() < grouped.groups.len() {
        draw_group_detail(frame, app, &grouped.groups[app.milestone_index()], panes[1]);
    } else {
        draw_unassigned_detail(frame, app, &grouped, panes[1]);
    }

    super::status_bar(
        frame,
        app,
        chunks[1],
        "[4:Milestones]",
        "j/k:select /:search x:show-done 1-4:views q:quit",
    );
}

fn draw_list(frame: &mut Frame, app: &App, grouped: &GroupedTasks, area: Rect) {
    let mut items: Vec<ListItem> = grouped
        .groups
        .iter()
        .map(|group| {
            let style = if group.milestone.status.is_closed() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            ListItem::new(format!(
                "{:>3}% {}",
                group.progress(),
                truncate_str(&group.milestone.title, 28)
            ))
            .style(style)
        })
        .collect();
    items.push(
        ListItem::new(format!("     Unassigned ({})", grouped.unassigned.len()))
            .style(Style::default().fg(Color::DarkGray)),
    );

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Milestones ({})", grouped.groups.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("» ");

    let mut state = ListState::default();
    state.select(Some(app.milestone_index()));

    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_group_detail(frame: &mut Frame, app: &App, group: &MilestoneGroup, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Length(3), // Progress gauge
            Constraint::Min(3),    // Tasks
        ])
        .split(area);

    let milestone = group.milestone;
    let mut header = vec![Line::from(vec![
        Span::styled(
            milestone.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  [{}]", milestone.status.label())),
    ])];
    if let Some(due) = milestone.due_date {
        header.push(Line::from(format!(
            "Due {} ({})",
            due,
            due_label(due, app.today())
        )));
    }
    if let Some(description) = &milestone.description {
        header.push(Line::from(Span::styled(
            truncate_str(description, 60),
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(
        Paragraph::new(header).block(Block::default().borders(Borders::ALL)),
        chunks[0],
    );

    let progress = group.progress();
    let gauge = Gauge::default()
        .block(Block::default().title("Progress").borders(Borders::ALL))
        .gauge_style(Style::default().fg(gauge_color(progress)))
        .percent(progress as u16);
    frame.render_widget(gauge, chunks[1]);

    draw_task_list(frame, app, &group.tasks, "Tasks", chunks[2]);
}

fn draw_unassigned_detail(frame: &mut Frame, app: &App, grouped: &GroupedTasks, area: Rect) {
    draw_task_list(frame, app, &grouped.unassigned, "Unassigned tasks", area);
}

fn draw_task_list(frame: &mut Frame, app: &App, tasks: &[&Task], title: &str, area: Rect) {
    let today = app.today();
    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| {
            let mut line = format!(
                "{} {}",
                status_icon(task.status),
                truncate_str(&task.title, 40)
            );
            if let Some(due) = task.due_date {
                line = format!("{} {}", line, due_label(due, today));
            }
            let style = if task.is_overdue(today) {
                Style::default().fg(Color::Red)
            } else if task.status.is_complete() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(format!("{} ({})", title, tasks.len()))
            .borders(Borders::ALL),
    );

    frame.render_widget(list, area);
}

fn status_icon(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Review => "[r]",
        TaskStatus::Done => "[x]",
    }
}

fn gauge_color(progress: u8) -> Color {
    match progress {
        100 => Color::Green,
        50..=99 => Color::Cyan,
        _ => Color::Yellow,
    }
}
