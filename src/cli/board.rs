//! Kanban board CLI commands

use anyhow::Result;
use chrono::Local;
use clap::Subcommand;

use super::output::Output;
use super::task::resolve_task;
use crate::domain::{Task, TaskStatus};
use crate::sched::{board_columns, BoardStats, DropCommand, BOARD_DUE_SOON_DAYS};
use crate::service::ProjectService;

#[derive(Subcommand)]
pub enum BoardCommands {
    /// Move a task to another column
    Move {
        /// Task ID
        id: String,

        /// Target column (todo, in-progress, review, done)
        status: TaskStatus,
    },
}

pub async fn run(
    cmd: Option<BoardCommands>,
    output: &Output,
    service: &ProjectService,
) -> Result<()> {
    match cmd {
        Some(BoardCommands::Move { id, status }) => move_task(output, service, &id, status).await,
        None => show_board(output, service),
    }
}

fn show_board(output: &Output, service: &ProjectService) -> Result<()> {
    let tasks: Vec<Task> = service.with_store(|s| s.tasks().to_vec());
    let today = Local::now().date_naive();
    let stats = BoardStats::collect(&tasks, today);
    let columns = board_columns(&tasks);

    if output.is_json() {
        output.data(&serde_json::json!({
            "stats": stats,
            "columns": columns.iter().map(|col| serde_json::json!({
                "status": col.status,
                "count": col.len(),
                "tasks": col.tasks.iter().map(|t| serde_json::json!({
                    "id": t.id.to_string(),
                    "title": t.title,
                    "due_date": t.due_date,
                    "overdue": t.is_overdue(today),
                    "due_soon": t.is_due_soon(today, BOARD_DUE_SOON_DAYS),
                })).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    println!(
        "{} tasks: {} todo, {} in progress, {} review, {} done",
        stats.total, stats.todo, stats.in_progress, stats.review, stats.done
    );
    if stats.due_soon > 0 || stats.overdue > 0 {
        println!(
            "Attention: {} due soon, {} overdue",
            stats.due_soon, stats.overdue
        );
    }

    for col in &columns {
        println!();
        println!("{} ({})", col.status.label().to_uppercase(), col.len());
        println!("{}", "-".repeat(50));
        for task in &col.tasks {
            let marker = if task.is_overdue(today) {
                " !"
            } else if task.is_due_soon(today, BOARD_DUE_SOON_DAYS) {
                " *"
            } else {
                ""
            };
            match task.due_date {
                Some(due) => println!("  {:<12} {}  (due {}{})", task.id, task.title, due, marker),
                None => println!("  {:<12} {}", task.id, task.title),
            }
        }
    }

    Ok(())
}

async fn move_task(
    output: &Output,
    service: &ProjectService,
    id_str: &str,
    status: TaskStatus,
) -> Result<()> {
    let id = resolve_task(service, id_str)?;
    let current = service
        .with_store(|s| s.task(&id).map(|t| t.status))
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    let drop = DropCommand::new(id.clone(), status);
    let moved = !drop.is_noop(current);
    service.apply_drop(drop).await?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id.to_string(),
            "status": status,
            "moved": moved,
        }));
    } else if moved {
        output.success(&format!("Moved {} to {}", id, status));
    } else {
        output.success(&format!("Task {} is already in {}", id, status));
    }

    Ok(())
}
