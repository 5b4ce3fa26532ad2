//! Task CLI commands

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Subcommand;

use super::output::Output;
use crate::domain::{
    DUE_SOON_DAYS, MilestoneId, Priority, Task, TaskDraft, TaskId, TaskPatch, TaskStatus,
};
use crate::sched::{MilestoneFilter, StatusFilter, TaskFilter};
use crate::service::ProjectService;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    ///
    /// Examples:
    ///   planboard task add "Fix header"
    ///   planboard task add "Design review" --due 2026-09-04 --milestone m-7f2b4c1
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(long)]
        description: Option<String>,

        /// First day of the planned range (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,

        /// Milestone to assign the task to
        #[arg(long)]
        milestone: Option<String>,

        /// Priority (low, medium, high, urgent)
        #[arg(long)]
        priority: Option<Priority>,

        /// Assignee identifier
        #[arg(long)]
        assignee: Option<String>,
    },

    /// List tasks
    List {
        /// Filter by status (todo, in-progress, review, done, all)
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// Filter by milestone id, or "unassigned" / "all"
        #[arg(long, default_value = "all")]
        milestone: MilestoneFilter,

        /// Title substring to search for
        #[arg(long)]
        search: Option<String>,
    },

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },

    /// Move a task to a status
    Status {
        /// Task ID
        id: String,

        /// New status (todo, in-progress, review, done)
        status: TaskStatus,
    },

    /// Edit task fields
    Edit {
        /// Task ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New priority
        #[arg(long)]
        priority: Option<Priority>,

        /// New start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// New due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,

        /// Move to this milestone
        #[arg(long)]
        milestone: Option<String>,

        /// Remove the start date
        #[arg(long)]
        clear_start: bool,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,

        /// Move the task out of its milestone
        #[arg(long)]
        clear_milestone: bool,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub async fn run(cmd: TaskCommands, output: &Output, service: &ProjectService) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            description,
            start,
            due,
            milestone,
            priority,
            assignee,
        } => {
            add_task(
                output,
                service,
                AddArgs {
                    title,
                    description,
                    start,
                    due,
                    milestone,
                    priority,
                    assignee,
                },
            )
            .await
        }
        TaskCommands::List {
            status,
            milestone,
            search,
        } => list_tasks(output, service, status, milestone, search.as_deref()),
        TaskCommands::Show { id } => show_task(output, service, &id),
        TaskCommands::Status { id, status } => set_status(output, service, &id, status).await,
        TaskCommands::Edit {
            id,
            title,
            description,
            priority,
            start,
            due,
            milestone,
            clear_start,
            clear_due,
            clear_milestone,
        } => {
            let patch = build_patch(
                service,
                EditArgs {
                    title,
                    description,
                    priority,
                    start,
                    due,
                    milestone,
                    clear_start,
                    clear_due,
                    clear_milestone,
                },
            )?;
            edit_task(output, service, &id, patch).await
        }
        TaskCommands::Delete { id } => delete_task(output, service, &id).await,
    }
}

struct AddArgs {
    title: String,
    description: Option<String>,
    start: Option<NaiveDate>,
    due: Option<NaiveDate>,
    milestone: Option<String>,
    priority: Option<Priority>,
    assignee: Option<String>,
}

struct EditArgs {
    title: Option<String>,
    description: Option<String>,
    priority: Option<Priority>,
    start: Option<NaiveDate>,
    due: Option<NaiveDate>,
    milestone: Option<String>,
    clear_start: bool,
    clear_due: bool,
    clear_milestone: bool,
}

async fn add_task(output: &Output, service: &ProjectService, args: AddArgs) -> Result<()> {
    let milestone_id = match args.milestone {
        Some(raw) => Some(resolve_milestone(service, &raw)?),
        None => None,
    };

    let draft = TaskDraft {
        title: args.title,
        description: args.description,
        status: TaskStatus::Todo,
        priority: args.priority.unwrap_or_default(),
        start_date: args.start,
        due_date: args.due,
        milestone_id,
        assignee_id: args.assignee,
    };

    let id = service.create_task(draft).await?;
    let task = service
        .with_store(|s| s.task(&id).cloned())
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id.to_string(),
            "title": task.title,
            "status": task.status,
            "due_date": task.due_date,
            "milestone_id": task.milestone_id.as_ref().map(|m| m.to_string()),
        }));
    } else {
        output.success(&format!("Created task: {} - {}", task.id, task.title));
    }

    Ok(())
}

fn list_tasks(
    output: &Output,
    service: &ProjectService,
    status: StatusFilter,
    milestone: MilestoneFilter,
    search: Option<&str>,
) -> Result<()> {
    let filter = TaskFilter::all()
        .with_status(status)
        .with_milestone(milestone)
        .with_search(search.unwrap_or(""));

    let today = Local::now().date_naive();
    let tasks: Vec<Task> = service.with_store(|s| {
        filter
            .apply(s.tasks())
            .into_iter()
            .cloned()
            .collect()
    });

    if output.is_json() {
        let items: Vec<_> = tasks
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.id.to_string(),
                    "title": t.title,
                    "status": t.status,
                    "priority": t.priority,
                    "due_date": t.due_date,
                    "milestone_id": t.milestone_id.as_ref().map(|m| m.to_string()),
                    "overdue": t.is_overdue(today),
                    "due_soon": t.is_due_soon(today, DUE_SOON_DAYS),
                })
            })
            .collect();
        output.data(&items);
    } else if tasks.is_empty() {
        println!("No matching tasks");
    } else {
        println!("{:<14} {:<12} {:<12} TITLE", "ID", "STATUS", "DUE");
        println!("{}", "-".repeat(70));

        for task in &tasks {
            let due = task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            let marker = if task.is_overdue(today) {
                " !"
            } else if task.is_due_soon(today, DUE_SOON_DAYS) {
                " *"
            } else {
                ""
            };
            println!(
                "{:<14} {:<12} {:<12} {}{}",
                task.id, task.status, due, task.title, marker
            );
        }

        println!();
        println!("{} task(s)", tasks.len());
    }

    Ok(())
}

fn show_task(output: &Output, service: &ProjectService, id_str: &str) -> Result<()> {
    let id = resolve_task(service, id_str)?;
    let task = service
        .with_store(|s| s.task(&id).cloned())
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;
    let milestone_title = task.milestone_id.as_ref().and_then(|mid| {
        service.with_store(|s| s.milestone(mid).map(|m| m.title.clone()))
    });
    let today = Local::now().date_naive();

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id.to_string(),
            "title": task.title,
            "status": task.status,
            "priority": task.priority,
            "description": task.description,
            "start_date": task.start_date,
            "due_date": task.due_date,
            "milestone_id": task.milestone_id.as_ref().map(|m| m.to_string()),
            "milestone_title": milestone_title,
            "assignee_id": task.assignee_id,
            "created_at": task.created_at,
            "updated_at": task.updated_at,
            "overdue": task.is_overdue(today),
            "due_soon": task.is_due_soon(today, DUE_SOON_DAYS),
        }));
    } else {
        println!("Task: {}", task.id);
        println!("Title: {}", task.title);
        println!("Status: {}", task.status.label());
        println!("Priority: {}", task.priority.label());
        match (&task.milestone_id, &milestone_title) {
            (Some(mid), Some(title)) => println!("Milestone: {} ({})", title, mid),
            (Some(mid), None) => println!("Milestone: {}", mid),
            _ => println!("Milestone: unassigned"),
        }
        if let Some(start) = task.start_date {
            println!("Start: {}", start.format("%Y-%m-%d"));
        }
        if let Some(due) = task.due_date {
            let marker = if task.is_overdue(today) {
                " (overdue)"
            } else if task.is_due_soon(today, DUE_SOON_DAYS) {
                " (due soon)"
            } else {
                ""
            };
            println!("Due: {}{}", due.format("%Y-%m-%d"), marker);
        }
        if let Some(assignee) = &task.assignee_id {
            println!("Assignee: {}", assignee);
        }
        println!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"));
        println!("Updated: {}", task.updated_at.format("%Y-%m-%d %H:%M"));

        if let Some(desc) = &task.description {
            println!();
            println!("{}", desc);
        }
    }

    Ok(())
}

async fn set_status(
    output: &Output,
    service: &ProjectService,
    id_str: &str,
    status: TaskStatus,
) -> Result<()> {
    let id = resolve_task(service, id_str)?;
    service.set_task_status(&id, status).await?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id.to_string(),
            "status": status,
        }));
    } else {
        output.success(&format!("Moved {} to {}", id, status.label()));
    }

    Ok(())
}

fn build_patch(service: &ProjectService, args: EditArgs) -> Result<TaskPatch> {
    let milestone_id = match (args.clear_milestone, args.milestone) {
        (true, _) => Some(None),
        (false, Some(raw)) => Some(Some(resolve_milestone(service, &raw)?)),
        (false, None) => None,
    };
    let start_date = match (args.clear_start, args.start) {
        (true, _) => Some(None),
        (false, Some(d)) => Some(Some(d)),
        (false, None) => None,
    };
    let due_date = match (args.clear_due, args.due) {
        (true, _) => Some(None),
        (false, Some(d)) => Some(Some(d)),
        (false, None) => None,
    };

    Ok(TaskPatch {
        title: args.title,
        status: None,
        priority: args.priority,
        description: args.description.map(Some),
        start_date,
        due_date,
        milestone_id,
        assignee_id: None,
    })
}

async fn edit_task(
    output: &Output,
    service: &ProjectService,
    id_str: &str,
    patch: TaskPatch,
) -> Result<()> {
    if patch.is_empty() {
        anyhow::bail!("Nothing to change; pass at least one field flag");
    }

    let id = resolve_task(service, id_str)?;
    service.update_task(&id, patch).await?;
    let task = service
        .with_store(|s| s.task(&id).cloned())
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id.to_string(),
            "title": task.title,
            "status": task.status,
            "priority": task.priority,
            "start_date": task.start_date,
            "due_date": task.due_date,
            "milestone_id": task.milestone_id.as_ref().map(|m| m.to_string()),
        }));
    } else {
        output.success(&format!("Updated task: {}", task.id));
    }

    Ok(())
}

async fn delete_task(output: &Output, service: &ProjectService, id_str: &str) -> Result<()> {
    let id = resolve_task(service, id_str)?;
    service.delete_task(&id).await?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id.to_string(),
            "deleted": true,
        }));
    } else {
        output.success(&format!("Deleted task: {}", id));
    }

    Ok(())
}

/// Parses a task id and checks it exists in the loaded project
pub(super) fn resolve_task(service: &ProjectService, raw: &str) -> Result<TaskId> {
    let id: TaskId = raw.parse()?;
    if !service.with_store(|s| s.contains_task(&id)) {
        anyhow::bail!("Task not found: {}", id);
    }
    Ok(id)
}

/// Parses a milestone id and checks it exists in the loaded project
pub(super) fn resolve_milestone(service: &ProjectService, raw: &str) -> Result<MilestoneId> {
    let id: MilestoneId = raw.parse()?;
    if service.with_store(|s| s.milestone(&id).is_none()) {
        anyhow::bail!("Milestone not found: {}", id);
    }
    Ok(id)
}
