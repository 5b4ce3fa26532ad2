//! Milestone CLI commands

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::Output;
use super::task::resolve_milestone;
use crate::domain::{Milestone, MilestoneDraft, MilestonePatch, MilestoneStatus, Task, TaskStatus};
use crate::sched::milestone_progress;
use crate::service::ProjectService;

#[derive(Subcommand)]
pub enum MilestoneCommands {
    /// Create a new milestone
    New {
        /// Milestone title
        title: String,

        /// Longer description
        #[arg(long)]
        description: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// List milestones with their progress
    List,

    /// Show milestone details and its tasks
    Show {
        /// Milestone ID
        id: String,
    },

    /// Update milestone status
    Status {
        /// Milestone ID
        id: String,

        /// New status (pending, in-progress, completed, cancelled)
        status: MilestoneStatus,
    },

    /// Set a note on the milestone
    Note {
        /// Milestone ID
        id: String,

        /// Note text
        text: String,

        /// Set the team-only note instead of the client-visible one
        #[arg(long)]
        internal: bool,
    },

    /// Delete a milestone and every task assigned to it
    Delete {
        /// Milestone ID
        id: String,

        /// Delete even when tasks are still assigned
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(cmd: MilestoneCommands, output: &Output, service: &ProjectService) -> Result<()> {
    match cmd {
        MilestoneCommands::New {
            title,
            description,
            due,
        } => new_milestone(output, service, title, description, due).await,
        MilestoneCommands::List => list_milestones(output, service),
        MilestoneCommands::Show { id } => show_milestone(output, service, &id),
        MilestoneCommands::Status { id, status } => set_status(output, service, &id, status).await,
        MilestoneCommands::Note { id, text, internal } => {
            set_note(output, service, &id, text, internal).await
        }
        MilestoneCommands::Delete { id, yes } => delete_milestone(output, service, &id, yes).await,
    }
}

async fn new_milestone(
    output: &Output,
    service: &ProjectService,
    title: String,
    description: Option<String>,
    due: Option<NaiveDate>,
) -> Result<()> {
    let draft = MilestoneDraft {
        title,
        description,
        status: MilestoneStatus::Pending,
        due_date: due,
        client_note: None,
        internal_note: None,
    };

    let id = service.create_milestone(draft).await?;
    let milestone = service
        .with_store(|s| s.milestone(&id).cloned())
        .ok_or_else(|| anyhow::anyhow!("Milestone not found: {}", id))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": milestone.id.to_string(),
            "title": milestone.title,
            "status": milestone.status,
            "due_date": milestone.due_date,
        }));
    } else {
        output.success(&format!(
            "Created milestone: {} ({})",
            milestone.id, milestone.title
        ));
    }

    Ok(())
}

fn list_milestones(output: &Output, service: &ProjectService) -> Result<()> {
    let (milestones, tasks): (Vec<Milestone>, Vec<Task>) =
        service.with_store(|s| (s.milestones().to_vec(), s.tasks().to_vec()));

    if output.is_json() {
        let items: Vec<_> = milestones
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.id.to_string(),
                    "title": m.title,
                    "status": m.status,
                    "due_date": m.due_date,
                    "progress": milestone_progress(&m.id, &tasks),
                    "task_count": tasks.iter()
                        .filter(|t| t.milestone_id.as_ref() == Some(&m.id))
                        .count(),
                })
            })
            .collect();
        output.data(&items);
    } else if milestones.is_empty() {
        println!("No milestones");
    } else {
        println!("{:<14} {:<12} {:>9} TITLE", "ID", "STATUS", "PROGRESS");
        println!("{}", "-".repeat(60));
        for milestone in &milestones {
            let progress = milestone_progress(&milestone.id, &tasks);
            println!(
                "{:<14} {:<12} {:>8}% {}",
                milestone.id, milestone.status, progress, milestone.title
            );
        }
    }

    Ok(())
}

fn show_milestone(output: &Output, service: &ProjectService, id_str: &str) -> Result<()> {
    let id = resolve_milestone(service, id_str)?;
    let milestone = service
        .with_store(|s| s.milestone(&id).cloned())
        .ok_or_else(|| anyhow::anyhow!("Milestone not found: {}", id))?;
    let tasks: Vec<Task> = service.with_store(|s| {
        s.tasks_for_milestone(&id)
            .into_iter()
            .cloned()
            .collect()
    });
    let all_tasks: Vec<Task> = service.with_store(|s| s.tasks().to_vec());
    let progress = milestone_progress(&id, &all_tasks);

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": milestone.id.to_string(),
            "title": milestone.title,
            "status": milestone.status,
            "description": milestone.description,
            "due_date": milestone.due_date,
            "client_note": milestone.client_note,
            "internal_note": milestone.internal_note,
            "progress": progress,
            "created_at": milestone.created_at,
            "updated_at": milestone.updated_at,
            "tasks": tasks.iter().map(|t| serde_json::json!({
                "id": t.id.to_string(),
                "title": t.title,
                "status": t.status,
                "due_date": t.due_date,
            })).collect::<Vec<_>>(),
        }));
    } else {
        println!("Milestone: {}", milestone.id);
        println!("Title: {}", milestone.title);
        println!("Status: {}", milestone.status.label());
        if let Some(due) = milestone.due_date {
            println!("Due: {}", due.format("%Y-%m-%d"));
        }
        println!("Progress: {}% done", progress);
        println!("Created: {}", milestone.created_at.format("%Y-%m-%d %H:%M"));

        if let Some(desc) = &milestone.description {
            println!();
            println!("{}", desc);
        }
        if let Some(note) = &milestone.client_note {
            println!();
            println!("Client note: {}", note);
        }
        if let Some(note) = &milestone.internal_note {
            println!("Internal note: {}", note);
        }

        if !tasks.is_empty() {
            println!();
            println!("Tasks ({}):", tasks.len());
            for task in &tasks {
                println!("  {} {} {}", status_icon(task.status), task.id, task.title);
            }
        }
    }

    Ok(())
}

async fn set_status(
    output: &Output,
    service: &ProjectService,
    id_str: &str,
    status: MilestoneStatus,
) -> Result<()> {
    let id = resolve_milestone(service, id_str)?;
    service
        .update_milestone(&id, MilestonePatch::status(status))
        .await?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id.to_string(),
            "status": status,
        }));
    } else {
        output.success(&format!("Updated {} status to {}", id, status));
    }

    Ok(())
}

async fn set_note(
    output: &Output,
    service: &ProjectService,
    id_str: &str,
    text: String,
    internal: bool,
) -> Result<()> {
    let id = resolve_milestone(service, id_str)?;
    let patch = if internal {
        MilestonePatch {
            internal_note: Some(Some(text)),
            ..MilestonePatch::default()
        }
    } else {
        MilestonePatch::client_note(text)
    };
    service.update_milestone(&id, patch).await?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id.to_string(),
            "note": if internal { "internal" } else { "client" },
        }));
    } else {
        let kind = if internal { "internal" } else { "client" };
        output.success(&format!("Set {} note on {}", kind, id));
    }

    Ok(())
}

async fn delete_milestone(
    output: &Output,
    service: &ProjectService,
    id_str: &str,
    yes: bool,
) -> Result<()> {
    let id = resolve_milestone(service, id_str)?;
    let cascaded = service.with_store(|s| s.tasks_for_milestone(&id).len());
    if cascaded > 0 && !yes {
        anyhow::bail!(
            "Milestone {} still has {} assigned task(s); pass --yes to delete them too",
            id,
            cascaded
        );
    }
    service.delete_milestone(&id).await?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id.to_string(),
            "deleted": true,
            "tasks_deleted": cascaded,
        }));
    } else if cascaded > 0 {
        output.success(&format!(
            "Deleted milestone {} and {} task(s)",
            id, cascaded
        ));
    } else {
        output.success(&format!("Deleted milestone: {}", id));
    }

    Ok(())
}

fn status_icon(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Review => "[r]",
        TaskStatus::Done => "[x]",
    }
}
