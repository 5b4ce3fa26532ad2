//! Main CLI application structure

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::output::Output;
use super::{board, calendar, client, milestone, task, timeline, tui};
use crate::domain::{Milestone, Task};
use crate::sched::{milestone_progress, BoardStats, TaskFilter};
use crate::service::ProjectService;
use crate::storage::{Config, DefaultWindow, OutputFormat, Workspace};

#[derive(Parser)]
#[command(name = "planboard")]
#[command(author, version, about = "Project scheduling and milestone tracking from the terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured one)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Use an in-memory demo project instead of a workspace
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new planboard workspace
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Project name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Show project status overview
    Status,

    /// Fetch the latest tasks and milestones from the backend
    Pull,

    /// Manage tasks
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Manage milestones
    #[command(subcommand)]
    Milestone(milestone::MilestoneCommands),

    /// Show the kanban board
    Board {
        #[command(subcommand)]
        command: Option<board::BoardCommands>,
    },

    /// Show tasks as bars over a date window
    Timeline {
        /// Date window (defaults to the configured one)
        #[arg(long)]
        window: Option<DefaultWindow>,

        /// Reference date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show a month calendar with due dates
    Calendar {
        /// Month to show as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Search tasks by title
    Search {
        /// Search query
        query: String,
    },

    /// Open the interactive terminal UI
    Tui,
}

/// Main entry point for the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = Config::load()?;
    let format = cli.format.unwrap_or(config.global.default_format);
    let output = Output::new(format, cli.verbose);

    output.verbose("planboard starting");

    // Init is the one command that must work outside a workspace, so it
    // runs before the backend connect.
    if let Commands::Init { path, name } = &cli.command {
        return init_workspace(&output, path, name.as_deref());
    }

    let service = client::connect(&output, &config, cli.demo).await?;

    match cli.command {
        Commands::Init { .. } => {}

        Commands::Status => status(&output, &service)?,
        Commands::Pull => pull(&output, &service).await?,

        Commands::Task(cmd) => task::run(cmd, &output, &service).await?,
        Commands::Milestone(cmd) => milestone::run(cmd, &output, &service).await?,
        Commands::Board { command } => board::run(command, &output, &service).await?,

        Commands::Timeline { window, date } => {
            let window = window.unwrap_or(config.project.ui.default_window);
            timeline::run(&output, &service, window, date.as_deref())?
        }
        Commands::Calendar { month } => calendar::run(&output, &service, month)?,

        Commands::Search { query } => search(&output, &service, &query)?,

        Commands::Tui => tui::run(service, &config.project.ui).await?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

fn init_tracing(verbose: bool) {
    // Diagnostics go to stderr so JSON output stays parseable
    let filter = if verbose {
        EnvFilter::new("planboard=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn init_workspace(output: &Output, path: &str, name: Option<&str>) -> Result<()> {
    output.verbose_ctx("init", &format!("Initializing workspace at: {}", path));
    let workspace = Workspace::init(path, name)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "root": workspace.root().display().to_string(),
            "name": workspace.config().project.name,
        }));
    } else {
        output.success(&format!(
            "Initialized planboard workspace at {}",
            workspace.root().display()
        ));
    }

    Ok(())
}

fn status(output: &Output, service: &ProjectService) -> Result<()> {
    let (tasks, milestones): (Vec<Task>, Vec<Milestone>) =
        service.with_store(|s| (s.tasks().to_vec(), s.milestones().to_vec()));
    let today = Local::now().date_naive();
    let stats = BoardStats::collect(&tasks, today);
    let open_milestones = milestones.iter().filter(|m| !m.status.is_closed()).count();

    if output.is_json() {
        output.data(&serde_json::json!({
            "tasks": stats,
            "milestones": {
                "total": milestones.len(),
                "open": open_milestones,
            },
        }));
        return Ok(());
    }

    println!("Tasks: {}", stats.total);
    println!("  todo         {}", stats.todo);
    println!("  in progress  {}", stats.in_progress);
    println!("  review       {}", stats.review);
    println!("  done         {}", stats.done);
    if stats.overdue > 0 {
        println!("  overdue      {}", stats.overdue);
    }
    if stats.due_soon > 0 {
        println!("  due soon     {}", stats.due_soon);
    }

    println!();
    println!(
        "Milestones: {} total, {} open",
        milestones.len(),
        open_milestones
    );
    for milestone in &milestones {
        let progress = milestone_progress(&milestone.id, &tasks);
        println!(
            "  {:<12} {:>3}%  {}",
            milestone.status, progress, milestone.title
        );
    }

    Ok(())
}

async fn pull(output: &Output, service: &ProjectService) -> Result<()> {
    service.refresh().await?;
    let (task_count, milestone_count) =
        service.with_store(|s| (s.tasks().len(), s.milestones().len()));

    if output.is_json() {
        output.data(&serde_json::json!({
            "tasks": task_count,
            "milestones": milestone_count,
        }));
    } else {
        output.success(&format!(
            "Pulled {} task(s) and {} milestone(s)",
            task_count, milestone_count
        ));
    }

    Ok(())
}

fn search(output: &Output, service: &ProjectService, query: &str) -> Result<()> {
    let filter = TaskFilter::all().with_search(query);
    let matches: Vec<Task> =
        service.with_store(|s| filter.apply(s.tasks()).into_iter().cloned().collect());

    if output.is_json() {
        let items: Vec<_> = matches
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.id.to_string(),
                    "title": t.title,
                    "status": t.status,
                    "due_date": t.due_date,
                })
            })
            .collect();
        output.data(&items);
    } else if matches.is_empty() {
        println!("No results found for '{}'", query);
    } else {
        println!("Search results for '{}':", query);
        println!("{:<14} {:<12} TITLE", "ID", "STATUS");
        println!("{}", "-".repeat(70));
        for task in &matches {
            println!("{:<14} {:<12} {}", task.id, task.status, task.title);
        }
        println!();
        println!("Found {} result(s)", matches.len());
    }

    Ok(())
}
