//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Workspace management | `init`, `status`, `pull` |
//! | Task | Work item management | `task add`, `task status`, `task edit` |
//! | Milestone | Milestone tracking | `milestone new`, `milestone note` |
//! | Board | Status columns and moves | `board`, `board move` |
//! | Schedule | Date-based views | `timeline`, `calendar` |
//! | Search | Task title lookup | `search` |
//! | Tui | Interactive full-screen mode | `tui` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! planboard --verbose board
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod client;
mod task;
mod milestone;
mod board;
mod timeline;
mod calendar;
mod tui;

pub use app::{Cli, Commands, run};
pub use output::Output;
