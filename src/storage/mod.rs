//! # Storage Layer
//!
//! Local persistence with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line) | `.planboard/tasks.jsonl` |
//! | Milestones | JSONL (one JSON per line) | `.planboard/milestones.jsonl` |
//! | Config | TOML | `.planboard/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`SnapshotStore`] uses file locking (`fs2`) for concurrent access
//! - All writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point for a planboard workspace
//! - [`SnapshotStore`] - Read/write one record collection as JSONL
//! - [`Config`] - Workspace and global configuration

mod config;
mod snapshot;
mod workspace;

pub use config::{
    BackendKind, Config, ConfigError, DefaultWindow, GlobalConfig, OutputFormat, ProjectConfig,
    RemoteConfig, UiConfig,
};
pub use snapshot::{SnapshotRecord, SnapshotStore};
pub use workspace::{Workspace, WorkspaceError};
