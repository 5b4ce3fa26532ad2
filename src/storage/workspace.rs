//! Workspace management
//!
//! Handles workspace initialization and provides access to the snapshot
//! stores.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::domain::{Milestone, Task};

use super::{Config, SnapshotStore};

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not in a planboard workspace. Run 'planboard init' first.")]
    NotInWorkspace,
}

/// A planboard workspace: the directory holding `.planboard/`
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens an existing workspace at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(".planboard").is_dir() {
            return Err(WorkspaceError::NotInWorkspace.into());
        }

        let config = Config::for_workspace(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the workspace at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_workspace_root().ok_or(WorkspaceError::NotInWorkspace)?;

        Self::open(root)
    }

    /// Initializes a new workspace at the given path.
    ///
    /// Idempotent: an existing workspace is opened, with its config left
    /// alone.
    pub fn init(root: impl Into<PathBuf>, name: Option<&str>) -> Result<Self> {
        let root = root.into();
        let data_dir = root.join(".planboard");

        fs::create_dir_all(&data_dir).with_context(|| {
            format!(
                "Failed to create .planboard directory: {}",
                data_dir.display()
            )
        })?;

        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            let project_name = name
                .map(str::to_string)
                .or_else(|| {
                    root.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                })
                .unwrap_or_else(|| "project".to_string());

            let default_config = format!(
                r#"# Planboard configuration

# Project name shown in view headers
name = "{project_name}"

# Data backend: "local" (snapshot files under .planboard) or "remote"
# (the portal API; requires remote.api_url and project_id)
backend = "local"

[remote]
# Base URL of the portal API, e.g. https://portal.example.com/api
api_url = ""

[ui]
# Timeline window to open with: "week", "month" or "full"
default_window = "week"
"#
            );
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Self::open(root)
    }

    /// Returns the workspace root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the `.planboard` directory path
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(".planboard")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Returns the task snapshot store
    pub fn task_store(&self) -> SnapshotStore<Task> {
        SnapshotStore::new(self.data_dir().join("tasks.jsonl"))
    }

    /// Returns the milestone snapshot store
    pub fn milestone_store(&self) -> SnapshotStore<Milestone> {
        SnapshotStore::new(self.data_dir().join("milestones.jsonl"))
    }
}
