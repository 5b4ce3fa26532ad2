//! Backend selection for CLI commands
//!
//! Builds the [`ProjectService`] a command runs against, from the
//! workspace configuration and global flags.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;

use super::output::Output;
use crate::portal::{HttpPortal, LocalPortal, MemoryPortal, PortalClient};
use crate::service::ProjectService;
use crate::storage::{BackendKind, Config, Workspace};

/// Builds a service for the configured backend and loads its records
pub async fn connect(output: &Output, config: &Config, demo: bool) -> Result<ProjectService> {
    let service = build_service(output, config, demo)?;
    service
        .refresh()
        .await
        .context("Failed to load project data")?;
    Ok(service)
}

fn build_service(output: &Output, config: &Config, demo: bool) -> Result<ProjectService> {
    if demo {
        output.verbose_ctx("client", "Using seeded in-memory backend");
        let today = Local::now().date_naive();
        let client = PortalClient::memory(MemoryPortal::seeded(today));
        return Ok(ProjectService::new("demo".parse()?, client));
    }

    match config.project.backend {
        BackendKind::Local => {
            let root = config.require_workspace_root()?;
            let workspace = Workspace::open(root)?;
            output.verbose_ctx(
                "client",
                &format!("Using local backend at {}", workspace.data_dir().display()),
            );
            // Unlinked workspaces have no portal project; any id works for
            // the local transport, which ignores it
            let project = match &config.project.project_id {
                Some(id) => id.clone(),
                None => "local".parse()?,
            };
            let client = PortalClient::local(LocalPortal::new(&workspace));
            Ok(ProjectService::new(project, client))
        }
        BackendKind::Remote => {
            let url = config.project.remote.api_url.trim();
            if url.is_empty() {
                bail!(
                    "Remote backend configured without an api_url. \
                     Set api_url under [remote] in .planboard/config.toml"
                );
            }
            let project = config.project.project_id.clone().ok_or_else(|| {
                anyhow::anyhow!(
                    "Remote backend configured without a project_id. \
                     Set project_id in .planboard/config.toml"
                )
            })?;
            output.verbose_ctx("client", &format!("Using remote backend at {}", url));
            let timeout = Duration::from_secs(config.project.remote.timeout_seconds);
            let portal = HttpPortal::new(url, timeout)?;
            Ok(ProjectService::new(project, PortalClient::http(portal)))
        }
    }
}
