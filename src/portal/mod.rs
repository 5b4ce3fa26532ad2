//! # Portal Layer
//!
//! The persistence contract every view mutates through, and its three
//! interchangeable backends:
//!
//! | Backend | Serves | Notes |
//! |---------|--------|-------|
//! | [`MemoryPortal`] | demo mode, tests | latency and failure injection |
//! | [`LocalPortal`] | offline workspaces | snapshot files under `.planboard/` |
//! | [`HttpPortal`] | linked projects | portal REST API |
//!
//! The contract is eight operations: fetch/create for tasks and
//! milestones scoped to a project, update/delete addressed by record id.
//! Fetches return records in creation order. Creates return the committed
//! record with its backend-assigned id. Updates on a missing record fail
//! with a not-found error; deletes are idempotent and succeed on records
//! that are already gone. Deleting a milestone deletes its tasks with it
//! on every backend.

mod http;
mod local;
mod memory;

use thiserror::Error;

use crate::domain::{
    Milestone, MilestoneDraft, MilestoneId, MilestonePatch, ProjectId, Task, TaskDraft, TaskId,
    TaskPatch,
};

pub use http::HttpPortal;
pub use local::LocalPortal;
pub use memory::MemoryPortal;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Milestone not found: {0}")]
    MilestoneNotFound(MilestoneId),

    #[error("Portal returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

enum Transport {
    Memory(MemoryPortal),
    Local(LocalPortal),
    Http(HttpPortal),
}

/// Handle to one portal backend; each operation fans out to the active
/// transport
pub struct PortalClient {
    transport: Transport,
}

impl PortalClient {
    pub fn memory(portal: MemoryPortal) -> Self {
        Self {
            transport: Transport::Memory(portal),
        }
    }

    pub fn local(portal: LocalPortal) -> Self {
        Self {
            transport: Transport::Local(portal),
        }
    }

    pub fn http(portal: HttpPortal) -> Self {
        Self {
            transport: Transport::Http(portal),
        }
    }

    pub async fn fetch_tasks(&self, project: &ProjectId) -> Result<Vec<Task>, PortalError> {
        match &self.transport {
            Transport::Memory(portal) => portal.fetch_tasks(project).await,
            Transport::Local(portal) => portal.fetch_tasks(project),
            Transport::Http(portal) => portal.fetch_tasks(project).await,
        }
    }

    pub async fn fetch_milestones(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<Milestone>, PortalError> {
        match &self.transport {
            Transport::Memory(portal) => portal.fetch_milestones(project).await,
            Transport::Local(portal) => portal.fetch_milestones(project),
            Transport::Http(portal) => portal.fetch_milestones(project).await,
        }
    }

    pub async fn create_task(
        &self,
        project: &ProjectId,
        draft: &TaskDraft,
    ) -> Result<Task, PortalError> {
        match &self.transport {
            Transport::Memory(portal) => portal.create_task(project, draft).await,
            Transport::Local(portal) => portal.create_task(project, draft),
            Transport::Http(portal) => portal.create_task(project, draft).await,
        }
    }

    pub async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), PortalError> {
        match &self.transport {
            Transport::Memory(portal) => portal.update_task(id, patch).await,
            Transport::Local(portal) => portal.update_task(id, patch),
            Transport::Http(portal) => portal.update_task(id, patch).await,
        }
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<(), PortalError> {
        match &self.transport {
            Transport::Memory(portal) => portal.delete_task(id).await,
            Transport::Local(portal) => portal.delete_task(id),
            Transport::Http(portal) => portal.delete_task(id).await,
        }
    }

    pub async fn create_milestone(
        &self,
        project: &ProjectId,
        draft: &MilestoneDraft,
    ) -> Result<Milestone, PortalError> {
        match &self.transport {
            Transport::Memory(portal) => portal.create_milestone(project, draft).await,
            Transport::Local(portal) => portal.create_milestone(project, draft),
            Transport::Http(portal) => portal.create_milestone(project, draft).await,
        }
    }

    pub async fn update_milestone(
        &self,
        id: &MilestoneId,
        patch: &MilestonePatch,
    ) -> Result<(), PortalError> {
        match &self.transport {
            Transport::Memory(portal) => portal.update_milestone(id, patch).await,
            Transport::Local(portal) => portal.update_milestone(id, patch),
            Transport::Http(portal) => portal.update_milestone(id, patch).await,
        }
    }

    pub async fn delete_milestone(&self, id: &MilestoneId) -> Result<(), PortalError> {
        match &self.transport {
            Transport::Memory(portal) => portal.delete_milestone(id).await,
            Transport::Local(portal) => portal.delete_milestone(id),
            Transport::Http(portal) => portal.delete_milestone(id).await,
        }
    }
}
