//! Local portal backend
//!
//! Implements the portal contract against the workspace's snapshot files.
//! A local workspace holds exactly one project, so the project id in each
//! call is accepted and ignored.

use chrono::Utc;

use crate::domain::{
    Milestone, MilestoneDraft, MilestoneId, MilestonePatch, ProjectId, Task, TaskDraft, TaskId,
    TaskPatch,
};
use crate::storage::{SnapshotStore, Workspace};

use super::PortalError;

/// Portal backend over `.planboard/` snapshot files
pub struct LocalPortal {
    tasks: SnapshotStore<Task>,
    milestones: SnapshotStore<Milestone>,
}

impl LocalPortal {
    pub fn new(workspace: &Workspace) -> Self {
        Self {
            tasks: workspace.task_store(),
            milestones: workspace.milestone_store(),
        }
    }

    pub fn fetch_tasks(&self, _project: &ProjectId) -> Result<Vec<Task>, PortalError> {
        Ok(self.tasks.read_all()?)
    }

    pub fn fetch_milestones(&self, _project: &ProjectId) -> Result<Vec<Milestone>, PortalError> {
        Ok(self.milestones.read_all()?)
    }

    pub fn create_task(
        &self,
        _project: &ProjectId,
        draft: &TaskDraft,
    ) -> Result<Task, PortalError> {
        let task = draft.clone().into_task(Utc::now());
        self.tasks.append(&task)?;
        Ok(task)
    }

    pub fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), PortalError> {
        let mut task = self
            .tasks
            .find(id.as_str())?
            .ok_or_else(|| PortalError::TaskNotFound(id.clone()))?;
        patch.apply_to(&mut task);
        Ok(self.tasks.upsert(&task)?)
    }

    pub fn delete_task(&self, id: &TaskId) -> Result<(), PortalError> {
        self.tasks.remove(id.as_str())?;
        Ok(())
    }

    pub fn create_milestone(
        &self,
        _project: &ProjectId,
        draft: &MilestoneDraft,
    ) -> Result<Milestone, PortalError> {
        let milestone = draft.clone().into_milestone(Utc::now());
        self.milestones.append(&milestone)?;
        Ok(milestone)
    }

    pub fn update_milestone(
        &self,
        id: &MilestoneId,
        patch: &MilestonePatch,
    ) -> Result<(), PortalError> {
        let mut milestone = self
            .milestones
            .find(id.as_str())?
            .ok_or_else(|| PortalError::MilestoneNotFound(id.clone()))?;
        patch.apply_to(&mut milestone);
        Ok(self.milestones.upsert(&milestone)?)
    }

    /// Deletes a milestone and every task assigned to it
    pub fn delete_milestone(&self, id: &MilestoneId) -> Result<(), PortalError> {
        let removed = self.milestones.remove(id.as_str())?;
        if removed {
            self.tasks
                .retain(|t| t.milestone_id.as_ref() != Some(id))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::domain::TaskStatus;

    fn portal() -> (TempDir, LocalPortal) {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::init(dir.path(), Some("test")).unwrap();
        let portal = LocalPortal::new(&workspace);
        (dir, portal)
    }

    fn project() -> ProjectId {
        "local".parse().unwrap()
    }

    #[test]
    fn create_then_fetch() {
        let (_dir, portal) = portal();

        let created = portal
            .create_task(&project(), &TaskDraft::new("Persisted"))
            .unwrap();

        let tasks = portal.fetch_tasks(&project()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, created.id);
    }

    #[test]
    fn update_persists_patch() {
        let (_dir, portal) = portal();
        let created = portal
            .create_task(&project(), &TaskDraft::new("Move me"))
            .unwrap();

        portal
            .update_task(&created.id, &TaskPatch::status(TaskStatus::Review))
            .unwrap();

        let tasks = portal.fetch_tasks(&project()).unwrap();
        assert_eq!(tasks[0].status, TaskStatus::Review);
    }

    #[test]
    fn update_missing_errors() {
        let (_dir, portal) = portal();
        let ghost = TaskDraft::new("Ghost").into_task(Utc::now());

        let err = portal
            .update_task(&ghost.id, &TaskPatch::status(TaskStatus::Done))
            .unwrap_err();

        assert!(matches!(err, PortalError::TaskNotFound(_)));
    }

    #[test]
    fn delete_milestone_cascades_to_snapshot() {
        let (_dir, portal) = portal();
        let milestone = portal
            .create_milestone(&project(), &MilestoneDraft::new("Phase"))
            .unwrap();

        let mut draft = TaskDraft::new("Owned");
        draft.milestone_id = Some(milestone.id.clone());
        portal.create_task(&project(), &draft).unwrap();
        portal
            .create_task(&project(), &TaskDraft::new("Free"))
            .unwrap();

        portal.delete_milestone(&milestone.id).unwrap();

        assert!(portal.fetch_milestones(&project()).unwrap().is_empty());
        let tasks = portal.fetch_tasks(&project()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Free");
    }
}
