//! # Project Service
//!
//! Couples the in-memory [`ProjectStore`] to a [`PortalClient`] with
//! optimistic writes: every mutation lands in the store first, then goes
//! to the backend, and is rolled back if the backend rejects it.
//!
//! The rollback rule is last-write-wins with a staleness check: a failed
//! write only reverts while no newer local edit has touched the same
//! record (see [`ProjectStore::revert_task`]). Creates insert a locally
//! minted placeholder that is swapped for the backend's committed record,
//! or discarded when the create fails.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{
    MilestoneDraft, MilestoneId, MilestonePatch, ProjectId, TaskDraft, TaskId, TaskPatch,
    TaskStatus,
};
use crate::portal::{PortalClient, PortalError};
use crate::sched::DropCommand;
use crate::store::{ProjectStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Portal(#[from] PortalError),
}

/// One project's store plus the backend it syncs against
pub struct ProjectService {
    project: ProjectId,
    client: PortalClient,
    store: Arc<Mutex<ProjectStore>>,
}

impl ProjectService {
    pub fn new(project: ProjectId, client: PortalClient) -> Self {
        Self {
            project,
            client,
            store: Arc::new(Mutex::new(ProjectStore::new())),
        }
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Shared handle to the store, for long-lived views
    pub fn store(&self) -> Arc<Mutex<ProjectStore>> {
        Arc::clone(&self.store)
    }

    /// Runs `f` against the current store contents
    pub fn with_store<R>(&self, f: impl FnOnce(&ProjectStore) -> R) -> R {
        f(&self.lock())
    }

    /// Replaces local state with fresh backend records.
    ///
    /// Outstanding rollbacks from before the refresh become stale and will
    /// not apply.
    pub async fn refresh(&self) -> Result<(), ServiceError> {
        let tasks = self.client.fetch_tasks(&self.project).await?;
        let milestones = self.client.fetch_milestones(&self.project).await?;
        debug!(
            tasks = tasks.len(),
            milestones = milestones.len(),
            "refreshed from portal"
        );
        self.lock().replace_all(tasks, milestones);
        Ok(())
    }

    /// Creates a task: placeholder now, committed record when the backend
    /// answers.
    ///
    /// Returns the committed task's id, which normally differs from the
    /// placeholder's.
    pub async fn create_task(&self, draft: TaskDraft) -> Result<TaskId, ServiceError> {
        let placeholder = draft.clone().into_task(Utc::now());
        let placeholder_id = placeholder.id.clone();
        self.lock().insert_task(placeholder)?;
        debug!(task = %placeholder_id, "inserted task placeholder");

        match self.client.create_task(&self.project, &draft).await {
            Ok(committed) => {
                let committed_id = committed.id.clone();
                let mut store = self.lock();
                if store
                    .replace_task(&placeholder_id, committed.clone())
                    .is_err()
                {
                    // Placeholder vanished mid-flight; the backend has the
                    // record, so surface it anyway
                    warn!(task = %placeholder_id, "task placeholder missing at reconcile");
                    let _ = store.insert_task(committed);
                }
                Ok(committed_id)
            }
            Err(err) => {
                warn!(error = %err, "task create rejected; discarding placeholder");
                self.lock().discard_task(&placeholder_id);
                Err(err.into())
            }
        }
    }

    /// Applies `patch` locally, persists it, rolls back on rejection
    pub async fn update_task(&self, id: &TaskId, patch: TaskPatch) -> Result<(), ServiceError> {
        let undo = self.lock().update_task(id, &patch)?;

        match self.client.update_task(id, &patch).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(task = %id, error = %err, "task update rejected; rolling back");
                if !self.lock().revert_task(undo) {
                    debug!(task = %id, "rollback skipped; a newer edit won");
                }
                Err(err.into())
            }
        }
    }

    /// Moves a task to `status`
    pub async fn set_task_status(
        &self,
        id: &TaskId,
        status: TaskStatus,
    ) -> Result<(), ServiceError> {
        self.update_task(id, TaskPatch::status(status)).await
    }

    /// Handles a board drop: at most one status transition per drop, none
    /// when the card already sits in the target column
    pub async fn apply_drop(&self, drop: DropCommand) -> Result<(), ServiceError> {
        let current = self
            .with_store(|s| s.task(&drop.task_id).map(|t| t.status))
            .ok_or_else(|| StoreError::TaskNotFound(drop.task_id.clone()))?;

        if drop.is_noop(current) {
            debug!(task = %drop.task_id, "drop on current column; nothing to do");
            return Ok(());
        }
        self.set_task_status(&drop.task_id, drop.target).await
    }

    /// Removes a task locally, restores it if the backend objects
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), ServiceError> {
        let undo = self.lock().remove_task(id)?;

        match self.client.delete_task(id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(task = %id, error = %err, "task delete rejected; restoring");
                self.lock().revert_task(undo);
                Err(err.into())
            }
        }
    }

    /// Creates a milestone with the same placeholder protocol as
    /// [`ProjectService::create_task`]
    pub async fn create_milestone(
        &self,
        draft: MilestoneDraft,
    ) -> Result<MilestoneId, ServiceError> {
        let placeholder = draft.clone().into_milestone(Utc::now());
        let placeholder_id = placeholder.id.clone();
        self.lock().insert_milestone(placeholder)?;
        debug!(milestone = %placeholder_id, "inserted milestone placeholder");

        match self.client.create_milestone(&self.project, &draft).await {
            Ok(committed) => {
                let committed_id = committed.id.clone();
                let mut store = self.lock();
                if store
                    .replace_milestone(&placeholder_id, committed.clone())
                    .is_err()
                {
                    warn!(milestone = %placeholder_id, "milestone placeholder missing at reconcile");
                    let _ = store.insert_milestone(committed);
                }
                Ok(committed_id)
            }
            Err(err) => {
                warn!(error = %err, "milestone create rejected; discarding placeholder");
                self.lock().discard_milestone(&placeholder_id);
                Err(err.into())
            }
        }
    }

    /// Applies `patch` locally, persists it, rolls back on rejection
    pub async fn update_milestone(
        &self,
        id: &MilestoneId,
        patch: MilestonePatch,
    ) -> Result<(), ServiceError> {
        let undo = self.lock().update_milestone(id, &patch)?;

        match self.client.update_milestone(id, &patch).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(milestone = %id, error = %err, "milestone update rejected; rolling back");
                if !self.lock().revert_milestone(undo) {
                    debug!(milestone = %id, "rollback skipped; a newer edit won");
                }
                Err(err.into())
            }
        }
    }

    /// Removes a milestone and its tasks locally; a rejected delete
    /// restores the milestone and every cascaded task at its old position
    pub async fn delete_milestone(&self, id: &MilestoneId) -> Result<(), ServiceError> {
        let undo = self.lock().remove_milestone(id)?;

        match self.client.delete_milestone(id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(milestone = %id, error = %err, "milestone delete rejected; restoring cascade");
                self.lock().revert_milestone(undo);
                Err(err.into())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProjectStore> {
        self.store.lock().expect("project store lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::{Milestone, Task};
    use crate::portal::MemoryPortal;

    fn project() -> ProjectId {
        "demo".parse().unwrap()
    }

    fn make_task(title: &str) -> Task {
        TaskDraft::new(title).into_task(Utc::now())
    }

    fn make_milestone(title: &str) -> Milestone {
        MilestoneDraft::new(title).into_milestone(Utc::now())
    }

    async fn service_with(
        tasks: Vec<Task>,
        milestones: Vec<Milestone>,
    ) -> (MemoryPortal, Arc<ProjectService>) {
        let portal = MemoryPortal::with_records(tasks, milestones);
        let service = Arc::new(ProjectService::new(
            project(),
            PortalClient::memory(portal.clone()),
        ));
        service.refresh().await.unwrap();
        (portal, service)
    }

    #[tokio::test]
    async fn refresh_loads_backend_records() {
        let (_portal, service) = service_with(vec![make_task("Seeded")], vec![]).await;

        assert_eq!(service.with_store(|s| s.tasks().len()), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn status_change_is_visible_before_backend_resolves() {
        let task = make_task("Slow lane");
        let id = task.id.clone();
        let (portal, service) = service_with(vec![task], vec![]).await;
        portal.set_latency(Duration::from_millis(200));

        let handle = tokio::spawn({
            let service = Arc::clone(&service);
            let id = id.clone();
            async move { service.set_task_status(&id, TaskStatus::Done).await }
        });
        tokio::task::yield_now().await;

        // The store already shows the move while the write is in flight
        assert_eq!(
            service.with_store(|s| s.task(&id).unwrap().status),
            TaskStatus::Done
        );

        handle.await.unwrap().unwrap();
        let (tasks, _) = portal.records();
        assert_eq!(tasks[0].status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn rejected_update_rolls_back() {
        let task = make_task("Fragile");
        let id = task.id.clone();
        let (portal, service) = service_with(vec![task], vec![]).await;
        portal.fail_next("maintenance window");

        let err = service.set_task_status(&id, TaskStatus::Done).await;

        assert!(err.is_err());
        assert_eq!(
            service.with_store(|s| s.task(&id).unwrap().status),
            TaskStatus::Todo
        );
        let (tasks, _) = portal.records();
        assert_eq!(tasks[0].status, TaskStatus::Todo);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_rollback_does_not_clobber_newer_edit() {
        let task = make_task("Contended");
        let id = task.id.clone();
        let (portal, service) = service_with(vec![task], vec![]).await;

        // First write: wakes early and fails. Second write: wakes later
        // and succeeds. The first write's rollback must leave the second
        // write's state alone.
        portal.set_latency(Duration::from_millis(100));
        portal.fail_next("flaky backend");
        let first = tokio::spawn({
            let service = Arc::clone(&service);
            let id = id.clone();
            async move { service.set_task_status(&id, TaskStatus::Done).await }
        });
        tokio::task::yield_now().await;

        portal.set_latency(Duration::from_millis(300));
        let second = tokio::spawn({
            let service = Arc::clone(&service);
            let id = id.clone();
            async move { service.set_task_status(&id, TaskStatus::Review).await }
        });
        tokio::task::yield_now().await;

        assert!(first.await.unwrap().is_err());
        assert!(second.await.unwrap().is_ok());
        assert_eq!(
            service.with_store(|s| s.task(&id).unwrap().status),
            TaskStatus::Review
        );
    }

    #[tokio::test(start_paused = true)]
    async fn create_shows_placeholder_until_committed() {
        let (portal, service) = service_with(vec![], vec![]).await;
        portal.set_latency(Duration::from_millis(200));

        let handle = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.create_task(TaskDraft::new("Fresh work")).await }
        });
        tokio::task::yield_now().await;

        // Placeholder is already on screen
        assert_eq!(
            service.with_store(|s| s.tasks().first().map(|t| t.title.clone())),
            Some("Fresh work".to_string())
        );

        let committed_id = handle.await.unwrap().unwrap();
        assert_eq!(service.with_store(|s| s.tasks().len()), 1);
        assert!(service.with_store(|s| s.contains_task(&committed_id)));
        let (tasks, _) = portal.records();
        assert_eq!(tasks[0].id, committed_id);
    }

    #[tokio::test]
    async fn failed_create_discards_placeholder() {
        let (portal, service) = service_with(vec![], vec![]).await;
        portal.fail_next("quota exceeded");

        let result = service.create_task(TaskDraft::new("Doomed")).await;

        assert!(result.is_err());
        assert_eq!(service.with_store(|s| s.tasks().len()), 0);
        let (tasks, _) = portal.records();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn delete_restores_on_rejection() {
        let task = make_task("Sticky");
        let id = task.id.clone();
        let (portal, service) = service_with(vec![task], vec![]).await;
        portal.fail_next("locked");

        assert!(service.delete_task(&id).await.is_err());

        assert!(service.with_store(|s| s.contains_task(&id)));
    }

    #[tokio::test]
    async fn drop_on_same_column_is_local_noop() {
        let task = make_task("Parked");
        let id = task.id.clone();
        let (portal, service) = service_with(vec![task], vec![]).await;

        service
            .apply_drop(DropCommand::new(id.clone(), TaskStatus::Todo))
            .await
            .unwrap();

        assert_eq!(portal.call_count("update_task"), 0);
    }

    #[tokio::test]
    async fn drop_moves_card_with_one_backend_call() {
        let task = make_task("Mobile");
        let id = task.id.clone();
        let (portal, service) = service_with(vec![task], vec![]).await;

        service
            .apply_drop(DropCommand::new(id.clone(), TaskStatus::InProgress))
            .await
            .unwrap();

        assert_eq!(portal.call_count("update_task"), 1);
        assert_eq!(
            service.with_store(|s| s.task(&id).unwrap().status),
            TaskStatus::InProgress
        );
    }

    #[tokio::test]
    async fn milestone_delete_cascades_everywhere() {
        let milestone = make_milestone("Phase");
        let mut owned = make_task("Owned");
        owned.milestone_id = Some(milestone.id.clone());
        let free = make_task("Free");
        let (portal, service) =
            service_with(vec![owned, free], vec![milestone.clone()]).await;

        service.delete_milestone(&milestone.id).await.unwrap();

        assert_eq!(service.with_store(|s| s.tasks().len()), 1);
        let (tasks, milestones) = portal.records();
        assert_eq!(tasks.len(), 1);
        assert!(milestones.is_empty());
    }

    #[tokio::test]
    async fn failed_milestone_delete_restores_cascade_in_order() {
        let milestone = make_milestone("Phase");
        let mut first = make_task("First");
        first.milestone_id = Some(milestone.id.clone());
        let middle = make_task("Middle");
        let mut last = make_task("Last");
        last.milestone_id = Some(milestone.id.clone());
        let (portal, service) =
            service_with(vec![first, middle, last], vec![milestone.clone()]).await;
        portal.fail_next("forbidden");

        assert!(service.delete_milestone(&milestone.id).await.is_err());

        let titles = service.with_store(|s| {
            s.tasks().iter().map(|t| t.title.clone()).collect::<Vec<_>>()
        });
        assert_eq!(titles, vec!["First", "Middle", "Last"]);
        assert_eq!(service.with_store(|s| s.milestones().len()), 1);
    }

    #[tokio::test]
    async fn milestone_note_update_rolls_back_on_rejection() {
        let milestone = make_milestone("Quiet");
        let id = milestone.id.clone();
        let (portal, service) = service_with(vec![], vec![milestone]).await;
        portal.fail_next("read-only mode");

        let result = service
            .update_milestone(&id, MilestonePatch::client_note("Shipping Friday"))
            .await;

        assert!(result.is_err());
        assert_eq!(
            service.with_store(|s| s.milestone(&id).unwrap().client_note.clone()),
            None
        );
    }

    #[tokio::test]
    async fn failed_write_rolls_back_to_last_fetched_state() {
        let task = make_task("Refetched");
        let id = task.id.clone();
        let (portal, service) = service_with(vec![task], vec![]).await;

        // A successful write, then a refresh, then a failing write: only
        // the failing write may roll back, and only to post-refresh state
        service
            .set_task_status(&id, TaskStatus::InProgress)
            .await
            .unwrap();
        service.refresh().await.unwrap();

        portal.fail_next("outage");
        assert!(service.set_task_status(&id, TaskStatus::Done).await.is_err());

        assert_eq!(
            service.with_store(|s| s.task(&id).unwrap().status),
            TaskStatus::InProgress
        );
    }
}
