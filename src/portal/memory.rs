//! In-memory portal backend
//!
//! Serves demo mode and tests without a server. State lives behind an
//! `Arc<Mutex>`, so clones of one [`MemoryPortal`] share a single
//! project. Tests can inject latency and one-shot failures to exercise
//! the optimistic update paths.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};

use crate::domain::{
    Milestone, MilestoneDraft, MilestoneId, MilestonePatch, MilestoneStatus, Priority, ProjectId,
    Task, TaskDraft, TaskId, TaskPatch, TaskStatus,
};

use super::PortalError;

#[derive(Debug, Default)]
struct MemoryState {
    tasks: Vec<Task>,
    milestones: Vec<Milestone>,
    latency: Option<Duration>,
    fail_next: Option<String>,
    calls: Vec<String>,
}

/// Portal backend held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryPortal {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryPortal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing records
    pub fn with_records(tasks: Vec<Task>, milestones: Vec<Milestone>) -> Self {
        let portal = Self::new();
        {
            let mut state = portal.lock();
            state.tasks = tasks;
            state.milestones = milestones;
        }
        portal
    }

    /// A small demo project with milestones and tasks spread around `today`
    pub fn seeded(today: NaiveDate) -> Self {
        let created = Utc::now();
        let day = |offset: i64| today + ChronoDuration::days(offset);

        let mut milestones = Vec::new();
        let mut milestone = |title: &str, status: MilestoneStatus, due: Option<NaiveDate>| {
            let mut record = MilestoneDraft::new(title).into_milestone(created);
            record.status = status;
            record.due_date = due;
            let id = record.id.clone();
            milestones.push(record);
            id
        };

        let discovery = milestone("Discovery", MilestoneStatus::Completed, Some(day(-10)));
        let design = milestone("Design", MilestoneStatus::InProgress, Some(day(4)));
        let build = milestone("Build", MilestoneStatus::Pending, Some(day(21)));

        let mut tasks = Vec::new();
        let mut task = |title: &str,
                        status: TaskStatus,
                        priority: Priority,
                        start: Option<NaiveDate>,
                        due: Option<NaiveDate>,
                        milestone_id: Option<&MilestoneId>| {
            let mut record = TaskDraft::new(title).into_task(created);
            record.status = status;
            record.priority = priority;
            record.start_date = start;
            record.due_date = due;
            record.milestone_id = milestone_id.cloned();
            tasks.push(record);
        };

        task(
            "Stakeholder interviews",
            TaskStatus::Done,
            Priority::Medium,
            Some(day(-14)),
            Some(day(-10)),
            Some(&discovery),
        );
        task(
            "Wireframes",
            TaskStatus::Review,
            Priority::High,
            Some(day(-4)),
            Some(day(-1)),
            Some(&design),
        );
        task(
            "Visual design",
            TaskStatus::InProgress,
            Priority::High,
            Some(day(-2)),
            Some(day(3)),
            Some(&design),
        );
        task(
            "Copy review",
            TaskStatus::Todo,
            Priority::Medium,
            None,
            Some(day(2)),
            Some(&design),
        );
        task(
            "Component library",
            TaskStatus::Todo,
            Priority::Medium,
            Some(day(5)),
            Some(day(12)),
            Some(&build),
        );
        task(
            "Checkout flow",
            TaskStatus::Todo,
            Priority::Urgent,
            Some(day(8)),
            Some(day(18)),
            Some(&build),
        );
        task(
            "Update DNS records",
            TaskStatus::Todo,
            Priority::Low,
            None,
            None,
            None,
        );

        Self::with_records(tasks, milestones)
    }

    /// Delays every call by `latency` (virtual time under a paused runtime)
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    /// Makes the next call fail with a 503 carrying `message`
    pub fn fail_next(&self, message: impl Into<String>) {
        self.lock().fail_next = Some(message.into());
    }

    /// Every call made so far, as "op id" strings
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// How many calls named `op` were made
    pub fn call_count(&self, op: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.split_whitespace().next() == Some(op))
            .count()
    }

    /// Current backend state, for asserting persistence in tests
    pub fn records(&self) -> (Vec<Task>, Vec<Milestone>) {
        let state = self.lock();
        (state.tasks.clone(), state.milestones.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory portal lock poisoned")
    }

    /// Common prologue: wait out injected latency, log the call, honor a
    /// pending failure injection
    async fn begin(&self, call: String) -> Result<(), PortalError> {
        let latency = self.lock().latency;
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        state.calls.push(call);
        match state.fail_next.take() {
            Some(message) => Err(PortalError::Api {
                status: 503,
                message,
            }),
            None => Ok(()),
        }
    }

    pub async fn fetch_tasks(&self, project: &ProjectId) -> Result<Vec<Task>, PortalError> {
        self.begin(format!("fetch_tasks {project}")).await?;
        Ok(self.lock().tasks.clone())
    }

    pub async fn fetch_milestones(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<Milestone>, PortalError> {
        self.begin(format!("fetch_milestones {project}")).await?;
        Ok(self.lock().milestones.clone())
    }

    pub async fn create_task(
        &self,
        project: &ProjectId,
        draft: &TaskDraft,
    ) -> Result<Task, PortalError> {
        self.begin(format!("create_task {project}")).await?;
        let task = draft.clone().into_task(Utc::now());
        self.lock().tasks.push(task.clone());
        Ok(task)
    }

    pub async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), PortalError> {
        self.begin(format!("update_task {id}")).await?;
        let mut state = self.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| PortalError::TaskNotFound(id.clone()))?;
        patch.apply_to(task);
        Ok(())
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<(), PortalError> {
        self.begin(format!("delete_task {id}")).await?;
        self.lock().tasks.retain(|t| &t.id != id);
        Ok(())
    }

    pub async fn create_milestone(
        &self,
        project: &ProjectId,
        draft: &MilestoneDraft,
    ) -> Result<Milestone, PortalError> {
        self.begin(format!("create_milestone {project}")).await?;
        let milestone = draft.clone().into_milestone(Utc::now());
        self.lock().milestones.push(milestone.clone());
        Ok(milestone)
    }

    pub async fn update_milestone(
        &self,
        id: &MilestoneId,
        patch: &MilestonePatch,
    ) -> Result<(), PortalError> {
        self.begin(format!("update_milestone {id}")).await?;
        let mut state = self.lock();
        let milestone = state
            .milestones
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| PortalError::MilestoneNotFound(id.clone()))?;
        patch.apply_to(milestone);
        Ok(())
    }

    /// Deletes a milestone and, like the real backend, every task
    /// assigned to it
    pub async fn delete_milestone(&self, id: &MilestoneId) -> Result<(), PortalError> {
        self.begin(format!("delete_milestone {id}")).await?;
        let mut state = self.lock();
        state.milestones.retain(|m| &m.id != id);
        state.tasks.retain(|t| t.milestone_id.as_ref() != Some(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> ProjectId {
        "demo".parse().unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn seeded_portal_serves_records() {
        let portal = MemoryPortal::seeded(day(2026, 8, 26));

        let tasks = portal.fetch_tasks(&project()).await.unwrap();
        let milestones = portal.fetch_milestones(&project()).await.unwrap();

        assert!(!tasks.is_empty());
        assert_eq!(milestones.len(), 3);
    }

    #[tokio::test]
    async fn create_assigns_fresh_id() {
        let portal = MemoryPortal::new();
        let draft = TaskDraft::new("New work");

        let created = portal.create_task(&project(), &draft).await.unwrap();

        let tasks = portal.fetch_tasks(&project()).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, created.id);
    }

    #[tokio::test]
    async fn update_missing_task_errors() {
        let portal = MemoryPortal::new();
        let ghost = TaskDraft::new("Ghost").into_task(Utc::now());

        let err = portal
            .update_task(&ghost.id, &TaskPatch::status(TaskStatus::Done))
            .await
            .unwrap_err();

        assert!(matches!(err, PortalError::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let portal = MemoryPortal::new();
        let ghost = TaskDraft::new("Ghost").into_task(Utc::now());

        assert!(portal.delete_task(&ghost.id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_milestone_cascades() {
        let portal = MemoryPortal::seeded(day(2026, 8, 26));
        let milestones = portal.fetch_milestones(&project()).await.unwrap();
        let design = milestones
            .iter()
            .find(|m| m.title == "Design")
            .unwrap()
            .id
            .clone();

        portal.delete_milestone(&design).await.unwrap();

        let tasks = portal.fetch_tasks(&project()).await.unwrap();
        assert!(tasks.iter().all(|t| t.milestone_id.as_ref() != Some(&design)));
    }

    #[tokio::test]
    async fn fail_next_rejects_exactly_one_call() {
        let portal = MemoryPortal::new();
        portal.fail_next("maintenance window");

        let err = portal.fetch_tasks(&project()).await.unwrap_err();
        assert!(matches!(err, PortalError::Api { status: 503, .. }));

        assert!(portal.fetch_tasks(&project()).await.is_ok());
    }

    #[tokio::test]
    async fn calls_are_recorded() {
        let portal = MemoryPortal::new();

        portal.fetch_tasks(&project()).await.unwrap();
        portal.fetch_milestones(&project()).await.unwrap();
        portal.fetch_tasks(&project()).await.unwrap();

        assert_eq!(portal.call_count("fetch_tasks"), 2);
        assert_eq!(portal.call_count("fetch_milestones"), 1);
        assert_eq!(portal.call_count("update_task"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_calls_in_virtual_time() {
        let portal = MemoryPortal::new();
        portal.set_latency(Duration::from_millis(250));

        let started = tokio::time::Instant::now();
        portal.fetch_tasks(&project()).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(250));
    }
}
