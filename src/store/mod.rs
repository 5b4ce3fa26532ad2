//! # Project Store
//!
//! In-memory collection of one project's tasks and milestones, shared by
//! every view. The store is the single source of truth for rendering;
//! persistence happens elsewhere and reconciles back into it.
//!
//! ## Ordering
//!
//! Tasks and milestones live in plain vectors and keep their load order.
//! Mutations edit records in place, so a task never moves in a list just
//! because its status changed.
//!
//! ## Optimistic mutation protocol
//!
//! Every mutating method validates first and returns an undo record on
//! success. Callers that persist asynchronously hold on to the undo; when
//! the backend rejects the write they hand it back to [`ProjectStore::revert_task`]
//! or [`ProjectStore::revert_milestone`]. A revert only applies while the
//! record's revision still matches the one the undo was minted under, so a
//! rollback never clobbers a newer local edit.

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{Milestone, MilestoneId, MilestonePatch, Task, TaskId, TaskPatch};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Milestone not found: {0}")]
    MilestoneNotFound(MilestoneId),

    #[error("A task with id {0} already exists")]
    DuplicateTask(TaskId),

    #[error("A milestone with id {0} already exists")]
    DuplicateMilestone(MilestoneId),

    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Start date {start} falls after due date {due}")]
    InvalidDateRange { start: NaiveDate, due: NaiveDate },
}

#[derive(Debug)]
enum PriorTask {
    /// The record as it stood before an in-place edit
    Replace(Task),
    /// A removed record and the index it occupied
    Reinsert(usize, Task),
}

/// Undo record for one task mutation
#[derive(Debug)]
pub struct TaskUndo {
    id: TaskId,
    prior: PriorTask,
    revision: u64,
}

enum PriorMilestone {
    Replace(Milestone),
    Reinsert(usize, Milestone),
}

/// Undo record for one milestone mutation.
///
/// A milestone removal cascades to its tasks; the undo carries them too,
/// with their original positions.
pub struct MilestoneUndo {
    id: MilestoneId,
    prior: PriorMilestone,
    cascaded: Vec<(usize, Task)>,
    revision: u64,
}

/// All tasks and milestones of one project
#[derive(Debug, Default, Clone)]
pub struct ProjectStore {
    tasks: Vec<Task>,
    milestones: Vec<Milestone>,
    task_revisions: HashMap<TaskId, u64>,
    milestone_revisions: HashMap<MilestoneId, u64>,
    next_revision: u64,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from freshly fetched records, keeping their order
    pub fn from_records(tasks: Vec<Task>, milestones: Vec<Milestone>) -> Self {
        Self {
            tasks,
            milestones,
            ..Self::default()
        }
    }

    /// Replaces the whole content after a refresh.
    ///
    /// Outstanding undo records become stale: their revisions no longer
    /// match, so a late revert turns into a no-op instead of resurrecting
    /// pre-refresh data.
    pub fn replace_all(&mut self, tasks: Vec<Task>, milestones: Vec<Milestone>) {
        self.tasks = tasks;
        self.milestones = milestones;
        self.task_revisions.clear();
        self.milestone_revisions.clear();
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn milestone(&self, id: &MilestoneId) -> Option<&Milestone> {
        self.milestones.iter().find(|m| &m.id == id)
    }

    pub fn contains_task(&self, id: &TaskId) -> bool {
        self.task(id).is_some()
    }

    /// Tasks assigned to `id`, in store order
    pub fn tasks_for_milestone(&self, id: &MilestoneId) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.milestone_id.as_ref() == Some(id))
            .collect()
    }

    /// Tasks with no milestone, in store order
    pub fn unassigned_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.milestone_id.is_none())
            .collect()
    }

    /// Appends a task after validating it
    pub fn insert_task(&mut self, task: Task) -> Result<(), StoreError> {
        validate_title(&task.title)?;
        validate_dates(task.start_date, task.due_date)?;
        if self.contains_task(&task.id) {
            return Err(StoreError::DuplicateTask(task.id));
        }
        self.bump_task(task.id.clone());
        self.tasks.push(task);
        Ok(())
    }

    /// Swaps the record under `current` for `task`, keeping its position.
    ///
    /// Used when the backend's answer to a create replaces the locally
    /// minted placeholder; the ids usually differ.
    pub fn replace_task(&mut self, current: &TaskId, task: Task) -> Result<(), StoreError> {
        let idx = self
            .task_index(current)
            .ok_or_else(|| StoreError::TaskNotFound(current.clone()))?;
        self.task_revisions.remove(current);
        self.bump_task(task.id.clone());
        self.tasks[idx] = task;
        Ok(())
    }

    /// Applies `patch` to the task, validating the patched result first
    pub fn update_task(&mut self, id: &TaskId, patch: &TaskPatch) -> Result<TaskUndo, StoreError> {
        let idx = self
            .task_index(id)
            .ok_or_else(|| StoreError::TaskNotFound(id.clone()))?;

        let prior = self.tasks[idx].clone();
        let mut updated = prior.clone();
        patch.apply_to(&mut updated);
        validate_title(&updated.title)?;
        validate_dates(updated.start_date, updated.due_date)?;

        self.tasks[idx] = updated;
        let revision = self.bump_task(id.clone());
        Ok(TaskUndo {
            id: id.clone(),
            prior: PriorTask::Replace(prior),
            revision,
        })
    }

    /// Removes a task, remembering where it sat
    pub fn remove_task(&mut self, id: &TaskId) -> Result<TaskUndo, StoreError> {
        let idx = self
            .task_index(id)
            .ok_or_else(|| StoreError::TaskNotFound(id.clone()))?;

        let task = self.tasks.remove(idx);
        let revision = self.bump_task(id.clone());
        Ok(TaskUndo {
            id: id.clone(),
            prior: PriorTask::Reinsert(idx, task),
            revision,
        })
    }

    /// Discards a task without minting an undo.
    ///
    /// For abandoning placeholders after a failed create; returns true if
    /// the record was still present.
    pub fn discard_task(&mut self, id: &TaskId) -> bool {
        match self.task_index(id) {
            Some(idx) => {
                self.tasks.remove(idx);
                self.task_revisions.remove(id);
                true
            }
            None => false,
        }
    }

    /// Rolls a task mutation back.
    ///
    /// Returns true if the rollback applied. It is skipped (returning
    /// false) when a newer mutation has touched the record since the undo
    /// was minted, or when the store content was replaced wholesale.
    pub fn revert_task(&mut self, undo: TaskUndo) -> bool {
        if self.task_revisions.get(&undo.id) != Some(&undo.revision) {
            return false;
        }
        match undo.prior {
            PriorTask::Replace(task) => match self.task_index(&undo.id) {
                Some(idx) => {
                    self.tasks[idx] = task;
                    self.bump_task(undo.id);
                    true
                }
                None => false,
            },
            PriorTask::Reinsert(idx, task) => {
                let idx = idx.min(self.tasks.len());
                self.tasks.insert(idx, task);
                self.bump_task(undo.id);
                true
            }
        }
    }

    /// Appends a milestone after validating it
    pub fn insert_milestone(&mut self, milestone: Milestone) -> Result<(), StoreError> {
        validate_title(&milestone.title)?;
        if self.milestone(&milestone.id).is_some() {
            return Err(StoreError::DuplicateMilestone(milestone.id));
        }
        self.bump_milestone(milestone.id.clone());
        self.milestones.push(milestone);
        Ok(())
    }

    /// Swaps the record under `current` for `milestone`, keeping its position
    pub fn replace_milestone(
        &mut self,
        current: &MilestoneId,
        milestone: Milestone,
    ) -> Result<(), StoreError> {
        let idx = self
            .milestone_index(current)
            .ok_or_else(|| StoreError::MilestoneNotFound(current.clone()))?;
        self.milestone_revisions.remove(current);
        self.bump_milestone(milestone.id.clone());
        self.milestones[idx] = milestone;
        Ok(())
    }

    /// Applies `patch` to the milestone, validating the patched result first
    pub fn update_milestone(
        &mut self,
        id: &MilestoneId,
        patch: &MilestonePatch,
    ) -> Result<MilestoneUndo, StoreError> {
        let idx = self
            .milestone_index(id)
            .ok_or_else(|| StoreError::MilestoneNotFound(id.clone()))?;

        let prior = self.milestones[idx].clone();
        let mut updated = prior.clone();
        patch.apply_to(&mut updated);
        validate_title(&updated.title)?;

        self.milestones[idx] = updated;
        let revision = self.bump_milestone(id.clone());
        Ok(MilestoneUndo {
            id: id.clone(),
            prior: PriorMilestone::Replace(prior),
            cascaded: Vec::new(),
            revision,
        })
    }

    /// Removes a milestone and every task assigned to it.
    ///
    /// The cascade mirrors the backend, which drops a milestone's tasks
    /// with it; keeping them locally would leave orphans the next refresh
    /// deletes anyway.
    pub fn remove_milestone(&mut self, id: &MilestoneId) -> Result<MilestoneUndo, StoreError> {
        let idx = self
            .milestone_index(id)
            .ok_or_else(|| StoreError::MilestoneNotFound(id.clone()))?;

        let milestone = self.milestones.remove(idx);
        let mut cascaded = Vec::new();
        let mut kept = Vec::with_capacity(self.tasks.len());
        for (pos, task) in self.tasks.drain(..).enumerate() {
            if task.milestone_id.as_ref() == Some(id) {
                cascaded.push((pos, task));
            } else {
                kept.push(task);
            }
        }
        self.tasks = kept;
        for (_, task) in &cascaded {
            self.task_revisions.remove(&task.id);
        }

        let revision = self.bump_milestone(id.clone());
        Ok(MilestoneUndo {
            id: id.clone(),
            prior: PriorMilestone::Reinsert(idx, milestone),
            cascaded,
            revision,
        })
    }

    /// Discards a milestone placeholder without minting an undo
    pub fn discard_milestone(&mut self, id: &MilestoneId) -> bool {
        match self.milestone_index(id) {
            Some(idx) => {
                self.milestones.remove(idx);
                self.milestone_revisions.remove(id);
                true
            }
            None => false,
        }
    }

    /// Rolls a milestone mutation back, restoring cascaded tasks at their
    /// original positions.
    ///
    /// Same staleness rule as [`ProjectStore::revert_task`].
    pub fn revert_milestone(&mut self, undo: MilestoneUndo) -> bool {
        if self.milestone_revisions.get(&undo.id) != Some(&undo.revision) {
            return false;
        }
        match undo.prior {
            PriorMilestone::Replace(milestone) => match self.milestone_index(&undo.id) {
                Some(idx) => {
                    self.milestones[idx] = milestone;
                    self.bump_milestone(undo.id);
                    true
                }
                None => false,
            },
            PriorMilestone::Reinsert(idx, milestone) => {
                let idx = idx.min(self.milestones.len());
                self.milestones.insert(idx, milestone);
                // Ascending positions restore the original interleaving
                for (pos, task) in undo.cascaded {
                    let pos = pos.min(self.tasks.len());
                    self.tasks.insert(pos, task);
                }
                self.bump_milestone(undo.id);
                true
            }
        }
    }

    fn task_index(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    fn milestone_index(&self, id: &MilestoneId) -> Option<usize> {
        self.milestones.iter().position(|m| &m.id == id)
    }

    fn bump_task(&mut self, id: TaskId) -> u64 {
        let revision = self.next_revision;
        self.next_revision += 1;
        self.task_revisions.insert(id, revision);
        revision
    }

    fn bump_milestone(&mut self, id: MilestoneId) -> u64 {
        let revision = self.next_revision;
        self.next_revision += 1;
        self.milestone_revisions.insert(id, revision);
        revision
    }
}

fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        Err(StoreError::EmptyTitle)
    } else {
        Ok(())
    }
}

fn validate_dates(start: Option<NaiveDate>, due: Option<NaiveDate>) -> Result<(), StoreError> {
    if let (Some(start), Some(due)) = (start, due) {
        if start > due {
            return Err(StoreError::InvalidDateRange { start, due });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::{MilestoneDraft, TaskDraft, TaskStatus};

    fn make_task(title: &str) -> Task {
        TaskDraft::new(title).into_task(Utc::now())
    }

    fn make_milestone(title: &str) -> Milestone {
        MilestoneDraft::new(title).into_milestone(Utc::now())
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn insert_and_read_back() {
        let mut store = ProjectStore::new();
        let task = make_task("First");

        store.insert_task(task.clone()).unwrap();

        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.task(&task.id).unwrap().title, "First");
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut store = ProjectStore::new();
        let task = make_task("Twice");

        store.insert_task(task.clone()).unwrap();
        let err = store.insert_task(task.clone()).unwrap_err();

        assert_eq!(err, StoreError::DuplicateTask(task.id));
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn insert_rejects_blank_title() {
        let mut store = ProjectStore::new();
        let mut task = make_task("x");
        task.title = "   ".into();

        assert_eq!(store.insert_task(task), Err(StoreError::EmptyTitle));
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn insert_rejects_inverted_dates() {
        let mut store = ProjectStore::new();
        let mut task = make_task("Backwards");
        task.start_date = Some(day(2026, 8, 20));
        task.due_date = Some(day(2026, 8, 10));

        let err = store.insert_task(task).unwrap_err();

        assert_eq!(
            err,
            StoreError::InvalidDateRange {
                start: day(2026, 8, 20),
                due: day(2026, 8, 10),
            }
        );
    }

    #[test]
    fn update_applies_patch() {
        let mut store = ProjectStore::new();
        let task = make_task("Patch me");
        store.insert_task(task.clone()).unwrap();

        store
            .update_task(&task.id, &TaskPatch::status(TaskStatus::Done))
            .unwrap();

        assert_eq!(store.task(&task.id).unwrap().status, TaskStatus::Done);
    }

    #[test]
    fn update_rejects_invalid_result_and_leaves_record_untouched() {
        let mut store = ProjectStore::new();
        let mut task = make_task("Dated");
        task.start_date = Some(day(2026, 8, 10));
        task.due_date = Some(day(2026, 8, 20));
        store.insert_task(task.clone()).unwrap();

        let patch = TaskPatch {
            due_date: Some(Some(day(2026, 8, 1))),
            ..TaskPatch::default()
        };
        assert!(store.update_task(&task.id, &patch).is_err());

        let unchanged = store.task(&task.id).unwrap();
        assert_eq!(unchanged.due_date, Some(day(2026, 8, 20)));
    }

    #[test]
    fn update_unknown_task_errors() {
        let mut store = ProjectStore::new();
        let ghost = make_task("Ghost");

        let err = store
            .update_task(&ghost.id, &TaskPatch::status(TaskStatus::Done))
            .unwrap_err();

        assert_eq!(err, StoreError::TaskNotFound(ghost.id));
    }

    #[test]
    fn revert_restores_prior_record() {
        let mut store = ProjectStore::new();
        let task = make_task("Undo me");
        store.insert_task(task.clone()).unwrap();

        let undo = store
            .update_task(&task.id, &TaskPatch::status(TaskStatus::Done))
            .unwrap();
        assert!(store.revert_task(undo));

        assert_eq!(store.task(&task.id).unwrap().status, TaskStatus::Todo);
    }

    #[test]
    fn revert_is_skipped_after_newer_edit() {
        let mut store = ProjectStore::new();
        let task = make_task("Raced");
        store.insert_task(task.clone()).unwrap();

        let first = store
            .update_task(&task.id, &TaskPatch::status(TaskStatus::InProgress))
            .unwrap();
        store
            .update_task(&task.id, &TaskPatch::status(TaskStatus::Review))
            .unwrap();

        // The rollback of the first edit must not clobber the second
        assert!(!store.revert_task(first));
        assert_eq!(store.task(&task.id).unwrap().status, TaskStatus::Review);
    }

    #[test]
    fn remove_and_revert_reinserts_at_position() {
        let mut store = ProjectStore::new();
        let a = make_task("A");
        let b = make_task("B");
        let c = make_task("C");
        store.insert_task(a.clone()).unwrap();
        store.insert_task(b.clone()).unwrap();
        store.insert_task(c.clone()).unwrap();

        let undo = store.remove_task(&b.id).unwrap();
        assert_eq!(store.tasks().len(), 2);

        assert!(store.revert_task(undo));
        let titles: Vec<&str> = store.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn replace_task_keeps_position() {
        let mut store = ProjectStore::new();
        let a = make_task("A");
        let placeholder = make_task("Placeholder");
        let c = make_task("C");
        store.insert_task(a.clone()).unwrap();
        store.insert_task(placeholder.clone()).unwrap();
        store.insert_task(c.clone()).unwrap();

        let server_record = make_task("Committed");
        store
            .replace_task(&placeholder.id, server_record.clone())
            .unwrap();

        let titles: Vec<&str> = store.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "Committed", "C"]);
        assert!(!store.contains_task(&placeholder.id));
        assert!(store.contains_task(&server_record.id));
    }

    #[test]
    fn discard_task_drops_placeholder() {
        let mut store = ProjectStore::new();
        let task = make_task("Doomed");
        store.insert_task(task.clone()).unwrap();

        assert!(store.discard_task(&task.id));
        assert!(!store.discard_task(&task.id));
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn milestone_remove_cascades_to_tasks() {
        let mut store = ProjectStore::new();
        let milestone = make_milestone("Phase");
        store.insert_milestone(milestone.clone()).unwrap();

        let mut assigned = make_task("Assigned");
        assigned.milestone_id = Some(milestone.id.clone());
        let free = make_task("Free");
        store.insert_task(assigned.clone()).unwrap();
        store.insert_task(free.clone()).unwrap();

        store.remove_milestone(&milestone.id).unwrap();

        assert!(store.milestones().is_empty());
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].title, "Free");
    }

    #[test]
    fn milestone_revert_restores_cascaded_tasks_in_order() {
        let mut store = ProjectStore::new();
        let milestone = make_milestone("Phase");
        store.insert_milestone(milestone.clone()).unwrap();

        let mut first = make_task("First");
        first.milestone_id = Some(milestone.id.clone());
        let middle = make_task("Middle");
        let mut last = make_task("Last");
        last.milestone_id = Some(milestone.id.clone());
        store.insert_task(first.clone()).unwrap();
        store.insert_task(middle.clone()).unwrap();
        store.insert_task(last.clone()).unwrap();

        let undo = store.remove_milestone(&milestone.id).unwrap();
        assert!(store.revert_milestone(undo));

        let titles: Vec<&str> = store.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Middle", "Last"]);
        assert_eq!(store.milestones().len(), 1);
    }

    #[test]
    fn milestone_update_and_revert() {
        let mut store = ProjectStore::new();
        let milestone = make_milestone("Rename me");
        store.insert_milestone(milestone.clone()).unwrap();

        let patch = MilestonePatch {
            title: Some("Renamed".into()),
            ..MilestonePatch::default()
        };
        let undo = store.update_milestone(&milestone.id, &patch).unwrap();
        assert_eq!(store.milestone(&milestone.id).unwrap().title, "Renamed");

        assert!(store.revert_milestone(undo));
        assert_eq!(store.milestone(&milestone.id).unwrap().title, "Rename me");
    }

    #[test]
    fn replace_all_invalidates_outstanding_undos() {
        let mut store = ProjectStore::new();
        let task = make_task("Pre-refresh");
        store.insert_task(task.clone()).unwrap();
        let undo = store
            .update_task(&task.id, &TaskPatch::status(TaskStatus::Done))
            .unwrap();

        store.replace_all(vec![task.clone()], vec![]);

        assert!(!store.revert_task(undo));
        assert_eq!(store.task(&task.id).unwrap().status, TaskStatus::Todo);
    }

    #[test]
    fn projections_by_milestone() {
        let mut store = ProjectStore::new();
        let milestone = make_milestone("Scope");
        store.insert_milestone(milestone.clone()).unwrap();

        let mut assigned = make_task("In scope");
        assigned.milestone_id = Some(milestone.id.clone());
        let free = make_task("Backlog");
        store.insert_task(assigned).unwrap();
        store.insert_task(free).unwrap();

        assert_eq!(store.tasks_for_milestone(&milestone.id).len(), 1);
        assert_eq!(store.unassigned_tasks().len(), 1);
    }
}
