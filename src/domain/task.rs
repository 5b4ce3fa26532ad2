//! Task domain model
//!
//! Tasks are the units of work within a project. They carry an optional
//! date range for timeline placement and an optional milestone assignment.
//! Overdue and due-soon are always derived from the due date, never stored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MilestoneId, TaskId};

/// Lookahead used for the due-soon badge in list and timeline views.
///
/// The board summary uses the wider [`crate::sched::BOARD_DUE_SOON_DAYS`];
/// the two thresholds are intentionally distinct and must not be folded
/// into one another.
pub const DUE_SOON_DAYS: i64 = 2;

/// Status of a task
///
/// Every transition between statuses is legal; the board allows dragging a
/// card straight from `todo` to `done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Returns true if this task is not yet started
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Todo)
    }

    /// Returns true if this task is being worked on or reviewed
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::InProgress | TaskStatus::Review)
    }

    /// Returns all statuses in board column order
    pub fn all() -> &'static [TaskStatus] {
        &[
            TaskStatus::Todo,
            TaskStatus::InProgress,
            TaskStatus::Review,
            TaskStatus::Done,
        ]
    }

    /// Returns a display label for the status
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Review => "Review",
            TaskStatus::Done => "Done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "todo"),
            TaskStatus::InProgress => write!(f, "in-progress"),
            TaskStatus::Review => write!(f, "review"),
            TaskStatus::Done => write!(f, "done"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todo" | "to-do" | "open" => Ok(TaskStatus::Todo),
            "in-progress" | "in_progress" | "inprogress" | "doing" => Ok(TaskStatus::InProgress),
            "review" | "in-review" => Ok(TaskStatus::Review),
            "done" | "complete" | "completed" => Ok(TaskStatus::Done),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

/// Priority of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Returns all priorities in ascending order
    pub fn all() -> &'static [Priority] {
        &[
            Priority::Low,
            Priority::Medium,
            Priority::High,
            Priority::Urgent,
        ]
    }

    /// Returns a display label for the priority
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Urgent => write!(f, "urgent"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "normal" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" | "critical" => Ok(Priority::Urgent),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// A task within a project
///
/// Deserialization accepts the legacy shape where a task carries a
/// `completed` boolean instead of a `status` field: `completed == true`
/// becomes `done`, anything else `todo`. Serialization always writes the
/// `status` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskWire")]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Human-readable title
    pub title: String,

    /// Current status
    pub status: TaskStatus,

    /// Priority (defaults to medium)
    #[serde(default)]
    pub priority: Priority,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// First day of the planned date range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// Day the task is due
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Owning milestone, or None for unassigned tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<MilestoneId>,

    /// Assigned user, opaque to this crate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Wire shape for [`Task`] deserialization, normalizing the legacy
/// `completed` boolean into a status.
#[derive(Deserialize)]
struct TaskWire {
    id: TaskId,
    title: String,
    #[serde(default)]
    status: Option<TaskStatus>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    due_date: Option<NaiveDate>,
    #[serde(default)]
    milestone_id: Option<MilestoneId>,
    #[serde(default)]
    assignee_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskWire> for Task {
    fn from(wire: TaskWire) -> Self {
        let status = wire.status.unwrap_or(match wire.completed {
            Some(true) => TaskStatus::Done,
            _ => TaskStatus::Todo,
        });
        Self {
            id: wire.id,
            title: wire.title,
            status,
            priority: wire.priority,
            description: wire.description,
            start_date: wire.start_date,
            due_date: wire.due_date,
            milestone_id: wire.milestone_id,
            assignee_id: wire.assignee_id,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }
}

impl Task {
    /// Creates a new task with the given ID and title
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            description: None,
            start_date: None,
            due_date: None,
            milestone_id: None,
            assignee_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transitions to a new status
    pub fn set_status(&mut self, status: TaskStatus) {
        if self.status != status {
            self.status = status;
            self.updated_at = Utc::now();
        }
    }

    /// Sets the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.updated_at = Utc::now();
    }

    /// Sets the description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
        self.updated_at = Utc::now();
    }

    /// Sets the priority
    pub fn set_priority(&mut self, priority: Priority) {
        if self.priority != priority {
            self.priority = priority;
            self.updated_at = Utc::now();
        }
    }

    /// Replaces the planned date range
    pub fn set_dates(&mut self, start: Option<NaiveDate>, due: Option<NaiveDate>) {
        self.start_date = start;
        self.due_date = due;
        self.updated_at = Utc::now();
    }

    /// Moves the task into a milestone, or to unassigned with None
    pub fn assign_milestone(&mut self, milestone: Option<MilestoneId>) {
        if self.milestone_id != milestone {
            self.milestone_id = milestone;
            self.updated_at = Utc::now();
        }
    }

    /// Returns true if the due date has passed and the task is not done.
    ///
    /// Operates at calendar-day granularity: a task due today is not yet
    /// overdue, it is due-soon.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => !self.status.is_complete() && due < today,
            None => false,
        }
    }

    /// Returns true if the due date falls within `lookahead_days` from today.
    ///
    /// Overdue and done tasks are never due-soon. Callers pass
    /// [`DUE_SOON_DAYS`] or [`crate::sched::BOARD_DUE_SOON_DAYS`].
    pub fn is_due_soon(&self, today: NaiveDate, lookahead_days: i64) -> bool {
        match self.due_date {
            Some(due) => {
                !self.status.is_complete()
                    && due >= today
                    && (due - today).num_days() <= lookahead_days
            }
            None => false,
        }
    }
}

/// Fields for creating a task; the backend (or local transport) assigns
/// the id and timestamps.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<MilestoneId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
}

impl TaskDraft {
    /// Creates a quick-add draft: todo, medium priority, no dates, unassigned
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Materializes the draft into a task with a locally minted id
    pub fn into_task(self, now: DateTime<Utc>) -> Task {
        Task {
            id: TaskId::generate(&self.title, now),
            title: self.title,
            status: self.status,
            priority: self.priority,
            description: self.description,
            start_date: self.start_date,
            due_date: self.due_date,
            milestone_id: self.milestone_id,
            assignee_id: self.assignee_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a task.
///
/// Outer `None` leaves the field untouched; for nullable fields the inner
/// `None` clears it (serialized as an explicit JSON null).
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<Option<MilestoneId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Option<String>>,
}

impl TaskPatch {
    /// Patch that only changes the status (the drag-and-drop patch)
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Returns true if no field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.description.is_none()
            && self.start_date.is_none()
            && self.due_date.is_none()
            && self.milestone_id.is_none()
            && self.assignee_id.is_none()
    }

    /// Applies the patch to a task, touching `updated_at` when anything is set
    pub fn apply_to(&self, task: &mut Task) {
        if self.is_empty() {
            return;
        }
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(start) = self.start_date {
            task.start_date = start;
        }
        if let Some(due) = self.due_date {
            task.due_date = due;
        }
        if let Some(milestone) = &self.milestone_id {
            task.milestone_id = milestone.clone();
        }
        if let Some(assignee) = &self.assignee_id {
            task.assignee_id = assignee.clone();
        }
        task.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(title: &str) -> Task {
        let id = TaskId::generate(title, Utc::now());
        Task::new(id, title)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_task_defaults() {
        let task = make_task("Write copy");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.milestone_id.is_none());
        assert!(task.start_date.is_none());
    }

    #[test]
    fn any_status_transition_is_legal() {
        let mut task = make_task("Ship it");

        task.set_status(TaskStatus::Done);
        assert_eq!(task.status, TaskStatus::Done);

        // Backward moves are allowed too
        task.set_status(TaskStatus::Review);
        assert_eq!(task.status, TaskStatus::Review);

        task.set_status(TaskStatus::Todo);
        assert_eq!(task.status, TaskStatus::Todo);
    }

    #[test]
    fn updated_at_changes_on_modifications() {
        let mut task = make_task("Edit me");
        let created = task.updated_at;

        std::thread::sleep(std::time::Duration::from_millis(10));
        task.set_status(TaskStatus::InProgress);

        assert!(task.updated_at > created);
    }

    #[test]
    fn same_status_does_not_touch_updated_at() {
        let mut task = make_task("Stable");
        let created = task.updated_at;

        std::thread::sleep(std::time::Duration::from_millis(10));
        task.set_status(TaskStatus::Todo);

        assert_eq!(task.updated_at, created);
    }

    #[test]
    fn overdue_requires_past_due_and_not_done() {
        let today = day(2026, 8, 25);
        let mut task = make_task("Late");
        task.due_date = Some(day(2026, 8, 20));

        assert!(task.is_overdue(today));

        task.set_status(TaskStatus::Done);
        assert!(!task.is_overdue(today));
    }

    #[test]
    fn task_due_today_is_not_overdue() {
        let today = day(2026, 8, 25);
        let mut task = make_task("Due today");
        task.due_date = Some(today);

        assert!(!task.is_overdue(today));
        assert!(task.is_due_soon(today, DUE_SOON_DAYS));
    }

    #[test]
    fn task_without_due_date_is_never_overdue_or_due_soon() {
        let today = day(2026, 8, 25);
        let task = make_task("Undated");

        assert!(!task.is_overdue(today));
        assert!(!task.is_due_soon(today, DUE_SOON_DAYS));
    }

    #[test]
    fn due_soon_respects_lookahead() {
        let today = day(2026, 8, 25);
        let mut task = make_task("Coming up");

        task.due_date = Some(day(2026, 8, 27));
        assert!(task.is_due_soon(today, DUE_SOON_DAYS));

        // Day 3 is outside the 2-day badge window but inside the board's
        task.due_date = Some(day(2026, 8, 28));
        assert!(!task.is_due_soon(today, DUE_SOON_DAYS));
        assert!(task.is_due_soon(today, 3));
    }

    #[test]
    fn overdue_task_is_not_due_soon() {
        let today = day(2026, 8, 25);
        let mut task = make_task("Slipped");
        task.due_date = Some(day(2026, 8, 24));

        assert!(task.is_overdue(today));
        assert!(!task.is_due_soon(today, DUE_SOON_DAYS));
    }

    #[test]
    fn done_task_is_never_due_soon() {
        let today = day(2026, 8, 25);
        let mut task = make_task("Finished early");
        task.due_date = Some(day(2026, 8, 26));
        task.set_status(TaskStatus::Done);

        assert!(!task.is_due_soon(today, DUE_SOON_DAYS));
    }

    #[test]
    fn legacy_completed_true_normalizes_to_done() {
        let json = r#"{"id":"t-1234567","title":"Old record","completed":true,
            "created_at":"2025-01-01T00:00:00Z","updated_at":"2025-01-01T00:00:00Z"}"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, TaskStatus::Done);
    }

    #[test]
    fn legacy_completed_false_normalizes_to_todo() {
        let json = r#"{"id":"t-1234567","title":"Old record","completed":false,
            "created_at":"2025-01-01T00:00:00Z","updated_at":"2025-01-01T00:00:00Z"}"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
    }

    #[test]
    fn explicit_status_wins_over_legacy_flag() {
        let json = r#"{"id":"t-1234567","title":"Both fields","status":"review","completed":true,
            "created_at":"2025-01-01T00:00:00Z","updated_at":"2025-01-01T00:00:00Z"}"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, TaskStatus::Review);
    }

    #[test]
    fn status_serializes_kebab_case() {
        let mut task = make_task("Wire format");
        task.set_status(TaskStatus::InProgress);

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"status\":\"in-progress\""));
        assert!(!json.contains("completed"));
    }

    #[test]
    fn serde_roundtrip() {
        let mut task = make_task("Round trip");
        task.set_description("Full record");
        task.set_dates(Some(day(2026, 8, 1)), Some(day(2026, 8, 10)));
        task.set_priority(Priority::High);

        let json = serde_json::to_string(&task).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();

        assert_eq!(task, parsed);
    }

    #[test]
    fn optional_fields_are_omitted_when_none() {
        let task = make_task("Sparse");
        let json = serde_json::to_string(&task).unwrap();

        assert!(!json.contains("description"));
        assert!(!json.contains("due_date"));
        assert!(!json.contains("milestone_id"));
    }

    #[test]
    fn status_parses_aliases() {
        assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("completed".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!("shipped".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn quick_add_draft_defaults() {
        let draft = TaskDraft::new("Quick one");
        assert_eq!(draft.status, TaskStatus::Todo);
        assert_eq!(draft.priority, Priority::Medium);
        assert!(draft.due_date.is_none());

        let task = draft.into_task(Utc::now());
        assert!(task.id.to_string().starts_with("t-"));
        assert_eq!(task.title, "Quick one");
    }

    #[test]
    fn status_patch_changes_only_status() {
        let mut task = make_task("Patch me");
        task.set_description("keep this");

        TaskPatch::status(TaskStatus::Done).apply_to(&mut task);

        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.description.as_deref(), Some("keep this"));
    }

    #[test]
    fn patch_can_clear_nullable_fields() {
        let mut task = make_task("Clear me");
        task.set_dates(Some(day(2026, 8, 1)), Some(day(2026, 8, 2)));

        let patch = TaskPatch {
            due_date: Some(None),
            ..TaskPatch::default()
        };
        patch.apply_to(&mut task);

        assert_eq!(task.start_date, Some(day(2026, 8, 1)));
        assert!(task.due_date.is_none());
    }

    #[test]
    fn patch_serializes_cleared_field_as_null() {
        let patch = TaskPatch {
            milestone_id: Some(None),
            status: Some(TaskStatus::Todo),
            ..TaskPatch::default()
        };
        let json = serde_json::to_string(&patch).unwrap();

        assert!(json.contains("\"milestone_id\":null"));
        assert!(!json.contains("title"));
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let mut task = make_task("Untouched");
        let before = task.clone();

        TaskPatch::default().apply_to(&mut task);

        assert_eq!(task, before);
    }
}
