//! Milestone domain model
//!
//! Milestones are named phases of a project. They own tasks by reference
//! (`milestone_id` on the task side) and carry notes for the client and the
//! internal team. Progress is always computed from owned tasks, never stored,
//! and never drives the milestone's own status.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::id::MilestoneId;

/// Status of a milestone
///
/// Transitions happen only through explicit user action; completing every
/// owned task does not complete the milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MilestoneStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl MilestoneStatus {
    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, MilestoneStatus::Completed)
    }

    /// Returns true if this milestone is actively being worked on
    pub fn is_active(&self) -> bool {
        matches!(self, MilestoneStatus::InProgress)
    }

    /// Returns true if no further work is expected
    pub fn is_closed(&self) -> bool {
        matches!(self, MilestoneStatus::Completed | MilestoneStatus::Cancelled)
    }

    /// Returns all valid status values
    pub fn all() -> &'static [MilestoneStatus] {
        &[
            MilestoneStatus::Pending,
            MilestoneStatus::InProgress,
            MilestoneStatus::Completed,
            MilestoneStatus::Cancelled,
        ]
    }

    /// Returns a display label for the status
    pub fn label(&self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "Pending",
            MilestoneStatus::InProgress => "In Progress",
            MilestoneStatus::Completed => "Completed",
            MilestoneStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MilestoneStatus::Pending => write!(f, "pending"),
            MilestoneStatus::InProgress => write!(f, "in-progress"),
            MilestoneStatus::Completed => write!(f, "completed"),
            MilestoneStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for MilestoneStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "planned" => Ok(MilestoneStatus::Pending),
            "in-progress" | "in_progress" | "inprogress" => Ok(MilestoneStatus::InProgress),
            "completed" | "complete" | "done" => Ok(MilestoneStatus::Completed),
            "cancelled" | "canceled" => Ok(MilestoneStatus::Cancelled),
            _ => Err(format!("Unknown milestone status: {}", s)),
        }
    }
}

/// A milestone within a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    /// Unique identifier
    pub id: MilestoneId,

    /// Human-readable title
    pub title: String,

    /// Current status
    #[serde(default)]
    pub status: MilestoneStatus,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Day the milestone is due
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Note visible to the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_note: Option<String>,

    /// Note visible to the team only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_note: Option<String>,

    /// When the milestone was created
    pub created_at: DateTime<Utc>,

    /// When the milestone was last updated
    pub updated_at: DateTime<Utc>,
}

impl Milestone {
    /// Creates a new milestone with the given ID and title
    pub fn new(id: MilestoneId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            status: MilestoneStatus::Pending,
            description: None,
            due_date: None,
            client_note: None,
            internal_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transitions to a new status
    pub fn set_status(&mut self, status: MilestoneStatus) {
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

    /// Sets the due date
    pub fn set_due_date(&mut self, due: Option<NaiveDate>) {
        if self.due_date != due {
            self.due_date = due;
            self.updated_at = Utc::now();
        }
    }

    /// Sets the client-visible note
    pub fn set_client_note(&mut self, note: impl Into<String>) {
        self.client_note = Some(note.into());
        self.updated_at = Utc::now();
    }

    /// Sets the internal note
    pub fn set_internal_note(&mut self, note: impl Into<String>) {
        self.internal_note = Some(note.into());
        self.updated_at = Utc::now();
    }
}

/// Fields for creating a milestone; the backend (or local transport)
/// assigns the id and timestamps.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MilestoneDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: MilestoneStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_note: Option<String>,
}

impl MilestoneDraft {
    /// Creates a draft with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Materializes the draft into a milestone with a locally minted id
    pub fn into_milestone(self, now: DateTime<Utc>) -> Milestone {
        Milestone {
            id: MilestoneId::generate(&self.title, now),
            title: self.title,
            status: self.status,
            description: self.description,
            due_date: self.due_date,
            client_note: self.client_note,
            internal_note: self.internal_note,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a milestone.
///
/// Outer `None` leaves the field untouched; for nullable fields the inner
/// `None` clears it (serialized as an explicit JSON null).
#[derive(Debug, Clone, Default, Serialize)]
pub struct MilestonePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MilestoneStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_note: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_note: Option<Option<String>>,
}

impl MilestonePatch {
    /// Patch that only changes the status
    pub fn status(status: MilestoneStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Patch that only sets the client note
    pub fn client_note(note: impl Into<String>) -> Self {
        Self {
            client_note: Some(Some(note.into())),
            ..Self::default()
        }
    }

    /// Returns true if no field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.client_note.is_none()
            && self.internal_note.is_none()
    }

    /// Applies the patch to a milestone, touching `updated_at` when anything is set
    pub fn apply_to(&self, milestone: &mut Milestone) {
        if self.is_empty() {
            return;
        }
        if let Some(title) = &self.title {
            milestone.title = title.clone();
        }
        if let Some(status) = self.status {
            milestone.status = status;
        }
        if let Some(description) = &self.description {
            milestone.description = description.clone();
        }
        if let Some(due) = self.due_date {
            milestone.due_date = due;
        }
        if let Some(note) = &self.client_note {
            milestone.client_note = note.clone();
        }
        if let Some(note) = &self.internal_note {
            milestone.internal_note = note.clone();
        }
        milestone.updated_at = Utc::now();
    }
}
