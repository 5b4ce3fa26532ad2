//! Task filtering for list, board and timeline views
//!
//! A [`TaskFilter`] combines an optional title search with status and
//! milestone criteria. All active criteria must match (they are ANDed);
//! a default filter matches everything.

use std::fmt;
use std::str::FromStr;

use crate::domain::{MilestoneId, Task, TaskStatus};

/// Status criterion: either any status or exactly one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => task.status == *status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(status) => write!(f, "{status}"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "any" | "" => Ok(Self::All),
            other => other.parse::<TaskStatus>().map(Self::Only),
        }
    }
}

/// Milestone criterion: any, explicitly unassigned, or one milestone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MilestoneFilter {
    #[default]
    All,
    Unassigned,
    Milestone(MilestoneId),
}

impl MilestoneFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Unassigned => task.milestone_id.is_none(),
            Self::Milestone(id) => task.milestone_id.as_ref() == Some(id),
        }
    }
}

impl fmt::Display for MilestoneFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Unassigned => write!(f, "unassigned"),
            Self::Milestone(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for MilestoneFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "any" | "" => Ok(Self::All),
            "unassigned" | "none" => Ok(Self::Unassigned),
            _ => s
                .trim()
                .parse::<MilestoneId>()
                .map(Self::Milestone)
                .map_err(|e| e.to_string()),
        }
    }
}

/// Combined filter over a task collection.
///
/// The search term matches case-insensitively against task titles only;
/// descriptions and notes are not searched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub search: String,
    pub status: StatusFilter,
    pub milestone: MilestoneFilter,
}

impl TaskFilter {
    /// Filter that matches every task
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_milestone(mut self, milestone: MilestoneFilter) -> Self {
        self.milestone = milestone;
        self
    }

    /// Returns true when no criterion is active
    pub fn is_unrestricted(&self) -> bool {
        self.search.trim().is_empty()
            && self.status == StatusFilter::All
            && self.milestone == MilestoneFilter::All
    }

    /// Returns true if `task` satisfies every active criterion
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_search(task) && self.status.matches(task) && self.milestone.matches(task)
    }

    fn matches_search(&self, task: &Task) -> bool {
        let term = self.search.trim();
        if term.is_empty() {
            return true;
        }
        task.title.to_lowercase().contains(&term.to_lowercase())
    }

    /// Projects the matching tasks out of `tasks`, preserving their order.
    ///
    /// The source collection is never touched; the result borrows from it.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }
}
