//! Milestone progress and milestone-first task grouping

use crate::domain::{Milestone, MilestoneId, Task};

/// Percentage of a milestone's tasks that are done, rounded to the
/// nearest integer.
///
/// A milestone with no tasks reports 0, not an error.
pub fn milestone_progress(milestone_id: &MilestoneId, tasks: &[Task]) -> u8 {
    let scoped: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.milestone_id.as_ref() == Some(milestone_id))
        .collect();
    let done = scoped.iter().filter(|t| t.status.is_complete()).count();
    percentage(done, scoped.len())
}

fn percentage(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (done as f64 / total as f64 * 100.0).round() as u8
}

/// One milestone with the tasks assigned to it
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneGroup<'a> {
    pub milestone: &'a Milestone,
    pub tasks: Vec<&'a Task>,
}

impl MilestoneGroup<'_> {
    /// Percentage of this group's tasks that are done
    pub fn progress(&self) -> u8 {
        let done = self.tasks.iter().filter(|t| t.status.is_complete()).count();
        percentage(done, self.tasks.len())
    }
}

/// Tasks arranged milestone-first: one group per milestone plus the
/// leftover unassigned tasks
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedTasks<'a> {
    pub groups: Vec<MilestoneGroup<'a>>,
    pub unassigned: Vec<&'a Task>,
}

/// Groups `tasks` under `milestones`.
///
/// Groups follow the milestone order, tasks within a group follow the
/// task order. Tasks pointing at a milestone that is not in `milestones`
/// land in `unassigned` rather than disappearing.
pub fn group_by_milestone<'a>(
    milestones: &'a [Milestone],
    tasks: &'a [Task],
) -> GroupedTasks<'a> {
    let groups: Vec<MilestoneGroup<'a>> = milestones
        .iter()
        .map(|milestone| MilestoneGroup {
            milestone,
            tasks: tasks
                .iter()
                .filter(|t| t.milestone_id.as_ref() == Some(&milestone.id))
                .collect(),
        })
        .collect();

    let known = |id: &MilestoneId| milestones.iter().any(|m| &m.id == id);
    let unassigned = tasks
        .iter()
        .filter(|t| match &t.milestone_id {
            None => true,
            Some(id) => !known(id),
        })
        .collect();

    GroupedTasks { groups, unassigned }
}
