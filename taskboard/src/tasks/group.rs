//! Grouping by assignee and status statistics.

use std::collections::HashSet;

use taskboard_proto::assignment::AssignmentStatus;
use taskboard_proto::task::TaskWithAssignments;

/// All tasks assigned to one user, in listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssigneeGroup<'a> {
    /// Assignee display name.
    pub user_name: String,
    /// Tasks this user has an assignment on.
    pub tasks: Vec<&'a TaskWithAssignments>,
}

/// Groups tasks by assignee display name.
///
/// Groups appear in order of first appearance. A task with several
/// assignees is placed in each of their groups; a task assigned twice to
/// the same name appears once in that group. Unassigned tasks are in no
/// group (see [`unassigned`]).
#[must_use]
pub fn group_by_assignee<'a>(tasks: &[&'a TaskWithAssignments]) -> Vec<AssigneeGroup<'a>> {
    let mut groups: Vec<AssigneeGroup<'a>> = Vec::new();
    for &task in tasks {
        let mut placed: HashSet<&str> = HashSet::new();
        for assignment in &task.assignments {
            let name = assignment.user_name.as_str();
            if !placed.insert(name) {
                continue;
            }
            if let Some(group) = groups.iter_mut().find(|g| g.user_name == name) {
                group.tasks.push(task);
            } else {
                groups.push(AssigneeGroup {
                    user_name: name.to_string(),
                    tasks: vec![task],
                });
            }
        }
    }
    groups
}

/// Tasks without any assignment, in listing order.
#[must_use]
pub fn unassigned<'a>(tasks: &[&'a TaskWithAssignments]) -> Vec<&'a TaskWithAssignments> {
    tasks
        .iter()
        .copied()
        .filter(|t| t.assignments.is_empty())
        .collect()
}

/// Distinct assignee names in order of first appearance.
#[must_use]
pub fn assignee_names(tasks: &[TaskWithAssignments]) -> Vec<String> {
    let mut seen = HashSet::new();
    tasks
        .iter()
        .flat_map(|t| t.assignments.iter())
        .filter(|a| seen.insert(a.user_name.as_str()))
        .map(|a| a.user_name.clone())
        .collect()
}

/// Number of assignments in each status (the dashboard statistics card).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Assignments pending.
    pub pending: usize,
    /// Assignments in review.
    pub in_review: usize,
    /// Assignments needing correction.
    pub needs_correction: usize,
    /// Assignments published.
    pub published: usize,
}

impl StatusCounts {
    /// Counts every assignment of every task.
    #[must_use]
    pub fn from_tasks(tasks: &[&TaskWithAssignments]) -> Self {
        let mut counts = Self::default();
        for assignment in tasks.iter().flat_map(|t| t.assignments.iter()) {
            match assignment.status {
                AssignmentStatus::Pending => counts.pending += 1,
                AssignmentStatus::InReview => counts.in_review += 1,
                AssignmentStatus::NeedsCorrection => counts.needs_correction += 1,
                AssignmentStatus::Published => counts.published += 1,
            }
        }
        counts
    }

    /// Total number of assignments counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.pending + self.in_review + self.needs_correction + self.published
    }

    /// Count for one status.
    #[must_use]
    pub const fn get(&self, status: AssignmentStatus) -> usize {
        match status {
            AssignmentStatus::Pending => self.pending,
            AssignmentStatus::InReview => self.in_review,
            AssignmentStatus::NeedsCorrection => self.needs_correction,
            AssignmentStatus::Published => self.published,
        }
    }
}
