//! Per-board UI state as one explicit record.
//!
//! Edit mode and reassign mode are each a single `Option`, so two tasks
//! can never be in edit mode at once.

use std::collections::HashSet;

use taskboard_proto::ids::{AssignmentId, TaskId, UserId};
use taskboard_proto::task::TaskWithAssignments;

use crate::tasks::TaskFilter;

/// An in-progress reassignment of one specific assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reassignment {
    /// Task the assignment belongs to.
    pub task_id: TaskId,
    /// The assignment being replaced.
    pub assignment_id: AssignmentId,
    /// User chosen to take over, once selected.
    pub target: Option<UserId>,
}

/// Expand/collapse, edit and reassign state for one board.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    expanded: HashSet<TaskId>,
    expanded_users: HashSet<String>,
    known_users: HashSet<String>,
    editing: Option<TaskId>,
    reassigning: Option<Reassignment>,
    /// Active filter criteria.
    pub filter: TaskFilter,
}

impl BoardState {
    /// Empty state: every task collapsed, nothing being edited.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a task card is expanded.
    #[must_use]
    pub fn is_expanded(&self, id: TaskId) -> bool {
        self.expanded.contains(&id)
    }

    /// Flips a task card between collapsed and expanded.
    pub fn toggle_task(&mut self, id: TaskId) {
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    /// Marks every user row not seen before as expanded.
    ///
    /// Rows the user collapsed stay collapsed across reloads.
    pub fn seed_users<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            if self.known_users.insert(name.to_string()) {
                self.expanded_users.insert(name.to_string());
            }
        }
    }

    /// Whether a user row is expanded.
    #[must_use]
    pub fn is_user_expanded(&self, name: &str) -> bool {
        self.expanded_users.contains(name)
    }

    /// Flips a user row between collapsed and expanded.
    pub fn toggle_user(&mut self, name: &str) {
        self.known_users.insert(name.to_string());
        if !self.expanded_users.remove(name) {
            self.expanded_users.insert(name.to_string());
        }
    }

    /// The task currently in edit mode.
    #[must_use]
    pub const fn editing(&self) -> Option<TaskId> {
        self.editing
    }

    /// Puts `id` in edit mode, replacing whichever task was there.
    pub fn begin_edit(&mut self, id: TaskId) {
        self.editing = Some(id);
    }

    /// Leaves edit mode.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// The reassignment in progress.
    #[must_use]
    pub const fn reassigning(&self) -> Option<Reassignment> {
        self.reassigning
    }

    /// Starts choosing a new user for `assignment_id` of `task_id`.
    pub fn begin_reassign(&mut self, task_id: TaskId, assignment_id: AssignmentId) {
        self.reassigning = Some(Reassignment {
            task_id,
            assignment_id,
            target: None,
        });
    }

    /// Picks the user that takes over. Ignored when no reassignment is open.
    pub fn select_target(&mut self, user: UserId) {
        if let Some(r) = self.reassigning.as_mut() {
            r.target = Some(user);
        }
    }

    /// Confirm is enabled only once a target user is selected.
    #[must_use]
    pub const fn can_confirm_reassign(&self) -> bool {
        matches!(
            self.reassigning,
            Some(Reassignment {
                target: Some(_),
                ..
            })
        )
    }

    /// Closes the reassignment selector.
    pub fn cancel_reassign(&mut self) {
        self.reassigning = None;
    }

    /// Forgets state about tasks that are no longer in the listing.
    pub fn prune(&mut self, tasks: &[TaskWithAssignments]) {
        let present: HashSet<TaskId> = tasks.iter().map(TaskWithAssignments::id).collect();
        self.expanded.retain(|id| present.contains(id));
        if self.editing.is_some_and(|id| !present.contains(&id)) {
            self.editing = None;
        }
        if self
            .reassigning
            .is_some_and(|r| !present.contains(&r.task_id))
        {
            self.reassigning = None;
        }
    }
}
