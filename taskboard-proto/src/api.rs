//! Request and response payloads for the mutation endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::assignment::AssignmentStatus;
use crate::ids::{CompanyId, TaskId, TaskTypeId, UserId};
use crate::task::{Priority, Task};

/// Editable task fields, used by both create and full update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Task title; must be non-empty.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Free-text content.
    #[serde(default)]
    pub content: String,
    /// Priority.
    pub priority: Priority,
    /// Scheduled day.
    pub date: NaiveDate,
    /// Optional task type.
    #[serde(default)]
    pub task_type: Option<TaskTypeId>,
    /// Optional company.
    #[serde(default)]
    pub company: Option<CompanyId>,
}

impl TaskDraft {
    /// Materializes the draft as a task with the given identifier.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            content: self.content,
            priority: self.priority,
            date: self.date,
            task_type: self.task_type,
            company: self.company,
        }
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            content: task.content.clone(),
            priority: task.priority,
            date: task.date,
            task_type: task.task_type,
            company: task.company,
        }
    }
}

/// How the backend should assign a newly created task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AssignmentMode {
    /// Leave the task unassigned.
    #[default]
    None,
    /// Let the backend pick a user at random.
    Random,
    /// Assign to a specific user.
    Manual {
        /// The chosen assignee.
        user_id: UserId,
    },
}

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    /// Task fields.
    #[serde(flatten)]
    pub task: TaskDraft,
    /// Initial assignment policy.
    #[serde(default)]
    pub assignment: AssignmentMode,
}

/// Body of `PATCH /api/assignments/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssignmentPatch {
    /// New workflow status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AssignmentStatus>,
    /// New progress detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AssignmentPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub const fn status(status: AssignmentStatus) -> Self {
        Self {
            status: Some(status),
            detail: None,
        }
    }

    /// A patch that only changes the progress detail.
    #[must_use]
    pub fn detail(detail: impl Into<String>) -> Self {
        Self {
            status: None,
            detail: Some(detail.into()),
        }
    }

    /// True when the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.detail.is_none()
    }
}

/// Body of `PATCH /api/tasks/{id}/description`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionPatch {
    /// Replacement description.
    pub description: String,
}

/// Body of `DELETE /api/assignments/{id}/reassign`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignRequest {
    /// User that takes over the assignment.
    pub user_id: UserId,
}

/// Error envelope returned by the backend on non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable message, shown to the user verbatim.
    pub message: String,
}
