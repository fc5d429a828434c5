//! Task types as returned by the listing endpoint.
//!
//! A [`TaskWithAssignments`] is the unit the client holds and refreshes:
//! the task fields plus the ordered list of its assignments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::ids::{CompanyId, TaskId, TaskTypeId};

/// A string did not name any variant of a wire enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Priority of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Urgent work.
    #[serde(rename = "alta")]
    High,
    /// Normal work.
    #[serde(rename = "media")]
    Medium,
    /// Can wait.
    #[serde(rename = "baja")]
    Low,
}

impl Priority {
    /// All priorities, highest first.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// The wire value of this priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "alta",
            Self::Medium => "media",
            Self::Low => "baja",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownVariant {
                kind: "priority",
                value: s.to_string(),
            })
    }
}

/// A unit of marketing or editorial work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Backend identifier.
    pub id: TaskId,
    /// Short title, never empty.
    pub title: String,
    /// Free-text description (edited inline on the board).
    #[serde(default)]
    pub description: String,
    /// Free-text content field.
    #[serde(default)]
    pub content: String,
    /// Task priority.
    pub priority: Priority,
    /// Day the task is scheduled for (`YYYY-MM-DD`).
    pub date: NaiveDate,
    /// Optional task type.
    #[serde(default)]
    pub task_type: Option<TaskTypeId>,
    /// Optional company the task is for.
    #[serde(default)]
    pub company: Option<CompanyId>,
}

/// A task together with its assignments, in listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskWithAssignments {
    /// The task fields, flattened into the same JSON object.
    #[serde(flatten)]
    pub task: Task,
    /// Zero or more assignments, one per assignee.
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl TaskWithAssignments {
    /// Shortcut for `self.task.id`.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.task.id
    }

    /// Whether any assignment belongs to the assignee with this display name.
    #[must_use]
    pub fn is_assigned_to(&self, user_name: &str) -> bool {
        self.assignments.iter().any(|a| a.user_name == user_name)
    }
}
