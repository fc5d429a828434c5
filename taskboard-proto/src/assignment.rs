//! Assignments link a task to a user and carry that user's progress.

use serde::{Deserialize, Serialize};

use crate::ids::{AssignmentId, TaskId, UserId};
use crate::task::UnknownVariant;

/// Workflow status of one assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentStatus {
    /// Not started or in progress.
    #[serde(rename = "pendiente")]
    Pending,
    /// Delivered and waiting for review.
    #[serde(rename = "en_revision")]
    InReview,
    /// Reviewed, changes requested.
    #[serde(rename = "correccion")]
    NeedsCorrection,
    /// Done and published.
    #[serde(rename = "publicada")]
    Published,
}

impl AssignmentStatus {
    /// All statuses in workflow order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InReview,
        Self::NeedsCorrection,
        Self::Published,
    ];

    /// The wire value of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::InReview => "en_revision",
            Self::NeedsCorrection => "correccion",
            Self::Published => "publicada",
        }
    }

    /// The following status in workflow order, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Pending => Self::InReview,
            Self::InReview => Self::NeedsCorrection,
            Self::NeedsCorrection => Self::Published,
            Self::Published => Self::Pending,
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownVariant {
                kind: "assignment status",
                value: s.to_string(),
            })
    }
}

/// One assignee's share of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Backend identifier.
    pub id: AssignmentId,
    /// Task this assignment belongs to.
    pub task_id: TaskId,
    /// Assigned user.
    pub user_id: UserId,
    /// Display name of the assigned user.
    pub user_name: String,
    /// Workflow status.
    pub status: AssignmentStatus,
    /// Free-text progress detail.
    #[serde(default)]
    pub detail: String,
}
