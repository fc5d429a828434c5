//! Board scoping and user filters.

use chrono::NaiveDate;
use taskboard_proto::assignment::AssignmentStatus;
use taskboard_proto::task::{Priority, TaskWithAssignments};

/// Which tasks a board shows before user filters apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardKind {
    /// Tasks scheduled for the client's current local date.
    #[default]
    Today,
    /// Tasks with at least one assignment waiting for review.
    InReview,
    /// Every task in the listing.
    All,
}

impl BoardKind {
    /// Title shown in the board header.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Today => "Tasks of today",
            Self::InReview => "Tasks in review",
            Self::All => "All tasks",
        }
    }

    /// Whether `task` belongs on this board.
    #[must_use]
    pub fn includes(self, task: &TaskWithAssignments, today: NaiveDate) -> bool {
        match self {
            Self::Today => task.task.date == today,
            Self::InReview => task
                .assignments
                .iter()
                .any(|a| a.status == AssignmentStatus::InReview),
            Self::All => true,
        }
    }
}

impl std::fmt::Display for BoardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Today => write!(f, "today"),
            Self::InReview => write!(f, "review"),
            Self::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for BoardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "review" | "in-review" | "in_review" => Ok(Self::InReview),
            "all" => Ok(Self::All),
            other => Err(format!("unknown board view: {other}")),
        }
    }
}

/// User-controlled filter criteria. `None` means "don't filter on this".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    /// Exact priority.
    pub priority: Option<Priority>,
    /// Exact assignee display name.
    pub assignee: Option<String>,
}

impl TaskFilter {
    /// True when no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search_term().is_none() && self.priority.is_none() && self.assignee.is_none()
    }

    /// The trimmed, lowercased search term, if it is non-blank.
    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether `task` passes every set criterion.
    #[must_use]
    pub fn matches(&self, task: &TaskWithAssignments) -> bool {
        if let Some(term) = self.search_term() {
            if !task.task.title.to_lowercase().contains(&term) {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.task.priority != priority {
                return false;
            }
        }
        if let Some(name) = &self.assignee {
            if !task.is_assigned_to(name) {
                return false;
            }
        }
        true
    }

    /// Cycles the priority criterion: none → high → medium → low → none.
    pub fn cycle_priority(&mut self) {
        self.priority = match self.priority {
            None => Some(Priority::High),
            Some(Priority::High) => Some(Priority::Medium),
            Some(Priority::Medium) => Some(Priority::Low),
            Some(Priority::Low) => None,
        };
    }
}

/// Tasks on `kind`'s board that pass `filter`, in listing order.
#[must_use]
pub fn filter_tasks<'a>(
    tasks: &'a [TaskWithAssignments],
    filter: &TaskFilter,
    kind: BoardKind,
    today: NaiveDate,
) -> Vec<&'a TaskWithAssignments> {
    tasks
        .iter()
        .filter(|t| kind.includes(t, today) && filter.matches(t))
        .collect()
}
