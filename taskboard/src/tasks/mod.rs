//! Derived task views.
//!
//! Pure functions over a listing snapshot: scoping to a board kind,
//! filtering by search/priority/assignee, grouping by assignee and
//! counting assignment statuses. Nothing here is stored; every view is
//! recomputed from the listing so it can never drift from it.

pub mod filter;
pub mod group;

pub use filter::{BoardKind, TaskFilter, filter_tasks};
pub use group::{AssigneeGroup, StatusCounts, assignee_names, group_by_assignee, unassigned};
