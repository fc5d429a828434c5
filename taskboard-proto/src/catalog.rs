//! Catalog entities used to populate selectors.

use serde::{Deserialize, Serialize};

use crate::ids::{CompanyId, TaskTypeId, UserId};

/// A kind of task (post, story, video, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskType {
    /// Backend identifier.
    pub id: TaskTypeId,
    /// Display name.
    pub name: String,
}

/// A client company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Backend identifier.
    pub id: CompanyId,
    /// Display name.
    pub name: String,
}

/// A user that can be assigned tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier.
    pub id: UserId,
    /// Display name, as shown in assignee groups.
    pub name: String,
}
