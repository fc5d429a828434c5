//! Remote data gateway for the task board.
//!
//! Defines the [`Gateway`] trait covering every REST call the board makes.
//! Concrete implementations:
//! - [`http::HttpGateway`]: `reqwest`-based client for the real backend
//!
//! No retries, cancellation or in-flight de-duplication happen at this
//! layer. A failed call surfaces immediately to the caller, which decides
//! how to show it.

pub mod http;

use std::future::Future;

use taskboard_proto::api::{AssignmentPatch, CreateTaskRequest, TaskDraft};
use taskboard_proto::assignment::Assignment;
use taskboard_proto::catalog::{Company, TaskType, User};
use taskboard_proto::ids::{AssignmentId, TaskId, UserId};
use taskboard_proto::task::{Task, TaskWithAssignments};

/// Errors returned by gateway calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// The request never completed (connection refused, timeout, ...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}{}", message_suffix(.message))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message reported by the server, if any.
        message: Option<String>,
    },

    /// The server answered 2xx but the body could not be parsed.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The endpoint URL could not be built from the configured base URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl NetworkError {
    /// HTTP status code, when the server answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server's own message, passed through verbatim.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Async access to the task, assignment and catalog endpoints.
///
/// Every method resolves to the parsed response body or a [`NetworkError`].
pub trait Gateway: Send + Sync + 'static {
    /// Fetches all tasks with their nested assignments.
    fn list_tasks(&self)
    -> impl Future<Output = Result<Vec<TaskWithAssignments>, NetworkError>> + Send;

    /// Fetches the task type catalog.
    fn list_types(&self) -> impl Future<Output = Result<Vec<TaskType>, NetworkError>> + Send;

    /// Fetches the company catalog.
    fn list_companies(&self) -> impl Future<Output = Result<Vec<Company>, NetworkError>> + Send;

    /// Fetches the users that can be assigned tasks.
    fn list_users(&self) -> impl Future<Output = Result<Vec<User>, NetworkError>> + Send;

    /// Creates a task, optionally assigning it.
    fn create_task(
        &self,
        request: &CreateTaskRequest,
    ) -> impl Future<Output = Result<TaskWithAssignments, NetworkError>> + Send;

    /// Replaces all editable fields of a task.
    fn update_task(
        &self,
        id: TaskId,
        draft: &TaskDraft,
    ) -> impl Future<Output = Result<Task, NetworkError>> + Send;

    /// Replaces only the description of a task.
    fn update_description(
        &self,
        id: TaskId,
        description: &str,
    ) -> impl Future<Output = Result<Task, NetworkError>> + Send;

    /// Deletes a task.
    fn delete_task(&self, id: TaskId) -> impl Future<Output = Result<(), NetworkError>> + Send;

    /// Updates status and/or detail of one assignment.
    fn update_assignment(
        &self,
        id: AssignmentId,
        patch: &AssignmentPatch,
    ) -> impl Future<Output = Result<Assignment, NetworkError>> + Send;

    /// Removes an assignment and assigns the task to another user instead.
    fn reassign(
        &self,
        id: AssignmentId,
        user: UserId,
    ) -> impl Future<Output = Result<Assignment, NetworkError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_includes_server_message() {
        let err = NetworkError::Status {
            status: 422,
            message: Some("user already assigned".to_string()),
        };
        assert_eq!(err.to_string(), "server returned 422: user already assigned");
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.server_message(), Some("user already assigned"));
    }

    #[test]
    fn status_error_display_without_message() {
        let err = NetworkError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "server returned 500");
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn transport_error_has_no_status() {
        let err = NetworkError::Transport("connection refused".to_string());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "request failed: connection refused");
    }
}
