//! HTTP gateway backed by `reqwest`.
//!
//! Speaks plain JSON to the backend. Non-success responses are turned into
//! [`NetworkError::Status`], carrying the server's `ApiErrorBody` message
//! when one is present so the board can show it verbatim.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use taskboard_proto::api::{
    ApiErrorBody, AssignmentPatch, CreateTaskRequest, DescriptionPatch, ReassignRequest, TaskDraft,
};
use taskboard_proto::assignment::Assignment;
use taskboard_proto::catalog::{Company, TaskType, User};
use taskboard_proto::ids::{AssignmentId, TaskId, UserId};
use taskboard_proto::task::{Task, TaskWithAssignments};
use url::Url;

use super::{Gateway, NetworkError};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// REST client for the task board endpoints.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
}

impl HttpGateway {
    /// Creates a gateway for the backend at `base_url` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, NetworkError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a gateway with a custom per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidUrl`] if `base_url` does not parse, or
    /// [`NetworkError::Transport`] if the HTTP client cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, NetworkError> {
        // Url::join drops the last path segment unless the base ends in '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized).map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::Transport(e.to_string()))?;
        Ok(Self { client, base })
    }

    /// The normalized base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, NetworkError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;
        tracing::debug!(%method, %url, "gateway request");
        Ok(self.client.request(method, url))
    }

    /// Sends the request and maps transport failures and non-2xx statuses.
    async fn execute(&self, builder: RequestBuilder, path: &str) -> Result<Response, NetworkError> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(path, error = %e, "gateway request failed");
            NetworkError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.message)
            .ok()
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            });
        tracing::warn!(path, status = status.as_u16(), ?message, "gateway error status");
        Err(NetworkError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, NetworkError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| NetworkError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| NetworkError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, NetworkError> {
        let builder = self.request(Method::GET, path)?;
        let response = self.execute(builder, path).await?;
        Self::decode(response).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, NetworkError>
    where
        B: serde::Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method, path)?.json(body);
        let response = self.execute(builder, path).await?;
        Self::decode(response).await
    }
}

impl Gateway for HttpGateway {
    async fn list_tasks(&self) -> Result<Vec<TaskWithAssignments>, NetworkError> {
        self.get_json("api/tasks").await
    }

    async fn list_types(&self) -> Result<Vec<TaskType>, NetworkError> {
        self.get_json("api/types").await
    }

    async fn list_companies(&self) -> Result<Vec<Company>, NetworkError> {
        self.get_json("api/companies").await
    }

    async fn list_users(&self) -> Result<Vec<User>, NetworkError> {
        self.get_json("api/users").await
    }

    async fn create_task(
        &self,
        request: &CreateTaskRequest,
    ) -> Result<TaskWithAssignments, NetworkError> {
        self.send_json(Method::POST, "api/tasks", request).await
    }

    async fn update_task(&self, id: TaskId, draft: &TaskDraft) -> Result<Task, NetworkError> {
        self.send_json(Method::PUT, &format!("api/tasks/{id}"), draft)
            .await
    }

    async fn update_description(
        &self,
        id: TaskId,
        description: &str,
    ) -> Result<Task, NetworkError> {
        let body = DescriptionPatch {
            description: description.to_string(),
        };
        self.send_json(Method::PATCH, &format!("api/tasks/{id}/description"), &body)
            .await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), NetworkError> {
        let path = format!("api/tasks/{id}");
        let builder = self.request(Method::DELETE, &path)?;
        self.execute(builder, &path).await?;
        Ok(())
    }

    async fn update_assignment(
        &self,
        id: AssignmentId,
        patch: &AssignmentPatch,
    ) -> Result<Assignment, NetworkError> {
        self.send_json(Method::PATCH, &format!("api/assignments/{id}"), patch)
            .await
    }

    async fn reassign(&self, id: AssignmentId, user: UserId) -> Result<Assignment, NetworkError> {
        let body = ReassignRequest { user_id: user };
        self.send_json(
            Method::DELETE,
            &format!("api/assignments/{id}/reassign"),
            &body,
        )
        .await
    }
}
