//! REST handlers and server startup.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, put};
use axum::{Json, Router};
use taskboard_proto::api::{
    ApiErrorBody, AssignmentPatch, CreateTaskRequest, DescriptionPatch, ReassignRequest, TaskDraft,
};
use taskboard_proto::assignment::Assignment;
use taskboard_proto::catalog::{Company, TaskType, User};
use taskboard_proto::ids::{AssignmentId, TaskId};
use taskboard_proto::task::{Task, TaskWithAssignments};

use crate::store::{Database, StoreError};

/// A [`StoreError`] rendered as an HTTP error with an [`ApiErrorBody`].
#[derive(Debug)]
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self.0 {
            StoreError::TaskNotFound(_) | StoreError::AssignmentNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            StoreError::UnknownUser(_)
            | StoreError::UnknownTaskType(_)
            | StoreError::UnknownCompany(_)
            | StoreError::EmptyTitle
            | StoreError::EmptyPatch
            | StoreError::AlreadyAssigned { .. }
            | StoreError::NoUsers => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(status = status.as_u16(), error = %self.0, "request rejected");
        let body = ApiErrorBody {
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type Db = State<Arc<Database>>;

async fn list_tasks(State(db): Db) -> Json<Vec<TaskWithAssignments>> {
    Json(db.list_tasks().await)
}

async fn list_types(State(db): Db) -> Json<Vec<TaskType>> {
    Json(db.types().await)
}

async fn list_companies(State(db): Db) -> Json<Vec<Company>> {
    Json(db.companies().await)
}

async fn list_users(State(db): Db) -> Json<Vec<User>> {
    Json(db.users().await)
}

async fn create_task(
    State(db): Db,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskWithAssignments>), ApiError> {
    let created = db.create_task(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_task(
    State(db): Db,
    Path(id): Path<TaskId>,
    Json(draft): Json<TaskDraft>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(db.update_task(id, draft).await?))
}

async fn update_description(
    State(db): Db,
    Path(id): Path<TaskId>,
    Json(body): Json<DescriptionPatch>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(db.update_description(id, body.description).await?))
}

async fn delete_task(State(db): Db, Path(id): Path<TaskId>) -> Result<StatusCode, ApiError> {
    db.delete_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_assignment(
    State(db): Db,
    Path(id): Path<AssignmentId>,
    Json(patch): Json<AssignmentPatch>,
) -> Result<Json<Assignment>, ApiError> {
    Ok(Json(db.update_assignment(id, patch).await?))
}

async fn reassign(
    State(db): Db,
    Path(id): Path<AssignmentId>,
    Json(body): Json<ReassignRequest>,
) -> Result<Json<Assignment>, ApiError> {
    Ok(Json(db.reassign(id, body.user_id).await?))
}

/// The API routes over `db`.
pub fn router(db: Arc<Database>) -> Router {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
        .route("/api/tasks/{id}/description", patch(update_description))
        .route("/api/assignments/{id}", patch(update_assignment))
        .route("/api/assignments/{id}/reassign", delete(reassign))
        .route("/api/types", get(list_types))
        .route("/api/companies", get(list_companies))
        .route("/api/users", get(list_users))
        .with_state(db)
}

/// Starts the server with the default seed data and returns the bound
/// address and a join handle.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(Database::default())).await
}

/// Starts the server over a pre-built [`Database`].
///
/// Tests keep their own `Arc` to inspect or seed the data directly.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    db: Arc<Database>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(db);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "dev server error");
        }
    });

    Ok((bound_addr, handle))
}
