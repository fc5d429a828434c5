//! Integration tests for the HTTP gateway against the in-process dev server.
//!
//! Every REST endpoint is exercised once on its happy path, plus the error
//! statuses whose server message must reach the caller unchanged.
//!
//! Verification command: `cargo test --test gateway_http`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::NaiveDate;
use taskboard::gateway::http::HttpGateway;
use taskboard::gateway::{Gateway, NetworkError};
use taskboard_devserver::store::Database;
use taskboard_proto::api::{AssignmentMode, AssignmentPatch, CreateTaskRequest, TaskDraft};
use taskboard_proto::assignment::AssignmentStatus;
use taskboard_proto::ids::{CompanyId, TaskId, TaskTypeId, UserId};
use taskboard_proto::task::Priority;

// =============================================================================
// Test helpers
// =============================================================================

/// Starts a dev server on an ephemeral port and returns a gateway to it
/// plus the server's database for direct inspection.
async fn start() -> (HttpGateway, Arc<Database>) {
    let db = Arc::new(Database::default());
    let (addr, _handle) =
        taskboard_devserver::api::start_server_with_state("127.0.0.1:0", Arc::clone(&db))
            .await
            .expect("start dev server");
    let gateway = HttpGateway::new(&format!("http://{addr}")).expect("valid url");
    (gateway, db)
}

fn draft(title: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        description: "brief".to_string(),
        content: "copy".to_string(),
        priority: Priority::Medium,
        date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        task_type: Some(TaskTypeId(1)),
        company: Some(CompanyId(2)),
    }
}

fn create(title: &str, assignment: AssignmentMode) -> CreateTaskRequest {
    CreateTaskRequest {
        task: draft(title),
        assignment,
    }
}

fn expect_status(err: NetworkError, status: u16, message: &str) {
    assert_eq!(err.status(), Some(status), "unexpected error: {err}");
    assert_eq!(err.server_message(), Some(message));
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn catalog_endpoints_return_seed_data() {
    let (gateway, _db) = start().await;

    let types: Vec<_> = gateway
        .list_types()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    let companies: Vec<_> = gateway
        .list_companies()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    let users = gateway.list_users().await.unwrap();

    assert_eq!(types, vec!["Reel", "Post", "Story"]);
    assert_eq!(companies, vec!["Acme", "Globex"]);
    assert_eq!(users.len(), 3);
    assert_eq!(users[0].id, UserId(1));
    assert_eq!(users[0].name, "Ana");
}

// =============================================================================
// Tasks
// =============================================================================

#[tokio::test]
async fn create_and_list_round_trip() {
    let (gateway, _db) = start().await;
    assert!(gateway.list_tasks().await.unwrap().is_empty());

    let created = gateway
        .create_task(&create(
            "Campaign X",
            AssignmentMode::Manual { user_id: UserId(2) },
        ))
        .await
        .unwrap();
    assert_eq!(created.task.title, "Campaign X");
    assert_eq!(created.assignments.len(), 1);
    assert_eq!(created.assignments[0].user_name, "Luis");
    assert_eq!(created.assignments[0].status, AssignmentStatus::Pending);

    let listing = gateway.list_tasks().await.unwrap();
    assert_eq!(listing, vec![created]);
}

#[tokio::test]
async fn random_assignment_picks_a_seeded_user() {
    let (gateway, _db) = start().await;
    let created = gateway
        .create_task(&create("Story", AssignmentMode::Random))
        .await
        .unwrap();
    assert_eq!(created.assignments.len(), 1);
    assert!(["Ana", "Luis", "Eva"].contains(&created.assignments[0].user_name.as_str()));
}

#[tokio::test]
async fn empty_title_is_unprocessable_with_server_message() {
    let (gateway, db) = start().await;
    let err = gateway
        .create_task(&create("   ", AssignmentMode::None))
        .await
        .unwrap_err();
    expect_status(err, 422, "title must not be empty");
    assert!(db.list_tasks().await.is_empty());
}

#[tokio::test]
async fn manual_assignment_to_unknown_user_is_rejected() {
    let (gateway, _db) = start().await;
    let err = gateway
        .create_task(&create("Post", AssignmentMode::Manual { user_id: UserId(99) }))
        .await
        .unwrap_err();
    expect_status(err, 422, "user 99 does not exist");
}

#[tokio::test]
async fn update_task_replaces_every_field() {
    let (gateway, _db) = start().await;
    let created = gateway
        .create_task(&create("Draft", AssignmentMode::None))
        .await
        .unwrap();

    let mut changed = draft("Final");
    changed.priority = Priority::High;
    changed.description = String::new();
    changed.task_type = None;
    let updated = gateway.update_task(created.id(), &changed).await.unwrap();

    assert_eq!(updated.id, created.id());
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.priority, Priority::High);
    assert_eq!(updated.description, "");
    assert_eq!(updated.task_type, None);
}

#[tokio::test]
async fn description_patch_changes_only_the_description() {
    let (gateway, _db) = start().await;
    let created = gateway
        .create_task(&create("Reel", AssignmentMode::None))
        .await
        .unwrap();

    let updated = gateway
        .update_description(created.id(), "new brief")
        .await
        .unwrap();
    assert_eq!(updated.description, "new brief");
    assert_eq!(updated.title, "Reel");
    assert_eq!(updated.content, "copy");
}

#[tokio::test]
async fn delete_removes_task_and_second_delete_is_not_found() {
    let (gateway, db) = start().await;
    let created = gateway
        .create_task(&create("Gone", AssignmentMode::Random))
        .await
        .unwrap();

    gateway.delete_task(created.id()).await.unwrap();
    assert!(db.list_tasks().await.is_empty());

    let err = gateway.delete_task(created.id()).await.unwrap_err();
    expect_status(err, 404, &format!("task {} not found", created.id()));
}

#[tokio::test]
async fn updating_a_missing_task_is_not_found() {
    let (gateway, _db) = start().await;
    let err = gateway
        .update_task(TaskId(42), &draft("Nope"))
        .await
        .unwrap_err();
    expect_status(err, 404, "task 42 not found");
}

// =============================================================================
// Assignments
// =============================================================================

#[tokio::test]
async fn assignment_patch_updates_status_and_detail_independently() {
    let (gateway, _db) = start().await;
    let created = gateway
        .create_task(&create("Post", AssignmentMode::Manual { user_id: UserId(1) }))
        .await
        .unwrap();
    let id = created.assignments[0].id;

    let reviewed = gateway
        .update_assignment(id, &AssignmentPatch::status(AssignmentStatus::InReview))
        .await
        .unwrap();
    assert_eq!(reviewed.status, AssignmentStatus::InReview);
    assert_eq!(reviewed.detail, "");

    let noted = gateway
        .update_assignment(id, &AssignmentPatch::detail("cut to 30s"))
        .await
        .unwrap();
    assert_eq!(noted.status, AssignmentStatus::InReview);
    assert_eq!(noted.detail, "cut to 30s");
}

#[tokio::test]
async fn empty_assignment_patch_is_unprocessable() {
    let (gateway, _db) = start().await;
    let created = gateway
        .create_task(&create("Post", AssignmentMode::Manual { user_id: UserId(1) }))
        .await
        .unwrap();
    let err = gateway
        .update_assignment(created.assignments[0].id, &AssignmentPatch::default())
        .await
        .unwrap_err();
    expect_status(err, 422, "nothing to update");
}

#[tokio::test]
async fn reassign_replaces_the_assignment() {
    let (gateway, _db) = start().await;
    let created = gateway
        .create_task(&create("Reel", AssignmentMode::Manual { user_id: UserId(1) }))
        .await
        .unwrap();
    let old = &created.assignments[0];
    gateway
        .update_assignment(old.id, &AssignmentPatch::detail("half done"))
        .await
        .unwrap();

    let new = gateway.reassign(old.id, UserId(3)).await.unwrap();
    assert_ne!(new.id, old.id);
    assert_eq!(new.task_id, created.id());
    assert_eq!(new.user_name, "Eva");
    assert_eq!(new.status, AssignmentStatus::Pending);
    assert_eq!(new.detail, "");

    let listing = gateway.list_tasks().await.unwrap();
    assert_eq!(listing[0].assignments, vec![new]);
}

#[tokio::test]
async fn reassign_to_a_current_assignee_is_rejected() {
    let (gateway, db) = start().await;
    let created = gateway
        .create_task(&create("Reel", AssignmentMode::Manual { user_id: UserId(1) }))
        .await
        .unwrap();
    db.add_assignment(created.id(), UserId(2)).await.unwrap();

    let err = gateway
        .reassign(created.assignments[0].id, UserId(2))
        .await
        .unwrap_err();
    expect_status(
        err,
        422,
        &format!("user 2 is already assigned to task {}", created.id()),
    );
    assert_eq!(db.list_tasks().await[0].assignments.len(), 2);
}

// =============================================================================
// Base URL handling
// =============================================================================

#[tokio::test]
async fn base_url_with_trailing_slash_resolves_the_same_paths() {
    let db = Arc::new(Database::default());
    let (addr, _handle) = taskboard_devserver::api::start_server_with_state("127.0.0.1:0", db)
        .await
        .expect("start dev server");
    let gateway = HttpGateway::new(&format!("http://{addr}/")).unwrap();
    assert_eq!(gateway.list_users().await.unwrap().len(), 3);
}
