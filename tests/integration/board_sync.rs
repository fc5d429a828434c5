//! Integration tests for the board controller over HTTP.
//!
//! Each test drives a [`Board`] through the real gateway against the
//! in-process dev server, and checks that every saved change shows up in
//! the reloaded listing and the derived view.
//!
//! Verification command: `cargo test --test board_sync`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use taskboard::board::{AssignmentChoice, Board, BoardError, TaskForm};
use taskboard::gateway::http::HttpGateway;
use taskboard::tasks::BoardKind;
use taskboard_devserver::store::Database;
use taskboard_proto::api::{AssignmentMode, CreateTaskRequest, TaskDraft};
use taskboard_proto::assignment::AssignmentStatus;
use taskboard_proto::ids::{TaskId, UserId};
use taskboard_proto::task::Priority;

// =============================================================================
// Test helpers
// =============================================================================

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

/// Starts a dev server and returns a loaded board plus the server database.
async fn setup(kind: BoardKind) -> (Board<HttpGateway>, Arc<Database>) {
    let db = Arc::new(Database::default());
    let (addr, _handle) =
        taskboard_devserver::api::start_server_with_state("127.0.0.1:0", Arc::clone(&db))
            .await
            .expect("start dev server");
    let gateway = Arc::new(HttpGateway::new(&format!("http://{addr}")).expect("valid url"));
    let mut board = Board::new(gateway, kind, Duration::from_millis(100));
    board.load().await.expect("initial load");
    (board, db)
}

/// Inserts a task directly on the server, assigned to `users` in order.
async fn seed_task(db: &Database, title: &str, users: &[u64]) -> TaskId {
    let created = db
        .create_task(CreateTaskRequest {
            task: TaskDraft {
                title: title.to_string(),
                description: String::new(),
                content: String::new(),
                priority: Priority::Medium,
                date: day(),
                task_type: None,
                company: None,
            },
            assignment: AssignmentMode::None,
        })
        .await
        .unwrap();
    for &user in users {
        db.add_assignment(created.id(), UserId(user)).await.unwrap();
    }
    created.id()
}

fn group_names(board: &Board<HttpGateway>) -> Vec<(String, Vec<TaskId>)> {
    let snapshot = board.snapshot();
    board
        .view(&snapshot, day())
        .groups
        .iter()
        .map(|g| (g.user_name.clone(), g.tasks.iter().map(|t| t.id()).collect()))
        .collect()
}

// =============================================================================
// Create / edit / delete
// =============================================================================

#[tokio::test]
async fn created_task_surfaces_after_reload() {
    let (mut board, _db) = setup(BoardKind::Today).await;

    let mut form = TaskForm::new(day());
    form.title = "  Campaign X ".to_string();
    form.priority = Priority::High;
    let id = board.create(&form).await.unwrap();

    let task = board.store().find_task(id).expect("task in listing");
    assert_eq!(task.task.title, "Campaign X");
    assert_eq!(task.task.priority, Priority::High);
    assert_eq!(task.task.priority.as_str(), "alta");
    assert_eq!(task.task.date, day());

    let snapshot = board.snapshot();
    assert_eq!(board.view(&snapshot, day()).unassigned.len(), 1);
    let tomorrow = day().succ_opt().unwrap();
    assert!(board.view(&snapshot, tomorrow).tasks.is_empty());
}

#[tokio::test]
async fn manual_assignment_lands_in_that_users_group() {
    let (mut board, _db) = setup(BoardKind::All).await;

    let mut form = TaskForm::new(day());
    form.title = "Post".to_string();
    form.assignment = AssignmentChoice::Manual(Some(UserId(3)));
    let id = board.create(&form).await.unwrap();

    assert_eq!(group_names(&board), vec![("Eva".to_string(), vec![id])]);
    assert!(board.state().is_user_expanded("Eva"));
}

#[tokio::test]
async fn delete_removes_the_task_from_every_group() {
    let (mut board, db) = setup(BoardKind::All).await;
    let shared = seed_task(&db, "Shared", &[1, 2, 3]).await;
    let other = seed_task(&db, "Other", &[1]).await;
    board.refresh().await.unwrap();

    assert_eq!(
        group_names(&board),
        vec![
            ("Ana".to_string(), vec![shared, other]),
            ("Luis".to_string(), vec![shared]),
            ("Eva".to_string(), vec![shared]),
        ]
    );

    board.delete(shared).await.unwrap();
    assert_eq!(group_names(&board), vec![("Ana".to_string(), vec![other])]);
    assert!(board.store().find_task(shared).is_none());
}

#[tokio::test]
async fn only_the_latest_edit_target_is_saved() {
    let (mut board, db) = setup(BoardKind::All).await;
    let first = seed_task(&db, "First", &[]).await;
    let second = seed_task(&db, "Second", &[]).await;
    board.refresh().await.unwrap();

    board.begin_edit(first).unwrap();
    let mut form = board.begin_edit(second).unwrap();
    assert_eq!(board.state().editing(), Some(second));

    form.title = "Second, revised".to_string();
    board.save_edit(&form).await.unwrap();

    assert_eq!(board.state().editing(), None);
    let titles: Vec<_> = db.list_tasks().await.into_iter().map(|t| t.task.title).collect();
    assert_eq!(titles, vec!["First", "Second, revised"]);
}

#[tokio::test]
async fn rejected_save_keeps_the_listing_and_shows_the_server_message() {
    let (mut board, db) = setup(BoardKind::All).await;
    let id = seed_task(&db, "Keep me", &[]).await;
    board.refresh().await.unwrap();
    let before = board.store().generation();

    // Removed by another client in the meantime.
    db.delete_task(id).await.unwrap();
    let err = board.delete(id).await.unwrap_err();

    assert!(matches!(err, BoardError::Network(_)));
    let alert = board.alert().expect("alert raised");
    assert_eq!(alert.message, format!("task {id} not found"));
    assert!(alert.retry.is_some());
    assert_eq!(board.store().generation(), before);
    assert!(board.store().find_task(id).is_some());
}

// =============================================================================
// Assignments
// =============================================================================

#[tokio::test]
async fn advancing_status_moves_the_task_onto_the_review_board() {
    let (mut board, db) = setup(BoardKind::InReview).await;
    let id = seed_task(&db, "Reel", &[2]).await;
    board.refresh().await.unwrap();
    assert!(group_names(&board).is_empty());

    let assignment = board.store().find_task(id).unwrap().assignments[0].id;
    board.advance_status(assignment).await.unwrap();

    assert_eq!(
        board.store().find_assignment(assignment).unwrap().status,
        AssignmentStatus::InReview
    );
    assert_eq!(group_names(&board), vec![("Luis".to_string(), vec![id])]);
    let snapshot = board.snapshot();
    assert_eq!(board.view(&snapshot, day()).counts.in_review, 1);
}

#[tokio::test]
async fn reassign_moves_the_task_to_the_new_owner() {
    let (mut board, db) = setup(BoardKind::All).await;
    let id = seed_task(&db, "Story", &[1, 2]).await;
    board.refresh().await.unwrap();
    let luis = board.store().find_task(id).unwrap().assignments[1].id;

    board.begin_reassign(id, luis).unwrap();
    board.select_reassign_target(UserId(3));
    board.confirm_reassign().await.unwrap();

    assert!(board.state().reassigning().is_none());
    assert_eq!(
        group_names(&board),
        vec![
            ("Ana".to_string(), vec![id]),
            ("Eva".to_string(), vec![id]),
        ]
    );
    assert!(board.store().find_assignment(luis).is_none());
}

#[tokio::test]
async fn confirming_without_a_target_changes_nothing() {
    let (mut board, db) = setup(BoardKind::All).await;
    let id = seed_task(&db, "Story", &[1]).await;
    board.refresh().await.unwrap();
    let assignment = board.store().find_task(id).unwrap().assignments[0].id;
    let generation = board.store().generation();

    board.begin_reassign(id, assignment).unwrap();
    assert_eq!(board.confirm_reassign().await.unwrap_err(), BoardError::NoTarget);

    assert_eq!(board.store().generation(), generation);
    assert_eq!(db.list_tasks().await[0].assignments[0].id, assignment);
    assert!(board.alert().is_none());
}

#[tokio::test]
async fn reassigning_to_a_current_assignee_alerts_verbatim() {
    let (mut board, db) = setup(BoardKind::All).await;
    let id = seed_task(&db, "Story", &[1, 2]).await;
    board.refresh().await.unwrap();
    let ana = board.store().find_task(id).unwrap().assignments[0].id;

    board.begin_reassign(id, ana).unwrap();
    board.select_reassign_target(UserId(2));
    assert!(board.confirm_reassign().await.is_err());

    assert_eq!(
        board.alert().map(|a| a.message.clone()),
        Some(format!("user 2 is already assigned to task {id}"))
    );
    // The selector stays open to pick someone else.
    assert!(board.state().reassigning().is_some());
    assert_eq!(db.list_tasks().await[0].assignments.len(), 2);
}

// =============================================================================
// Filters
// =============================================================================

#[tokio::test]
async fn filters_apply_to_the_reloaded_listing() {
    let (mut board, db) = setup(BoardKind::All).await;
    seed_task(&db, "Summer reel", &[1]).await;
    let post = seed_task(&db, "Winter post", &[2]).await;
    board.refresh().await.unwrap();

    board.state_mut().filter.search = Some("POST".to_string());
    assert_eq!(group_names(&board), vec![("Luis".to_string(), vec![post])]);

    board.state_mut().filter.search = None;
    board.state_mut().filter.assignee = Some("Ana".to_string());
    let names: Vec<_> = group_names(&board).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["Ana"]);
}
