//! Integration tests for debounced inline edits.
//!
//! Inline description and progress-detail edits go through the board's
//! field synchronizers to the dev server. A counting gateway wrapper
//! records how many write requests actually left the client.
//!
//! Verification command: `cargo test --test debounced_edits`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use taskboard::board::{Board, RetryAction};
use taskboard::gateway::http::HttpGateway;
use taskboard::gateway::{Gateway, NetworkError};
use taskboard::tasks::BoardKind;
use taskboard_devserver::store::Database;
use taskboard_proto::api::{AssignmentMode, AssignmentPatch, CreateTaskRequest, TaskDraft};
use taskboard_proto::assignment::Assignment;
use taskboard_proto::catalog::{Company, TaskType, User};
use taskboard_proto::ids::{AssignmentId, TaskId, UserId};
use taskboard_proto::task::{Priority, Task, TaskWithAssignments};

// =============================================================================
// Test helpers
// =============================================================================

const WINDOW: Duration = Duration::from_millis(150);

/// Delegates to the HTTP gateway and counts inline-edit writes.
struct Counting {
    inner: HttpGateway,
    descriptions: AtomicUsize,
    details: AtomicUsize,
}

impl Counting {
    fn descriptions(&self) -> usize {
        self.descriptions.load(Ordering::SeqCst)
    }

    fn details(&self) -> usize {
        self.details.load(Ordering::SeqCst)
    }
}

impl Gateway for Counting {
    async fn list_tasks(&self) -> Result<Vec<TaskWithAssignments>, NetworkError> {
        self.inner.list_tasks().await
    }
    async fn list_types(&self) -> Result<Vec<TaskType>, NetworkError> {
        self.inner.list_types().await
    }
    async fn list_companies(&self) -> Result<Vec<Company>, NetworkError> {
        self.inner.list_companies().await
    }
    async fn list_users(&self) -> Result<Vec<User>, NetworkError> {
        self.inner.list_users().await
    }
    async fn create_task(
        &self,
        request: &CreateTaskRequest,
    ) -> Result<TaskWithAssignments, NetworkError> {
        self.inner.create_task(request).await
    }
    async fn update_task(&self, id: TaskId, draft: &TaskDraft) -> Result<Task, NetworkError> {
        self.inner.update_task(id, draft).await
    }
    async fn update_description(
        &self,
        id: TaskId,
        description: &str,
    ) -> Result<Task, NetworkError> {
        self.descriptions.fetch_add(1, Ordering::SeqCst);
        self.inner.update_description(id, description).await
    }
    async fn delete_task(&self, id: TaskId) -> Result<(), NetworkError> {
        self.inner.delete_task(id).await
    }
    async fn update_assignment(
        &self,
        id: AssignmentId,
        patch: &AssignmentPatch,
    ) -> Result<Assignment, NetworkError> {
        if patch.detail.is_some() {
            self.details.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.update_assignment(id, patch).await
    }
    async fn reassign(&self, id: AssignmentId, user: UserId) -> Result<Assignment, NetworkError> {
        self.inner.reassign(id, user).await
    }
}

struct Harness {
    board: Board<Counting>,
    gateway: Arc<Counting>,
    db: Arc<Database>,
}

async fn setup() -> Harness {
    let db = Arc::new(Database::default());
    let (addr, _handle) =
        taskboard_devserver::api::start_server_with_state("127.0.0.1:0", Arc::clone(&db))
            .await
            .expect("start dev server");
    let gateway = Arc::new(Counting {
        inner: HttpGateway::new(&format!("http://{addr}")).expect("valid url"),
        descriptions: AtomicUsize::new(0),
        details: AtomicUsize::new(0),
    });
    let mut board = Board::new(Arc::clone(&gateway), BoardKind::All, WINDOW);
    board.load().await.expect("initial load");
    Harness { board, gateway, db }
}

async fn seed_task(db: &Database, title: &str, user: Option<u64>) -> TaskWithAssignments {
    db.create_task(CreateTaskRequest {
        task: TaskDraft {
            title: title.to_string(),
            description: "initial".to_string(),
            content: String::new(),
            priority: Priority::Low,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            task_type: None,
            company: None,
        },
        assignment: user.map_or(AssignmentMode::None, |u| AssignmentMode::Manual {
            user_id: UserId(u),
        }),
    })
    .await
    .unwrap()
}

/// Drains sync events until at least `expected` arrived or two seconds pass.
async fn wait_for_events(board: &mut Board<Counting>, expected: usize) -> usize {
    let mut seen = 0;
    for _ in 0..100 {
        seen += board.process_sync_events().await;
        if seen >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    seen
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn rapid_description_edits_send_one_request_with_the_last_value() {
    let Harness {
        mut board,
        gateway,
        db,
    } = setup().await;
    let task = seed_task(&db, "Reel", None).await;
    board.refresh().await.unwrap();

    for text in ["B", "Br", "Bri", "Brie", "Brief"] {
        board.edit_description(task.id(), text.to_string());
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(board.is_description_pending(task.id()));
    assert_eq!(gateway.descriptions(), 0);

    assert_eq!(wait_for_events(&mut board, 1).await, 1);
    assert_eq!(gateway.descriptions(), 1);
    assert_eq!(db.list_tasks().await[0].task.description, "Brief");

    // The saved edit triggers a reload, so the board shows the new text.
    let shown = board.store().find_task(task.id()).unwrap();
    assert_eq!(shown.task.description, "Brief");
    assert!(!board.is_description_unsaved(task.id()));

    // Nothing else arrives later.
    tokio::time::sleep(WINDOW * 2).await;
    assert_eq!(board.process_sync_events().await, 0);
    assert_eq!(gateway.descriptions(), 1);
}

#[tokio::test]
async fn edits_to_different_tasks_are_debounced_independently() {
    let Harness {
        mut board,
        gateway,
        db,
    } = setup().await;
    let first = seed_task(&db, "First", None).await;
    let second = seed_task(&db, "Second", None).await;
    board.refresh().await.unwrap();

    board.edit_description(first.id(), "one".to_string());
    board.edit_description(second.id(), "tw".to_string());
    board.edit_description(second.id(), "two".to_string());

    assert_eq!(wait_for_events(&mut board, 2).await, 2);
    assert_eq!(gateway.descriptions(), 2);
    let descriptions: Vec<_> = db
        .list_tasks()
        .await
        .into_iter()
        .map(|t| t.task.description)
        .collect();
    assert_eq!(descriptions, vec!["one", "two"]);
}

#[tokio::test]
async fn progress_detail_edits_are_debounced() {
    let Harness {
        mut board,
        gateway,
        db,
    } = setup().await;
    let task = seed_task(&db, "Post", Some(1)).await;
    let assignment = task.assignments[0].id;
    board.refresh().await.unwrap();

    board.edit_detail(assignment, "draft".to_string());
    board.edit_detail(assignment, "draft sent".to_string());

    assert_eq!(wait_for_events(&mut board, 1).await, 1);
    assert_eq!(gateway.details(), 1);
    assert_eq!(
        board.store().find_assignment(assignment).unwrap().detail,
        "draft sent"
    );
}

#[tokio::test]
async fn leaving_the_editor_flushes_without_waiting() {
    let Harness {
        mut board,
        gateway,
        db,
    } = setup().await;
    let task = seed_task(&db, "Story", None).await;
    board.refresh().await.unwrap();

    board.edit_description(task.id(), "done".to_string());
    assert!(board.flush_description(task.id()).await);
    assert_eq!(gateway.descriptions(), 1);
    assert!(!board.is_description_pending(task.id()));
    assert_eq!(board.process_sync_events().await, 1);

    // The cancelled timer does not send a second request.
    tokio::time::sleep(WINDOW * 2).await;
    assert_eq!(gateway.descriptions(), 1);
    assert!(!board.flush_description(task.id()).await);
}

#[tokio::test]
async fn failed_save_is_marked_unsaved_and_retry_resends_the_value() {
    let Harness {
        mut board,
        gateway,
        db,
    } = setup().await;
    let task = seed_task(&db, "Doomed", None).await;
    board.refresh().await.unwrap();
    db.delete_task(task.id()).await.unwrap();

    board.edit_description(task.id(), "lost".to_string());
    assert_eq!(wait_for_events(&mut board, 1).await, 1);

    assert!(board.is_description_unsaved(task.id()));
    let alert = board.alert().expect("alert raised");
    assert_eq!(
        alert.message,
        format!("description not saved: task {} not found", task.id())
    );
    assert_eq!(
        alert.retry,
        Some(RetryAction::Description {
            task: task.id(),
            value: "lost".to_string(),
        })
    );

    // No automatic retry.
    tokio::time::sleep(WINDOW * 2).await;
    assert_eq!(gateway.descriptions(), 1);

    assert!(board.retry().await.unwrap());
    assert!(!board.is_description_unsaved(task.id()));
    assert_eq!(wait_for_events(&mut board, 1).await, 1);
    assert_eq!(gateway.descriptions(), 2);
    assert!(board.is_description_unsaved(task.id()));
}
