//! Board controller: turns user intents into store calls and keeps the
//! per-board UI state consistent with the listing.
//!
//! Every failure is caught here. The intent returns an error to the caller
//! and also raises an [`Alert`] carrying the action to retry; the listing
//! and the UI state stay as they were before the failed call.

pub mod form;
pub mod state;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use taskboard_proto::api::{CreateTaskRequest, TaskDraft};
use taskboard_proto::assignment::{Assignment, AssignmentStatus};
use taskboard_proto::ids::{AssignmentId, TaskId, UserId};
use taskboard_proto::task::TaskWithAssignments;
use tokio::sync::mpsc;

pub use form::{AssignmentChoice, FormError, TaskForm};
pub use state::{BoardState, Reassignment};

use crate::gateway::{Gateway, NetworkError};
use crate::store::{Catalog, MutationError, Snapshot, TaskStore};
use crate::sync::{
    DescriptionPersist, DescriptionSync, DetailPersist, DetailSync, SyncEvent,
};
use crate::tasks::{
    AssigneeGroup, BoardKind, StatusCounts, assignee_names, filter_tasks, group_by_assignee,
    unassigned,
};

/// Errors returned by board intents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The form did not validate; nothing was sent.
    #[error(transparent)]
    Form(#[from] FormError),
    /// A gateway call failed.
    #[error(transparent)]
    Network(NetworkError),
    /// `save_edit` was called with no task in edit mode.
    #[error("no task is being edited")]
    NotEditing,
    /// `confirm_reassign` was called with no reassignment open.
    #[error("no reassignment in progress")]
    NotReassigning,
    /// The reassignment has no target user yet.
    #[error("select a user before confirming the reassignment")]
    NoTarget,
    /// The task is not in the current listing.
    #[error("task {0} is not on the board")]
    UnknownTask(TaskId),
    /// The assignment is not in the current listing (or not on that task).
    #[error("assignment {0} is not on the board")]
    UnknownAssignment(AssignmentId),
}

/// A failed action that can be re-run from its alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryAction {
    /// Initial load (catalog and listing).
    Load,
    /// Listing reload.
    Refresh,
    /// Task creation.
    Create(CreateTaskRequest),
    /// Full task update.
    SaveEdit {
        /// Edited task.
        id: TaskId,
        /// Validated fields.
        draft: TaskDraft,
    },
    /// Task deletion.
    Delete(TaskId),
    /// Assignment status change.
    SetStatus {
        /// Assignment to change.
        assignment: AssignmentId,
        /// Status to set.
        status: AssignmentStatus,
    },
    /// Reassignment to another user.
    Reassign {
        /// Assignment to move.
        assignment: AssignmentId,
        /// New owner.
        user: UserId,
    },
    /// Debounced description save.
    Description {
        /// Task whose description failed to save.
        task: TaskId,
        /// Value that failed to save.
        value: String,
    },
    /// Debounced progress-detail save.
    Detail {
        /// Assignment whose detail failed to save.
        assignment: AssignmentId,
        /// Value that failed to save.
        value: String,
    },
}

/// Transient error banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Text shown to the user; server messages are passed verbatim.
    pub message: String,
    /// What `retry` re-runs, if anything.
    pub retry: Option<RetryAction>,
}

/// Intents the TUI hands to [`Board::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Load catalog and listing.
    Load,
    /// Reload the listing.
    Refresh,
    /// Create a task from a form.
    Create(TaskForm),
    /// Save the task in edit mode.
    SaveEdit(TaskForm),
    /// Delete a task.
    Delete(TaskId),
    /// Move an assignment to its next status.
    AdvanceStatus(AssignmentId),
    /// Send a pending description edit now (leaving the editor).
    FlushDescription(TaskId),
    /// Send a pending progress-detail edit now (leaving the editor).
    FlushDetail(AssignmentId),
    /// Confirm the open reassignment.
    ConfirmReassign,
    /// Re-run the action behind the current alert.
    Retry,
}

/// One line of the rendered board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row<'a> {
    /// Assignee group header.
    User {
        /// Display name.
        name: String,
        /// Tasks in the group.
        count: usize,
        /// Whether the group's tasks are shown.
        expanded: bool,
    },
    /// Header of the unassigned section.
    Unassigned {
        /// Tasks without assignees.
        count: usize,
    },
    /// A task card, under a user group or the unassigned section.
    Task {
        /// The task.
        task: &'a TaskWithAssignments,
        /// The group owner's assignment on this task.
        assignment: Option<&'a Assignment>,
        /// Whether the card shows its details.
        expanded: bool,
    },
}

/// Everything one render of the board needs, derived from a snapshot.
#[derive(Debug, Clone)]
pub struct BoardView<'a> {
    /// Board scope.
    pub kind: BoardKind,
    /// Tasks after scope and filters, in listing order.
    pub tasks: Vec<&'a TaskWithAssignments>,
    /// Tasks grouped by assignee.
    pub groups: Vec<AssigneeGroup<'a>>,
    /// Tasks without assignees.
    pub unassigned: Vec<&'a TaskWithAssignments>,
    /// Assignment counts per status over `tasks`.
    pub counts: StatusCounts,
    /// Flattened lines honoring expand/collapse state.
    pub rows: Vec<Row<'a>>,
}

/// Controller for one board.
pub struct Board<G: Gateway> {
    store: TaskStore<G>,
    kind: BoardKind,
    state: BoardState,
    descriptions: DescriptionSync<G>,
    details: DetailSync<G>,
    description_events: mpsc::UnboundedReceiver<SyncEvent<TaskId>>,
    detail_events: mpsc::UnboundedReceiver<SyncEvent<AssignmentId>>,
    unsaved_descriptions: HashSet<TaskId>,
    unsaved_details: HashSet<AssignmentId>,
    alert: Option<Alert>,
}

impl<G: Gateway> Board<G> {
    /// Creates a board over `gateway`; inline edits debounce for `window`.
    #[must_use]
    pub fn new(gateway: Arc<G>, kind: BoardKind, window: Duration) -> Self {
        let (descriptions, description_events) =
            DescriptionSync::new(window, DescriptionPersist::new(Arc::clone(&gateway)));
        let (details, detail_events) =
            DetailSync::new(window, DetailPersist::new(Arc::clone(&gateway)));
        Self {
            store: TaskStore::new(gateway),
            kind,
            state: BoardState::new(),
            descriptions,
            details,
            description_events,
            detail_events,
            unsaved_descriptions: HashSet::new(),
            unsaved_details: HashSet::new(),
            alert: None,
        }
    }

    /// Board scope.
    #[must_use]
    pub const fn kind(&self) -> BoardKind {
        self.kind
    }

    /// Switches the board scope.
    pub fn set_kind(&mut self, kind: BoardKind) {
        self.kind = kind;
    }

    /// The UI state.
    #[must_use]
    pub const fn state(&self) -> &BoardState {
        &self.state
    }

    /// Mutable UI state (expand/collapse, filters, edit mode).
    pub fn state_mut(&mut self) -> &mut BoardState {
        &mut self.state
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &TaskStore<G> {
        &self.store
    }

    /// Current listing snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Cached selector catalog.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        self.store.catalog()
    }

    /// The current alert, if any.
    #[must_use]
    pub const fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    /// Hides the alert without retrying.
    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Whether a task's description failed to save.
    #[must_use]
    pub fn is_description_unsaved(&self, task: TaskId) -> bool {
        self.unsaved_descriptions.contains(&task)
    }

    /// Whether an assignment's detail failed to save.
    #[must_use]
    pub fn is_detail_unsaved(&self, assignment: AssignmentId) -> bool {
        self.unsaved_details.contains(&assignment)
    }

    /// Whether a description edit is waiting for its debounce window.
    #[must_use]
    pub fn is_description_pending(&self, task: TaskId) -> bool {
        self.descriptions.is_pending(&task)
    }

    /// Number of inline edits not yet sent.
    #[must_use]
    pub fn pending_edits(&self) -> usize {
        self.descriptions.pending_count() + self.details.pending_count()
    }

    /// Derives the render model for `tasks` (normally [`snapshot`](Self::snapshot)).
    #[must_use]
    pub fn view<'a>(&self, tasks: &'a [TaskWithAssignments], today: NaiveDate) -> BoardView<'a> {
        let visible = filter_tasks(tasks, &self.state.filter, self.kind, today);
        let groups = group_by_assignee(&visible);
        let loose = unassigned(&visible);
        let counts = StatusCounts::from_tasks(&visible);

        let mut rows = Vec::new();
        for group in &groups {
            let expanded = self.state.is_user_expanded(&group.user_name);
            rows.push(Row::User {
                name: group.user_name.clone(),
                count: group.tasks.len(),
                expanded,
            });
            if !expanded {
                continue;
            }
            for &task in &group.tasks {
                rows.push(Row::Task {
                    task,
                    assignment: task
                        .assignments
                        .iter()
                        .find(|a| a.user_name == group.user_name),
                    expanded: self.state.is_expanded(task.id()),
                });
            }
        }
        if !loose.is_empty() {
            rows.push(Row::Unassigned { count: loose.len() });
            for &task in &loose {
                rows.push(Row::Task {
                    task,
                    assignment: None,
                    expanded: self.state.is_expanded(task.id()),
                });
            }
        }

        BoardView {
            kind: self.kind,
            tasks: visible,
            groups,
            unassigned: loose,
            counts,
            rows,
        }
    }

    /// Runs one intent.
    ///
    /// # Errors
    ///
    /// Returns whatever the underlying intent method returns.
    pub async fn apply(&mut self, intent: Intent) -> Result<(), BoardError> {
        match intent {
            Intent::Load => self.load().await,
            Intent::Refresh => self.refresh().await,
            Intent::Create(form) => self.create(&form).await.map(|_| ()),
            Intent::SaveEdit(form) => self.save_edit(&form).await,
            Intent::Delete(id) => self.delete(id).await,
            Intent::AdvanceStatus(id) => self.advance_status(id).await,
            Intent::FlushDescription(id) => {
                self.flush_description(id).await;
                Ok(())
            }
            Intent::FlushDetail(id) => {
                self.flush_detail(id).await;
                Ok(())
            }
            Intent::ConfirmReassign => self.confirm_reassign().await,
            Intent::Retry => self.retry().await.map(|_| ()),
        }
    }

    /// Loads the selector catalog and the listing.
    ///
    /// # Errors
    ///
    /// [`BoardError::Network`] if either fetch fails.
    pub async fn load(&mut self) -> Result<(), BoardError> {
        if let Err(err) = self.store.load_catalog().await {
            return Err(self.network_failure(err, RetryAction::Load));
        }
        match self.store.reload().await {
            Ok(_) => {
                self.after_success();
                Ok(())
            }
            Err(err) => Err(self.network_failure(err, RetryAction::Load)),
        }
    }

    /// Reloads the listing.
    ///
    /// # Errors
    ///
    /// [`BoardError::Network`] if the fetch fails.
    pub async fn refresh(&mut self) -> Result<(), BoardError> {
        match self.store.reload().await {
            Ok(_) => {
                self.after_success();
                Ok(())
            }
            Err(err) => Err(self.network_failure(err, RetryAction::Refresh)),
        }
    }

    /// Validates and creates a task.
    ///
    /// # Errors
    ///
    /// [`BoardError::Form`] without any call if the form is invalid,
    /// [`BoardError::Network`] if the create or reload fails.
    pub async fn create(&mut self, form: &TaskForm) -> Result<TaskId, BoardError> {
        let request = form.to_create_request()?;
        self.run_create(request).await
    }

    async fn run_create(&mut self, request: CreateTaskRequest) -> Result<TaskId, BoardError> {
        match self.store.create_task(&request).await {
            Ok(id) => {
                self.after_success();
                Ok(id)
            }
            Err(err) => Err(self.mutation_failure(err, RetryAction::Create(request))),
        }
    }

    /// Puts a task in edit mode and returns its pre-filled form.
    ///
    /// # Errors
    ///
    /// [`BoardError::UnknownTask`] if the task is not on the board.
    pub fn begin_edit(&mut self, id: TaskId) -> Result<TaskForm, BoardError> {
        let task = self.store.find_task(id).ok_or(BoardError::UnknownTask(id))?;
        self.state.begin_edit(id);
        Ok(TaskForm::from_task(&task.task))
    }

    /// Saves the task in edit mode and leaves edit mode on success.
    ///
    /// # Errors
    ///
    /// [`BoardError::NotEditing`] or [`BoardError::Form`] without any call,
    /// [`BoardError::Network`] if the update or reload fails.
    pub async fn save_edit(&mut self, form: &TaskForm) -> Result<(), BoardError> {
        let id = self.state.editing().ok_or(BoardError::NotEditing)?;
        let draft = form.to_draft()?;
        self.run_save_edit(id, draft).await
    }

    async fn run_save_edit(&mut self, id: TaskId, draft: TaskDraft) -> Result<(), BoardError> {
        match self.store.update_task(id, &draft).await {
            Ok(()) => {
                if self.state.editing() == Some(id) {
                    self.state.cancel_edit();
                }
                self.after_success();
                Ok(())
            }
            Err(err) => Err(self.mutation_failure(err, RetryAction::SaveEdit { id, draft })),
        }
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// [`BoardError::Network`] if the delete or reload fails.
    pub async fn delete(&mut self, id: TaskId) -> Result<(), BoardError> {
        let assignments: Vec<AssignmentId> = self
            .store
            .find_task(id)
            .map(|t| t.assignments.iter().map(|a| a.id).collect())
            .unwrap_or_default();
        match self.store.delete_task(id).await {
            Ok(()) => {
                self.discard_inline_edits(id, &assignments);
                self.after_success();
                Ok(())
            }
            Err(err) => {
                // The task is gone even when only the follow-up reload failed.
                if matches!(err, MutationError::Reload(_)) {
                    self.discard_inline_edits(id, &assignments);
                }
                Err(self.mutation_failure(err, RetryAction::Delete(id)))
            }
        }
    }

    /// Drops pending and unsaved inline edits of a deleted task.
    fn discard_inline_edits(&mut self, id: TaskId, assignments: &[AssignmentId]) {
        self.descriptions.cancel(&id);
        self.unsaved_descriptions.remove(&id);
        for assignment in assignments {
            self.details.cancel(assignment);
            self.unsaved_details.remove(assignment);
        }
    }

    /// Sets an assignment's status.
    ///
    /// # Errors
    ///
    /// [`BoardError::Network`] if the patch or reload fails.
    pub async fn set_status(
        &mut self,
        assignment: AssignmentId,
        status: AssignmentStatus,
    ) -> Result<(), BoardError> {
        match self.store.update_assignment_status(assignment, status).await {
            Ok(()) => {
                self.after_success();
                Ok(())
            }
            Err(err) => Err(self.mutation_failure(
                err,
                RetryAction::SetStatus { assignment, status },
            )),
        }
    }

    /// Moves an assignment to the next status in the workflow.
    ///
    /// # Errors
    ///
    /// [`BoardError::UnknownAssignment`] if it is not on the board,
    /// otherwise as [`set_status`](Self::set_status).
    pub async fn advance_status(&mut self, assignment: AssignmentId) -> Result<(), BoardError> {
        let current = self
            .store
            .find_assignment(assignment)
            .ok_or(BoardError::UnknownAssignment(assignment))?;
        self.set_status(assignment, current.status.next()).await
    }

    /// Schedules a debounced save of a task's description.
    pub fn edit_description(&mut self, task: TaskId, value: String) {
        self.unsaved_descriptions.remove(&task);
        self.descriptions.schedule(task, value);
    }

    /// Schedules a debounced save of an assignment's progress detail.
    pub fn edit_detail(&mut self, assignment: AssignmentId, value: String) {
        self.unsaved_details.remove(&assignment);
        self.details.schedule(assignment, value);
    }

    /// Sends a pending description edit now instead of waiting.
    pub async fn flush_description(&self, task: TaskId) -> bool {
        self.descriptions.flush(&task).await
    }

    /// Sends a pending progress-detail edit now instead of waiting.
    pub async fn flush_detail(&self, assignment: AssignmentId) -> bool {
        self.details.flush(&assignment).await
    }

    /// Opens the reassignment selector for one assignment of a task.
    ///
    /// # Errors
    ///
    /// [`BoardError::UnknownTask`] or [`BoardError::UnknownAssignment`] if
    /// the pair is not on the board.
    pub fn begin_reassign(
        &mut self,
        task: TaskId,
        assignment: AssignmentId,
    ) -> Result<(), BoardError> {
        let entry = self.store.find_task(task).ok_or(BoardError::UnknownTask(task))?;
        if !entry.assignments.iter().any(|a| a.id == assignment) {
            return Err(BoardError::UnknownAssignment(assignment));
        }
        self.state.begin_reassign(task, assignment);
        Ok(())
    }

    /// Picks the user that takes over the open reassignment.
    pub fn select_reassign_target(&mut self, user: UserId) {
        self.state.select_target(user);
    }

    /// Closes the reassignment selector.
    pub fn cancel_reassign(&mut self) {
        self.state.cancel_reassign();
    }

    /// Submits the open reassignment.
    ///
    /// # Errors
    ///
    /// [`BoardError::NotReassigning`] or [`BoardError::NoTarget`] without
    /// any call, [`BoardError::Network`] if the call or reload fails.
    pub async fn confirm_reassign(&mut self) -> Result<(), BoardError> {
        let open = self.state.reassigning().ok_or(BoardError::NotReassigning)?;
        let user = open.target.ok_or(BoardError::NoTarget)?;
        self.run_reassign(open.assignment_id, user).await
    }

    async fn run_reassign(
        &mut self,
        assignment: AssignmentId,
        user: UserId,
    ) -> Result<(), BoardError> {
        match self.store.reassign(assignment, user).await {
            Ok(()) => {
                if self
                    .state
                    .reassigning()
                    .is_some_and(|r| r.assignment_id == assignment)
                {
                    self.state.cancel_reassign();
                }
                self.after_success();
                Ok(())
            }
            Err(err) => Err(self.mutation_failure(err, RetryAction::Reassign { assignment, user })),
        }
    }

    /// Re-runs the action behind the current alert.
    ///
    /// Returns `Ok(false)` when there is nothing to retry.
    ///
    /// # Errors
    ///
    /// Whatever the retried action returns.
    pub async fn retry(&mut self) -> Result<bool, BoardError> {
        let Some(action) = self.alert.take().and_then(|a| a.retry) else {
            return Ok(false);
        };
        tracing::info!(?action, "retrying failed action");
        match action {
            RetryAction::Load => self.load().await?,
            RetryAction::Refresh => self.refresh().await?,
            RetryAction::Create(request) => {
                self.run_create(request).await?;
            }
            RetryAction::SaveEdit { id, draft } => self.run_save_edit(id, draft).await?,
            RetryAction::Delete(id) => self.delete(id).await?,
            RetryAction::SetStatus { assignment, status } => {
                self.set_status(assignment, status).await?;
            }
            RetryAction::Reassign { assignment, user } => {
                self.run_reassign(assignment, user).await?;
            }
            RetryAction::Description { task, value } => {
                self.unsaved_descriptions.remove(&task);
                self.descriptions.retry(task, value);
            }
            RetryAction::Detail { assignment, value } => {
                self.unsaved_details.remove(&assignment);
                self.details.retry(assignment, value);
            }
        }
        Ok(true)
    }

    /// Applies outcomes of debounced saves: a saved field reloads the
    /// listing, a failed one is marked unsaved and raises an alert.
    ///
    /// Returns the number of events handled.
    pub async fn process_sync_events(&mut self) -> usize {
        let mut handled = 0;
        let mut saved = false;

        while let Ok(event) = self.description_events.try_recv() {
            handled += 1;
            match event {
                SyncEvent::Saved { key } => {
                    self.unsaved_descriptions.remove(&key);
                    saved = true;
                }
                SyncEvent::Failed { key, value, error } => {
                    self.unsaved_descriptions.insert(key);
                    self.raise(
                        format!("description not saved: {}", alert_message(&error)),
                        Some(RetryAction::Description { task: key, value }),
                    );
                }
            }
        }
        while let Ok(event) = self.detail_events.try_recv() {
            handled += 1;
            match event {
                SyncEvent::Saved { key } => {
                    self.unsaved_details.remove(&key);
                    saved = true;
                }
                SyncEvent::Failed { key, value, error } => {
                    self.unsaved_details.insert(key);
                    self.raise(
                        format!("progress detail not saved: {}", alert_message(&error)),
                        Some(RetryAction::Detail {
                            assignment: key,
                            value,
                        }),
                    );
                }
            }
        }

        if saved {
            // Keeps any alert raised above.
            match self.store.reload().await {
                Ok(_) => self.sync_state_with_listing(),
                Err(err) => {
                    self.network_failure(err, RetryAction::Refresh);
                }
            }
        }
        handled
    }

    fn after_success(&mut self) {
        self.alert = None;
        self.sync_state_with_listing();
    }

    fn sync_state_with_listing(&mut self) {
        let snapshot = self.store.snapshot();
        self.state.prune(&snapshot);
        let names = assignee_names(&snapshot);
        self.state.seed_users(names.iter().map(String::as_str));
    }

    fn raise(&mut self, message: String, retry: Option<RetryAction>) {
        tracing::warn!(%message, "board action failed");
        self.alert = Some(Alert { message, retry });
    }

    fn network_failure(&mut self, err: NetworkError, retry: RetryAction) -> BoardError {
        self.raise(alert_message(&err), Some(retry));
        BoardError::Network(err)
    }

    fn mutation_failure(&mut self, err: MutationError, retry: RetryAction) -> BoardError {
        match err {
            MutationError::Rejected(err) => self.network_failure(err, retry),
            MutationError::Reload(err) => {
                self.raise(
                    format!("saved, but the board could not refresh: {}", alert_message(&err)),
                    Some(RetryAction::Refresh),
                );
                BoardError::Network(err)
            }
        }
    }
}

/// Text for an alert: the server's own message when it sent one.
fn alert_message(err: &NetworkError) -> String {
    err.server_message()
        .map_or_else(|| err.to_string(), ToString::to_string)
}
