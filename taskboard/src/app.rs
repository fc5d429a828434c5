//! Application state and event handling.
//!
//! [`App::handle_key_event`] is synchronous: local state (cursor, expand,
//! filters, inline edit buffers) changes immediately, and anything that
//! needs the backend comes back as an [`Intent`] for the event loop to
//! await. The loop then hands the outcome to [`App::finish_intent`].

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskboard_proto::catalog::User;
use taskboard_proto::ids::{AssignmentId, TaskId};

use crate::board::{AssignmentChoice, Board, BoardError, Intent, Row, TaskForm};
use crate::gateway::Gateway;
use crate::tasks::BoardKind;

/// What keystrokes currently edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Navigation and single-key commands.
    Normal,
    /// Typing the title search.
    Search {
        /// Current search text.
        buffer: String,
    },
    /// Typing the title of a new task.
    NewTask {
        /// Form submitted on Enter.
        form: TaskForm,
    },
    /// Editing the title and priority of an existing task.
    EditTask {
        /// Pre-filled form.
        form: TaskForm,
    },
    /// Editing a task description; every keystroke schedules a save.
    Description {
        /// Task being edited.
        task: TaskId,
        /// Current text.
        buffer: String,
    },
    /// Editing an assignment's progress detail; every keystroke schedules a save.
    Detail {
        /// Assignment being edited.
        assignment: AssignmentId,
        /// Current text.
        buffer: String,
    },
    /// Picking the user that takes over an assignment.
    Reassign {
        /// Highlighted entry in [`App::reassign_candidates`].
        cursor: usize,
    },
}

/// The board line under the cursor, detached from the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// An assignee group header.
    User(String),
    /// The unassigned section header.
    Unassigned,
    /// A task card.
    Task {
        /// The task.
        task: TaskId,
        /// The group owner's assignment, if the card sits under a user.
        assignment: Option<AssignmentId>,
        /// The group owner's name.
        owner: Option<String>,
    },
}

/// Main application state.
pub struct App<G: Gateway> {
    /// Board controller.
    pub board: Board<G>,
    /// Index into the rendered rows.
    pub cursor: usize,
    /// Current input mode.
    pub mode: InputMode,
    /// Local validation message (cleared on the next key).
    pub notice: Option<String>,
    /// Date the "today" board is scoped to.
    pub today: NaiveDate,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl<G: Gateway> App<G> {
    /// Creates the app around a board.
    #[must_use]
    pub const fn new(board: Board<G>, today: NaiveDate) -> Self {
        Self {
            board,
            cursor: 0,
            mode: InputMode::Normal,
            notice: None,
            today,
            should_quit: false,
        }
    }

    /// Moves the "today" board to `today`; returns whether the date changed.
    pub fn set_today(&mut self, today: NaiveDate) -> bool {
        if self.today == today {
            return false;
        }
        self.today = today;
        self.clamp_cursor();
        true
    }

    /// Number of rendered board lines.
    #[must_use]
    pub fn row_count(&self) -> usize {
        let snapshot = self.board.snapshot();
        self.board.view(&snapshot, self.today).rows.len()
    }

    /// The line under the cursor.
    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        let snapshot = self.board.snapshot();
        let view = self.board.view(&snapshot, self.today);
        let row = view.rows.get(self.cursor)?;
        Some(match row {
            Row::User { name, .. } => Selection::User(name.clone()),
            Row::Unassigned { .. } => Selection::Unassigned,
            Row::Task {
                task, assignment, ..
            } => Selection::Task {
                task: task.id(),
                assignment: assignment.map(|a| a.id),
                owner: assignment.map(|a| a.user_name.clone()),
            },
        })
    }

    /// Users that can take over the open reassignment: everyone in the
    /// catalog not already on the task.
    #[must_use]
    pub fn reassign_candidates(&self) -> Vec<User> {
        let Some(open) = self.board.state().reassigning() else {
            return Vec::new();
        };
        let assigned: Vec<_> = self
            .board
            .store()
            .find_task(open.task_id)
            .map(|t| t.assignments.iter().map(|a| a.user_id).collect())
            .unwrap_or_default();
        self.board
            .catalog()
            .users
            .into_iter()
            .filter(|u| !assigned.contains(&u.id))
            .collect()
    }

    /// Handle a key event. Returns the intent to run, if any.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<Intent> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }
        self.notice = None;

        let mode = std::mem::replace(&mut self.mode, InputMode::Normal);
        let intent = match mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Search { buffer } => {
                self.handle_search_key(key, buffer);
                None
            }
            InputMode::NewTask { form } => self.handle_new_task_key(key, form),
            InputMode::EditTask { form } => self.handle_edit_key(key, form),
            InputMode::Description { task, buffer } => {
                self.handle_description_key(key, task, buffer)
            }
            InputMode::Detail { assignment, buffer } => {
                self.handle_detail_key(key, assignment, buffer)
            }
            InputMode::Reassign { cursor } => self.handle_reassign_key(key, cursor),
        };
        self.clamp_cursor();
        intent
    }

    /// Applies the outcome of an intent returned by
    /// [`handle_key_event`](Self::handle_key_event).
    ///
    /// Network failures already raised the board alert; anything else is
    /// shown as a notice. Edit and reassign modes close once the board
    /// leaves them.
    pub fn finish_intent(&mut self, result: Result<(), BoardError>) {
        match result {
            Ok(()) | Err(BoardError::Network(_)) => {}
            Err(err) => self.notice = Some(err.to_string()),
        }
        match self.mode {
            InputMode::EditTask { .. } if self.board.state().editing().is_none() => {
                self.mode = InputMode::Normal;
            }
            InputMode::Reassign { .. } if self.board.state().reassigning().is_none() => {
                self.mode = InputMode::Normal;
            }
            _ => {}
        }
        self.clamp_cursor();
    }

    /// Keeps the cursor on an existing row.
    pub fn clamp_cursor(&mut self) {
        let rows = self.row_count();
        if self.cursor >= rows {
            self.cursor = rows.saturating_sub(1);
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<Intent> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                if self.board.alert().is_some() {
                    self.board.dismiss_alert();
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.row_count() {
                    self.cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Tab => {
                let next = match self.board.kind() {
                    BoardKind::Today => BoardKind::InReview,
                    BoardKind::InReview => BoardKind::All,
                    BoardKind::All => BoardKind::Today,
                };
                self.board.set_kind(next);
                self.cursor = 0;
            }
            KeyCode::Char('/') => {
                let buffer = self.board.state().filter.search.clone().unwrap_or_default();
                self.mode = InputMode::Search { buffer };
            }
            KeyCode::Char('p') => self.board.state_mut().filter.cycle_priority(),
            KeyCode::Char('a') => self.toggle_assignee_filter(),
            KeyCode::Char('c') => {
                self.board.state_mut().filter = crate::tasks::TaskFilter::default();
            }
            KeyCode::Char('r') => return Some(Intent::Refresh),
            KeyCode::Char('R') => return Some(Intent::Retry),
            KeyCode::Char('n') => {
                self.mode = InputMode::NewTask {
                    form: TaskForm::new(self.today),
                };
            }
            KeyCode::Char('s') => {
                if let Some(Selection::Task {
                    assignment: Some(id),
                    ..
                }) = self.selection()
                {
                    return Some(Intent::AdvanceStatus(id));
                }
            }
            KeyCode::Char('x') => {
                if let Some(Selection::Task { task, .. }) = self.selection() {
                    return Some(Intent::Delete(task));
                }
            }
            KeyCode::Char('e') => self.open_edit(),
            KeyCode::Char('d') => self.open_description(),
            KeyCode::Char('i') => self.open_detail(),
            KeyCode::Char('m') => self.open_reassign(),
            _ => {}
        }
        None
    }

    fn handle_search_key(&mut self, key: KeyEvent, mut buffer: String) {
        match key.code {
            KeyCode::Enter => return,
            KeyCode::Esc => {
                self.board.state_mut().filter.search = None;
                return;
            }
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            _ => {}
        }
        self.board.state_mut().filter.search = Some(buffer.clone()).filter(|s| !s.is_empty());
        self.mode = InputMode::Search { buffer };
    }

    fn handle_new_task_key(&mut self, key: KeyEvent, mut form: TaskForm) -> Option<Intent> {
        match key.code {
            KeyCode::Enter => return Some(Intent::Create(form)),
            KeyCode::Esc => return None,
            KeyCode::Tab => form.assignment = self.next_assignment_choice(form.assignment),
            KeyCode::Char(c) => form.title.push(c),
            KeyCode::Backspace => {
                form.title.pop();
            }
            _ => {}
        }
        self.mode = InputMode::NewTask { form };
        None
    }

    /// Unassigned, then random, then each catalog user in turn.
    fn next_assignment_choice(&self, current: AssignmentChoice) -> AssignmentChoice {
        let users = self.board.catalog().users;
        let manual = |index: usize| {
            users
                .get(index)
                .map_or(AssignmentChoice::None, |u| AssignmentChoice::Manual(Some(u.id)))
        };
        match current {
            AssignmentChoice::None => AssignmentChoice::Random,
            AssignmentChoice::Random | AssignmentChoice::Manual(None) => manual(0),
            AssignmentChoice::Manual(Some(id)) => users
                .iter()
                .position(|u| u.id == id)
                .map_or(AssignmentChoice::None, |i| manual(i + 1)),
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent, mut form: TaskForm) -> Option<Intent> {
        match key.code {
            KeyCode::Esc => {
                self.board.state_mut().cancel_edit();
                return None;
            }
            KeyCode::Enter => {
                self.mode = InputMode::EditTask { form: form.clone() };
                return Some(Intent::SaveEdit(form));
            }
            KeyCode::Tab => {
                let all = taskboard_proto::task::Priority::ALL;
                let at = all.iter().position(|p| *p == form.priority).unwrap_or(0);
                form.priority = all[(at + 1) % all.len()];
            }
            KeyCode::Char(c) => form.title.push(c),
            KeyCode::Backspace => {
                form.title.pop();
            }
            _ => {}
        }
        self.mode = InputMode::EditTask { form };
        None
    }

    fn handle_description_key(
        &mut self,
        key: KeyEvent,
        task: TaskId,
        mut buffer: String,
    ) -> Option<Intent> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => return Some(Intent::FlushDescription(task)),
            KeyCode::Char(c) => {
                buffer.push(c);
                self.board.edit_description(task, buffer.clone());
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.board.edit_description(task, buffer.clone());
            }
            _ => {}
        }
        self.mode = InputMode::Description { task, buffer };
        None
    }

    fn handle_detail_key(
        &mut self,
        key: KeyEvent,
        assignment: AssignmentId,
        mut buffer: String,
    ) -> Option<Intent> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => return Some(Intent::FlushDetail(assignment)),
            KeyCode::Char(c) => {
                buffer.push(c);
                self.board.edit_detail(assignment, buffer.clone());
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.board.edit_detail(assignment, buffer.clone());
            }
            _ => {}
        }
        self.mode = InputMode::Detail { assignment, buffer };
        None
    }

    fn handle_reassign_key(&mut self, key: KeyEvent, mut cursor: usize) -> Option<Intent> {
        let candidates = self.reassign_candidates();
        let mut intent = None;
        match key.code {
            KeyCode::Esc => {
                self.board.cancel_reassign();
                return None;
            }
            KeyCode::Up | KeyCode::Char('k') => cursor = cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if cursor + 1 < candidates.len() {
                    cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(user) = candidates.get(cursor) {
                    self.board.select_reassign_target(user.id);
                }
            }
            KeyCode::Enter => intent = Some(Intent::ConfirmReassign),
            _ => {}
        }
        self.mode = InputMode::Reassign { cursor };
        intent
    }

    fn toggle_selected(&mut self) {
        match self.selection() {
            Some(Selection::User(name)) => self.board.state_mut().toggle_user(&name),
            Some(Selection::Task { task, .. }) => self.board.state_mut().toggle_task(task),
            Some(Selection::Unassigned) | None => {}
        }
    }

    fn toggle_assignee_filter(&mut self) {
        let name = match self.selection() {
            Some(Selection::User(name)) => name,
            Some(Selection::Task {
                owner: Some(name), ..
            }) => name,
            _ => {
                self.board.state_mut().filter.assignee = None;
                return;
            }
        };
        let filter = &mut self.board.state_mut().filter;
        filter.assignee = if filter.assignee.as_deref() == Some(name.as_str()) {
            None
        } else {
            Some(name)
        };
        self.cursor = 0;
    }

    fn open_edit(&mut self) {
        let Some(Selection::Task { task, .. }) = self.selection() else {
            return;
        };
        match self.board.begin_edit(task) {
            Ok(form) => self.mode = InputMode::EditTask { form },
            Err(err) => self.notice = Some(err.to_string()),
        }
    }

    fn open_description(&mut self) {
        let Some(Selection::Task { task, .. }) = self.selection() else {
            return;
        };
        let Some(entry) = self.board.store().find_task(task) else {
            return;
        };
        self.mode = InputMode::Description {
            task,
            buffer: entry.task.description,
        };
    }

    fn open_detail(&mut self) {
        let Some(Selection::Task {
            assignment: Some(id),
            ..
        }) = self.selection()
        else {
            self.notice = Some("select a task under an assignee".to_string());
            return;
        };
        let Some(assignment) = self.board.store().find_assignment(id) else {
            return;
        };
        self.mode = InputMode::Detail {
            assignment: id,
            buffer: assignment.detail,
        };
    }

    fn open_reassign(&mut self) {
        let Some(Selection::Task {
            task,
            assignment: Some(id),
            ..
        }) = self.selection()
        else {
            self.notice = Some("select a task under an assignee".to_string());
            return;
        };
        match self.board.begin_reassign(task, id) {
            Ok(()) => self.mode = InputMode::Reassign { cursor: 0 },
            Err(err) => self.notice = Some(err.to_string()),
        }
    }
}
