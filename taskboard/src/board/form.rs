//! Create/edit form state and client-side validation.

use chrono::NaiveDate;
use taskboard_proto::api::{AssignmentMode, CreateTaskRequest, TaskDraft};
use taskboard_proto::ids::{CompanyId, TaskTypeId, UserId};
use taskboard_proto::task::{Priority, Task};

/// Validation failures caught before any request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// The title is empty or only whitespace.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// Manual assignment was chosen without picking a user.
    #[error("select a user for manual assignment")]
    NoAssignee,
}

/// How the form wants the new task assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignmentChoice {
    /// Leave unassigned.
    #[default]
    None,
    /// Backend picks a user.
    Random,
    /// A user picked from the selector, once chosen.
    Manual(Option<UserId>),
}

/// Fields of the create/edit task form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    /// Title input.
    pub title: String,
    /// Description input.
    pub description: String,
    /// Content input.
    pub content: String,
    /// Priority selector.
    pub priority: Priority,
    /// Date picker.
    pub date: NaiveDate,
    /// Task type selector.
    pub task_type: Option<TaskTypeId>,
    /// Company selector.
    pub company: Option<CompanyId>,
    /// Assignment selector (create only).
    pub assignment: AssignmentChoice,
}

impl TaskForm {
    /// A blank form for a task on `date`.
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            content: String::new(),
            priority: Priority::Medium,
            date,
            task_type: None,
            company: None,
            assignment: AssignmentChoice::None,
        }
    }

    /// A form pre-filled from an existing task, for editing.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            content: task.content.clone(),
            priority: task.priority,
            date: task.date,
            task_type: task.task_type,
            company: task.company,
            assignment: AssignmentChoice::None,
        }
    }

    /// Validates the task fields for an update.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::TitleEmpty`] if the title is blank.
    pub fn to_draft(&self) -> Result<TaskDraft, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::TitleEmpty);
        }
        Ok(TaskDraft {
            title: title.to_string(),
            description: self.description.clone(),
            content: self.content.clone(),
            priority: self.priority,
            date: self.date,
            task_type: self.task_type,
            company: self.company,
        })
    }

    /// Validates the whole form for a create.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::TitleEmpty`] if the title is blank, or
    /// [`FormError::NoAssignee`] if manual assignment has no user.
    pub fn to_create_request(&self) -> Result<CreateTaskRequest, FormError> {
        let task = self.to_draft()?;
        let assignment = match self.assignment {
            AssignmentChoice::None => AssignmentMode::None,
            AssignmentChoice::Random => AssignmentMode::Random,
            AssignmentChoice::Manual(Some(user_id)) => AssignmentMode::Manual { user_id },
            AssignmentChoice::Manual(None) => return Err(FormError::NoAssignee),
        };
        Ok(CreateTaskRequest { task, assignment })
    }
}
