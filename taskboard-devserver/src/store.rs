//! In-memory tables behind the development API.
//!
//! Tasks and assignments live in ordered maps keyed by id, so listings come
//! out in ascending id order without sorting. All mutation goes through a
//! single [`RwLock`] write guard per call.

use std::collections::BTreeMap;

use rand::Rng;
use taskboard_proto::api::{AssignmentMode, AssignmentPatch, CreateTaskRequest, TaskDraft};
use taskboard_proto::assignment::{Assignment, AssignmentStatus};
use taskboard_proto::catalog::{Company, TaskType, User};
use taskboard_proto::ids::{AssignmentId, CompanyId, TaskId, TaskTypeId, UserId};
use taskboard_proto::task::{Task, TaskWithAssignments};
use tokio::sync::RwLock;

/// Business-rule failures, mapped to HTTP statuses by the API layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No task with this id.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),
    /// No assignment with this id.
    #[error("assignment {0} not found")]
    AssignmentNotFound(AssignmentId),
    /// The user is not in the catalog.
    #[error("user {0} does not exist")]
    UnknownUser(UserId),
    /// The task type is not in the catalog.
    #[error("task type {0} does not exist")]
    UnknownTaskType(TaskTypeId),
    /// The company is not in the catalog.
    #[error("company {0} does not exist")]
    UnknownCompany(CompanyId),
    /// The title is empty or whitespace.
    #[error("title must not be empty")]
    EmptyTitle,
    /// An assignment patch with neither status nor detail.
    #[error("nothing to update")]
    EmptyPatch,
    /// The user already holds an assignment on the task.
    #[error("user {user} is already assigned to task {task}")]
    AlreadyAssigned {
        /// The user.
        user: UserId,
        /// The task.
        task: TaskId,
    },
    /// Random assignment with an empty user catalog.
    #[error("no users available for random assignment")]
    NoUsers,
}

/// Catalog entries the database starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    /// Task type names.
    pub types: Vec<String>,
    /// Company names.
    pub companies: Vec<String>,
    /// User names.
    pub users: Vec<String>,
}

impl Default for Seed {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(ToString::to_string).collect();
        Self {
            types: names(&["Reel", "Post", "Story"]),
            companies: names(&["Acme", "Globex"]),
            users: names(&["Ana", "Luis", "Eva"]),
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    tasks: BTreeMap<TaskId, Task>,
    assignments: BTreeMap<AssignmentId, Assignment>,
    types: Vec<TaskType>,
    companies: Vec<Company>,
    users: Vec<User>,
    next_task: u64,
    next_assignment: u64,
}

impl Tables {
    fn user(&self, id: UserId) -> Result<&User, StoreError> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or(StoreError::UnknownUser(id))
    }

    fn check_draft(&self, draft: &TaskDraft) -> Result<(), StoreError> {
        if draft.title.trim().is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        if let Some(id) = draft.task_type {
            if !self.types.iter().any(|t| t.id == id) {
                return Err(StoreError::UnknownTaskType(id));
            }
        }
        if let Some(id) = draft.company {
            if !self.companies.iter().any(|c| c.id == id) {
                return Err(StoreError::UnknownCompany(id));
            }
        }
        Ok(())
    }

    fn assign(&mut self, task_id: TaskId, user_id: UserId) -> Result<Assignment, StoreError> {
        let user_name = self.user(user_id)?.name.clone();
        if self
            .assignments
            .values()
            .any(|a| a.task_id == task_id && a.user_id == user_id)
        {
            return Err(StoreError::AlreadyAssigned {
                user: user_id,
                task: task_id,
            });
        }
        self.next_assignment += 1;
        let assignment = Assignment {
            id: AssignmentId(self.next_assignment),
            task_id,
            user_id,
            user_name,
            status: AssignmentStatus::Pending,
            detail: String::new(),
        };
        self.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    fn with_assignments(&self, task: &Task) -> TaskWithAssignments {
        TaskWithAssignments {
            task: task.clone(),
            assignments: self
                .assignments
                .values()
                .filter(|a| a.task_id == task.id)
                .cloned()
                .collect(),
        }
    }
}

fn pick_random(users: &[User]) -> Option<UserId> {
    if users.is_empty() {
        return None;
    }
    let index = rand::rng().random_range(0..users.len());
    Some(users[index].id)
}

/// The development backend's data.
#[derive(Debug)]
pub struct Database {
    tables: RwLock<Tables>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new(&Seed::default())
    }
}

impl Database {
    /// Creates a database with the given catalog and no tasks.
    #[must_use]
    pub fn new(seed: &Seed) -> Self {
        let ids = 1u64..;
        let tables = Tables {
            types: seed
                .types
                .iter()
                .zip(ids.clone())
                .map(|(name, id)| TaskType {
                    id: TaskTypeId(id),
                    name: name.clone(),
                })
                .collect(),
            companies: seed
                .companies
                .iter()
                .zip(ids.clone())
                .map(|(name, id)| Company {
                    id: CompanyId(id),
                    name: name.clone(),
                })
                .collect(),
            users: seed
                .users
                .iter()
                .zip(ids)
                .map(|(name, id)| User {
                    id: UserId(id),
                    name: name.clone(),
                })
                .collect(),
            ..Tables::default()
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// All tasks with their assignments, by ascending id.
    pub async fn list_tasks(&self) -> Vec<TaskWithAssignments> {
        let tables = self.tables.read().await;
        tables
            .tasks
            .values()
            .map(|t| tables.with_assignments(t))
            .collect()
    }

    /// Task type catalog.
    pub async fn types(&self) -> Vec<TaskType> {
        self.tables.read().await.types.clone()
    }

    /// Company catalog.
    pub async fn companies(&self) -> Vec<Company> {
        self.tables.read().await.companies.clone()
    }

    /// User catalog.
    pub async fn users(&self) -> Vec<User> {
        self.tables.read().await.users.clone()
    }

    /// Creates a task and its initial assignment, if any.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyTitle`], unknown catalog references, or
    /// [`StoreError::NoUsers`] for random assignment with no users.
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
    ) -> Result<TaskWithAssignments, StoreError> {
        let mut tables = self.tables.write().await;
        tables.check_draft(&request.task)?;
        let assignee = match request.assignment {
            AssignmentMode::None => None,
            AssignmentMode::Random => {
                Some(pick_random(&tables.users).ok_or(StoreError::NoUsers)?)
            }
            AssignmentMode::Manual { user_id } => {
                tables.user(user_id)?;
                Some(user_id)
            }
        };

        tables.next_task += 1;
        let task = request.task.into_task(TaskId(tables.next_task));
        let id = task.id;
        tables.tasks.insert(id, task.clone());
        if let Some(user_id) = assignee {
            tables.assign(id, user_id)?;
        }
        tracing::info!(task_id = %id, ?assignee, "task created");
        Ok(tables.with_assignments(&task))
    }

    /// Adds another assignee to an existing task.
    ///
    /// Not reachable over HTTP; used to seed multi-assignee boards.
    ///
    /// # Errors
    ///
    /// [`StoreError::TaskNotFound`], [`StoreError::UnknownUser`], or
    /// [`StoreError::AlreadyAssigned`].
    pub async fn add_assignment(
        &self,
        task: TaskId,
        user: UserId,
    ) -> Result<Assignment, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.tasks.contains_key(&task) {
            return Err(StoreError::TaskNotFound(task));
        }
        tables.assign(task, user)
    }

    /// Replaces every editable field of a task.
    ///
    /// # Errors
    ///
    /// [`StoreError::TaskNotFound`], [`StoreError::EmptyTitle`], or unknown
    /// catalog references.
    pub async fn update_task(&self, id: TaskId, draft: TaskDraft) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.tasks.contains_key(&id) {
            return Err(StoreError::TaskNotFound(id));
        }
        tables.check_draft(&draft)?;
        let task = draft.into_task(id);
        tables.tasks.insert(id, task.clone());
        Ok(task)
    }

    /// Replaces a task's description.
    ///
    /// # Errors
    ///
    /// [`StoreError::TaskNotFound`].
    pub async fn update_description(
        &self,
        id: TaskId,
        description: String,
    ) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;
        let task = tables
            .tasks
            .get_mut(&id)
            .ok_or(StoreError::TaskNotFound(id))?;
        task.description = description;
        Ok(task.clone())
    }

    /// Deletes a task and all of its assignments.
    ///
    /// # Errors
    ///
    /// [`StoreError::TaskNotFound`].
    pub async fn delete_task(&self, id: TaskId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .tasks
            .remove(&id)
            .ok_or(StoreError::TaskNotFound(id))?;
        tables.assignments.retain(|_, a| a.task_id != id);
        tracing::info!(task_id = %id, "task deleted");
        Ok(())
    }

    /// Applies a status and/or detail change to an assignment.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyPatch`] or [`StoreError::AssignmentNotFound`].
    pub async fn update_assignment(
        &self,
        id: AssignmentId,
        patch: AssignmentPatch,
    ) -> Result<Assignment, StoreError> {
        if patch.is_empty() {
            return Err(StoreError::EmptyPatch);
        }
        let mut tables = self.tables.write().await;
        let assignment = tables
            .assignments
            .get_mut(&id)
            .ok_or(StoreError::AssignmentNotFound(id))?;
        if let Some(status) = patch.status {
            assignment.status = status;
        }
        if let Some(detail) = patch.detail {
            assignment.detail = detail;
        }
        Ok(assignment.clone())
    }

    /// Removes an assignment and creates a fresh one on the same task for
    /// another user.
    ///
    /// # Errors
    ///
    /// [`StoreError::AssignmentNotFound`], [`StoreError::UnknownUser`], or
    /// [`StoreError::AlreadyAssigned`]. Nothing changes on error.
    pub async fn reassign(&self, id: AssignmentId, user: UserId) -> Result<Assignment, StoreError> {
        let mut tables = self.tables.write().await;
        let current = tables
            .assignments
            .get(&id)
            .cloned()
            .ok_or(StoreError::AssignmentNotFound(id))?;
        tables.user(user)?;
        if current.user_id != user
            && tables
                .assignments
                .values()
                .any(|a| a.task_id == current.task_id && a.user_id == user)
        {
            return Err(StoreError::AlreadyAssigned {
                user,
                task: current.task_id,
            });
        }
        tables.assignments.remove(&id);
        let replacement = tables.assign(current.task_id, user)?;
        tracing::info!(from = %id, to = %replacement.id, user_id = %user, "assignment replaced");
        Ok(replacement)
    }
}
