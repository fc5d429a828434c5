//! Task aggregate store.
//!
//! Holds the authoritative local copy of the task listing for one board.
//! The listing is only ever replaced wholesale by [`TaskStore::reload`];
//! mutations go to the gateway and are followed by a reload instead of a
//! local patch. Each reload takes a generation ticket before fetching, and
//! a fetch that lands after a newer one has been applied is discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use taskboard_proto::api::{AssignmentPatch, CreateTaskRequest, TaskDraft};
use taskboard_proto::assignment::{Assignment, AssignmentStatus};
use taskboard_proto::catalog::{Company, TaskType, User};
use taskboard_proto::ids::{AssignmentId, CompanyId, TaskId, TaskTypeId, UserId};
use taskboard_proto::task::TaskWithAssignments;

use crate::gateway::{Gateway, NetworkError};

/// Immutable view of the listing shared with readers.
pub type Snapshot = Arc<Vec<TaskWithAssignments>>;

/// Result of a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The fetched listing replaced the store; carries its generation.
    Applied(u64),
    /// A newer reload was already applied; this one was dropped.
    Superseded(u64),
}

/// Failure of a mutation, split by whether the change reached the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    /// The backend did not apply the change.
    #[error(transparent)]
    Rejected(NetworkError),
    /// The change was applied but the follow-up reload failed.
    #[error("saved, but refreshing the listing failed: {0}")]
    Reload(NetworkError),
}

impl MutationError {
    /// The underlying network error.
    #[must_use]
    pub const fn network(&self) -> &NetworkError {
        match self {
            Self::Rejected(err) | Self::Reload(err) => err,
        }
    }
}

/// Selector option lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Task types.
    pub types: Vec<TaskType>,
    /// Companies.
    pub companies: Vec<Company>,
    /// Assignable users.
    pub users: Vec<User>,
}

impl Catalog {
    /// Display name of a user.
    #[must_use]
    pub fn user_name(&self, id: UserId) -> Option<&str> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.name.as_str())
    }

    /// Display name of a task type.
    #[must_use]
    pub fn type_name(&self, id: TaskTypeId) -> Option<&str> {
        self.types
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.as_str())
    }

    /// Display name of a company.
    #[must_use]
    pub fn company_name(&self, id: CompanyId) -> Option<&str> {
        self.companies
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }
}

struct Listing {
    generation: u64,
    tasks: Snapshot,
}

/// In-memory listing of tasks with assignments for the current board.
pub struct TaskStore<G> {
    gateway: Arc<G>,
    listing: RwLock<Listing>,
    catalog: RwLock<Catalog>,
    next_generation: AtomicU64,
}

impl<G: Gateway> TaskStore<G> {
    /// Creates an empty store; call [`reload`](Self::reload) to populate it.
    #[must_use]
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            listing: RwLock::new(Listing {
                generation: 0,
                tasks: Arc::new(Vec::new()),
            }),
            catalog: RwLock::new(Catalog::default()),
            next_generation: AtomicU64::new(1),
        }
    }

    /// The gateway this store talks to.
    #[must_use]
    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Current listing. Cheap: clones an `Arc`.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.listing.read().tasks)
    }

    /// Generation of the listing currently held (0 before the first load).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.listing.read().generation
    }

    /// Number of tasks in the listing.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listing.read().tasks.len()
    }

    /// Whether the listing is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listing.read().tasks.is_empty()
    }

    /// Finds a task by id in the current listing.
    #[must_use]
    pub fn find_task(&self, id: TaskId) -> Option<TaskWithAssignments> {
        self.listing
            .read()
            .tasks
            .iter()
            .find(|t| t.id() == id)
            .cloned()
    }

    /// Finds an assignment by id in the current listing.
    #[must_use]
    pub fn find_assignment(&self, id: AssignmentId) -> Option<Assignment> {
        self.listing
            .read()
            .tasks
            .iter()
            .flat_map(|t| t.assignments.iter())
            .find(|a| a.id == id)
            .cloned()
    }

    /// Re-fetches the full listing and replaces the store with it.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the previous listing stays in place.
    pub async fn reload(&self) -> Result<ReloadOutcome, NetworkError> {
        let ticket = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let tasks = self.gateway.list_tasks().await?;
        Ok(self.install(ticket, tasks))
    }

    /// Replaces the listing if `ticket` is newer than the one applied.
    fn install(&self, ticket: u64, tasks: Vec<TaskWithAssignments>) -> ReloadOutcome {
        let mut listing = self.listing.write();
        if ticket < listing.generation {
            tracing::debug!(
                ticket,
                current = listing.generation,
                "discarding superseded reload"
            );
            return ReloadOutcome::Superseded(ticket);
        }
        tracing::debug!(ticket, count = tasks.len(), "listing replaced");
        listing.generation = ticket;
        listing.tasks = Arc::new(tasks);
        ReloadOutcome::Applied(ticket)
    }

    async fn reload_after_mutation(&self) -> Result<(), MutationError> {
        self.reload().await.map(|_| ()).map_err(MutationError::Reload)
    }

    /// Fetches the three selector catalogs concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first gateway error; the cached catalog is left untouched.
    pub async fn load_catalog(&self) -> Result<Catalog, NetworkError> {
        let (types, companies, users) = tokio::try_join!(
            self.gateway.list_types(),
            self.gateway.list_companies(),
            self.gateway.list_users(),
        )?;
        let catalog = Catalog {
            types,
            companies,
            users,
        };
        *self.catalog.write() = catalog.clone();
        Ok(catalog)
    }

    /// The cached catalog (empty until [`load_catalog`](Self::load_catalog)).
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        self.catalog.read().clone()
    }

    /// Creates a task, then reloads.
    ///
    /// # Errors
    ///
    /// [`MutationError::Rejected`] if the create failed,
    /// [`MutationError::Reload`] if only the reload did.
    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<TaskId, MutationError> {
        let created = self
            .gateway
            .create_task(request)
            .await
            .map_err(MutationError::Rejected)?;
        tracing::info!(task_id = %created.id(), "task created");
        self.reload_after_mutation().await?;
        Ok(created.id())
    }

    /// Replaces a task's fields, then reloads.
    ///
    /// # Errors
    ///
    /// [`MutationError::Rejected`] if the update failed,
    /// [`MutationError::Reload`] if only the reload did.
    pub async fn update_task(&self, id: TaskId, draft: &TaskDraft) -> Result<(), MutationError> {
        self.gateway
            .update_task(id, draft)
            .await
            .map_err(MutationError::Rejected)?;
        tracing::info!(task_id = %id, "task updated");
        self.reload_after_mutation().await
    }

    /// Replaces a task's description, then reloads.
    ///
    /// # Errors
    ///
    /// [`MutationError::Rejected`] if the patch failed,
    /// [`MutationError::Reload`] if only the reload did.
    pub async fn update_description(
        &self,
        id: TaskId,
        description: &str,
    ) -> Result<(), MutationError> {
        self.gateway
            .update_description(id, description)
            .await
            .map_err(MutationError::Rejected)?;
        self.reload_after_mutation().await
    }

    /// Deletes a task, then reloads.
    ///
    /// # Errors
    ///
    /// [`MutationError::Rejected`] if the delete failed,
    /// [`MutationError::Reload`] if only the reload did.
    pub async fn delete_task(&self, id: TaskId) -> Result<(), MutationError> {
        self.gateway
            .delete_task(id)
            .await
            .map_err(MutationError::Rejected)?;
        tracing::info!(task_id = %id, "task deleted");
        self.reload_after_mutation().await
    }

    /// Sets an assignment's status, then reloads.
    ///
    /// # Errors
    ///
    /// [`MutationError::Rejected`] if the patch failed,
    /// [`MutationError::Reload`] if only the reload did.
    pub async fn update_assignment_status(
        &self,
        id: AssignmentId,
        status: AssignmentStatus,
    ) -> Result<(), MutationError> {
        self.gateway
            .update_assignment(id, &AssignmentPatch::status(status))
            .await
            .map_err(MutationError::Rejected)?;
        tracing::info!(assignment_id = %id, %status, "assignment status changed");
        self.reload_after_mutation().await
    }

    /// Sets an assignment's progress detail, then reloads.
    ///
    /// # Errors
    ///
    /// [`MutationError::Rejected`] if the patch failed,
    /// [`MutationError::Reload`] if only the reload did.
    pub async fn update_assignment_detail(
        &self,
        id: AssignmentId,
        detail: &str,
    ) -> Result<(), MutationError> {
        self.gateway
            .update_assignment(id, &AssignmentPatch::detail(detail))
            .await
            .map_err(MutationError::Rejected)?;
        self.reload_after_mutation().await
    }

    /// Moves an assignment to another user, then reloads.
    ///
    /// # Errors
    ///
    /// [`MutationError::Rejected`] if the reassignment failed,
    /// [`MutationError::Reload`] if only the reload did.
    pub async fn reassign(&self, id: AssignmentId, user: UserId) -> Result<(), MutationError> {
        self.gateway
            .reassign(id, user)
            .await
            .map_err(MutationError::Rejected)?;
        tracing::info!(assignment_id = %id, user_id = %user, "assignment moved");
        self.reload_after_mutation().await
    }
}
