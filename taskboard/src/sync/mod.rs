//! Inline-edit synchronization.
//!
//! [`FieldSynchronizer`] debounces keystroke-level edits; the adapters in
//! this module bind it to the two free-text fields the board edits inline:
//! a task's description and an assignment's progress detail.

pub mod debounce;

use std::sync::Arc;

pub use debounce::{DEFAULT_WINDOW, FieldSynchronizer, Persist, SyncEvent};
use taskboard_proto::api::AssignmentPatch;
use taskboard_proto::ids::{AssignmentId, TaskId};

use crate::gateway::{Gateway, NetworkError};

/// Persists task descriptions through `PATCH /api/tasks/{id}/description`.
pub struct DescriptionPersist<G> {
    gateway: Arc<G>,
}

impl<G> DescriptionPersist<G> {
    /// Wraps a shared gateway.
    #[must_use]
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

impl<G: Gateway> Persist<TaskId> for DescriptionPersist<G> {
    async fn persist(&self, key: TaskId, value: String) -> Result<(), NetworkError> {
        self.gateway.update_description(key, &value).await.map(|_| ())
    }
}

/// Persists assignment progress details through a detail-only patch.
pub struct DetailPersist<G> {
    gateway: Arc<G>,
}

impl<G> DetailPersist<G> {
    /// Wraps a shared gateway.
    #[must_use]
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

impl<G: Gateway> Persist<AssignmentId> for DetailPersist<G> {
    async fn persist(&self, key: AssignmentId, value: String) -> Result<(), NetworkError> {
        self.gateway
            .update_assignment(key, &AssignmentPatch::detail(value))
            .await
            .map(|_| ())
    }
}

/// Synchronizer for task descriptions.
pub type DescriptionSync<G> = FieldSynchronizer<TaskId, DescriptionPersist<G>>;

/// Synchronizer for assignment progress details.
pub type DetailSync<G> = FieldSynchronizer<AssignmentId, DetailPersist<G>>;
