//! Debounced per-entity field synchronizer.
//!
//! Collapses a burst of edits to the same field into a single persist call
//! carrying the last value. Pending edits live in an explicit token table:
//! each [`FieldSynchronizer::schedule`] issues a fresh token and overwrites
//! the entry for its key, and a timer only flushes if its token is still
//! the current one when it fires.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::gateway::NetworkError;

/// Default quiet period before a pending edit is persisted.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1000);

/// Writes one field value to the backend.
pub trait Persist<K>: Send + Sync + 'static {
    /// Persists `value` for the entity identified by `key`.
    fn persist(&self, key: K, value: String)
    -> impl Future<Output = Result<(), NetworkError>> + Send;
}

/// Outcome of a flush, delivered on the synchronizer's event channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent<K> {
    /// The latest value for `key` reached the backend.
    Saved {
        /// Entity whose field was saved.
        key: K,
    },
    /// Persisting failed; the field is "not saved" until retried.
    Failed {
        /// Entity whose field failed to save.
        key: K,
        /// The value that was being persisted.
        value: String,
        /// Why it failed.
        error: NetworkError,
    },
}

#[derive(Debug)]
struct Pending {
    token: u64,
    value: String,
}

struct Shared<K, P> {
    window: Duration,
    table: Mutex<HashMap<K, Pending>>,
    next_token: AtomicU64,
    persist: P,
    events: mpsc::UnboundedSender<SyncEvent<K>>,
}

impl<K, P> Shared<K, P>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    P: Persist<K>,
{
    /// Timer callback: flushes only if `token` is still current for `key`.
    async fn fire(&self, key: K, token: u64) {
        let value = {
            let mut table = self.table.lock();
            match table.get(&key) {
                Some(pending) if pending.token == token => table.remove(&key).map(|p| p.value),
                _ => None,
            }
        };
        if let Some(value) = value {
            self.run(key, value).await;
        }
    }

    async fn run(&self, key: K, value: String) {
        tracing::debug!(%key, "flushing debounced edit");
        let event = match self.persist.persist(key.clone(), value.clone()).await {
            Ok(()) => SyncEvent::Saved { key },
            Err(error) => {
                tracing::warn!(%key, error = %error, "debounced edit not saved");
                SyncEvent::Failed { key, value, error }
            }
        };
        // Receiver gone means the board was torn down; nothing left to notify.
        let _ = self.events.send(event);
    }
}

/// Debounces edits per key and persists the last value after a quiet window.
///
/// Windows for different keys are independent. Failed flushes are reported
/// as [`SyncEvent::Failed`] and never retried automatically.
pub struct FieldSynchronizer<K, P> {
    shared: Arc<Shared<K, P>>,
}

impl<K, P> Clone for FieldSynchronizer<K, P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, P> FieldSynchronizer<K, P>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    P: Persist<K>,
{
    /// Creates a synchronizer and the receiver for its outcome events.
    #[must_use]
    pub fn new(window: Duration, persist: P) -> (Self, mpsc::UnboundedReceiver<SyncEvent<K>>) {
        let (events, rx) = mpsc::unbounded_channel();
        let shared = Shared {
            window,
            table: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(1),
            persist,
            events,
        };
        (
            Self {
                shared: Arc::new(shared),
            },
            rx,
        )
    }

    /// Records a new value for `key` and restarts its quiet window.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, key: K, value: String) {
        let token = self.shared.next_token.fetch_add(1, Ordering::Relaxed);
        self.shared
            .table
            .lock()
            .insert(key.clone(), Pending { token, value });

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(shared.window).await;
            shared.fire(key, token).await;
        });
    }

    /// Re-schedules a value whose flush failed.
    pub fn retry(&self, key: K, value: String) {
        tracing::info!(%key, "retrying unsaved edit");
        self.schedule(key, value);
    }

    /// Drops the pending edit for `key`, returning its value.
    pub fn cancel(&self, key: &K) -> Option<String> {
        self.shared.table.lock().remove(key).map(|p| p.value)
    }

    /// Persists the pending edit for `key` now instead of waiting.
    ///
    /// Returns `false` if nothing was pending.
    pub async fn flush(&self, key: &K) -> bool {
        let Some(value) = self.cancel(key) else {
            return false;
        };
        self.shared.run(key.clone(), value).await;
        true
    }

    /// Whether an edit for `key` is waiting for its window to elapse.
    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool {
        self.shared.table.lock().contains_key(key)
    }

    /// The value waiting to be persisted for `key`, if any.
    #[must_use]
    pub fn pending_value(&self, key: &K) -> Option<String> {
        self.shared.table.lock().get(key).map(|p| p.value.clone())
    }

    /// Number of keys with a pending edit.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.table.lock().len()
    }
}
