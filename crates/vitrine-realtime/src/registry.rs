//! Topic subscription registry.
//!
//! Maps topic strings to ordered listener lists. Registration hands back a
//! [`Subscription`] whose identity (a monotonically increasing id) is the key
//! for removal, so two listeners wrapping the same closure never collide.
//!
//! Dispatch snapshots the listener list under the lock and invokes callbacks
//! outside it, so a callback may freely subscribe or unsubscribe without
//! deadlocking. A panicking callback is isolated: the panic is caught and
//! logged, and remaining listeners still run.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::error;

/// A registered topic listener.
pub type Callback = Arc<dyn Fn(&Value) + Send + Sync>;

struct Entry {
    id: u64,
    callback: Callback,
}

/// Topic-keyed listener registry.
#[derive(Default)]
pub struct Registry {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<String, Vec<Entry>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `topic`, in arrival order.
    pub fn subscribe(self: &Arc<Self>, topic: &str, callback: Callback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut map = self.listeners.lock();
        map.entry(topic.to_string())
            .or_default()
            .push(Entry { id, callback });
        drop(map);
        Subscription {
            registry: Arc::clone(self),
            topic: topic.to_string(),
            id,
            released: AtomicBool::new(false),
        }
    }

    /// Remove listener `id` from `topic`. Returns whether anything was removed.
    fn remove(&self, topic: &str, id: u64) -> bool {
        let mut map = self.listeners.lock();
        let Some(entries) = map.get_mut(topic) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|e| e.id != id);
        let removed = entries.len() < before;
        if entries.is_empty() {
            let _ = map.remove(topic);
        }
        removed
    }

    /// Invoke every listener registered for `topic`, in registration order.
    ///
    /// Returns the number of listeners invoked. Topics with no listeners are
    /// a silent no-op.
    pub fn dispatch(&self, topic: &str, payload: &Value) -> usize {
        let snapshot: Vec<Callback> = {
            let map = self.listeners.lock();
            map.get(topic)
                .map(|entries| entries.iter().map(|e| Arc::clone(&e.callback)).collect())
                .unwrap_or_default()
        };

        for callback in &snapshot {
            if catch_unwind(AssertUnwindSafe(|| callback(payload))).is_err() {
                error!(%topic, "listener panicked during dispatch");
            }
        }
        snapshot.len()
    }

    /// Number of listeners currently registered for `topic`.
    pub fn listener_count(&self, topic: &str) -> usize {
        self.listeners.lock().get(topic).map_or(0, Vec::len)
    }

    /// Whether no topic has any listener.
    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }
}

/// Handle to one registered listener.
///
/// Dropping the handle unregisters the listener; call [`Subscription::detach`]
/// to keep the registration alive for the life of the registry instead.
pub struct Subscription {
    registry: Arc<Registry>,
    topic: String,
    id: u64,
    released: AtomicBool,
}

impl Subscription {
    /// Topic this subscription listens on.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Remove the listener. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            let _ = self.registry.remove(&self.topic, self.id);
        }
    }

    /// Consume the handle without unregistering the listener.
    ///
    /// The listener then lives as long as the registry does.
    pub fn detach(self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
