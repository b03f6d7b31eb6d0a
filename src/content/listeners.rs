use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

pub type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener)>>,
}

impl ListenerRegistry {
    fn entries(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn add(&self, listener: Listener) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries().push((id, listener));
        id
    }

    pub(crate) fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    fn contains(&self, id: u64) -> bool {
        self.entries().iter().any(|(entry_id, _)| *entry_id == id)
    }

    pub(crate) fn clear(&self) {
        self.entries().clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries().len()
    }

    /// Call every listener in registration order with no lock held, so a
    /// listener may read the store, subscribe or unsubscribe.
    pub(crate) fn notify(&self) {
        let snapshot: Vec<(u64, Listener)> = self.entries().clone();
        for (id, listener) in snapshot {
            // Skip listeners removed by an earlier listener in this round
            if self.contains(id) {
                listener();
            }
        }
    }
}

/// Returned by [`ContentStore::subscribe`](super::ContentStore::subscribe).
///
/// Dropping it does not unsubscribe; call [`Subscription::unsubscribe`].
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    registry: Weak<ListenerRegistry>,
}

impl Subscription {
    pub(crate) fn new(id: u64, registry: &Arc<ListenerRegistry>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    /// Remove exactly this listener. Returns false if it was already removed.
    pub fn unsubscribe(&self) -> bool {
        self.registry
            .upgrade()
            .map(|registry| registry.remove(self.id))
            .unwrap_or(false)
    }
}
