//! The content store: the authoritative list of content items.
//!
//! The in-memory list is the source of truth. Every successful mutation then
//!
//! 1. persists the full list under [`CONTENT_KEY`],
//! 2. calls every subscribed listener once,
//! 3. writes a new refresh marker under [`REFRESH_KEY`] and announces
//!    [`SiteEvent::ContentUpdated`].
//!
//! Other contexts sharing the same storage pick the marker up and reload; see
//! [`crate::sync`]. Concurrent writers in different contexts can lose updates:
//! the last persisted snapshot wins.

mod listeners;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, error, info, warn};

pub use listeners::{Listener, Subscription};

use self::listeners::ListenerRegistry;
use crate::app::Result;
use crate::domain::{
    seed_items, sort_newest_first, ContentItem, ContentPatch, ContentType, NewContent,
};
use crate::store::{KeyValueStore, CONTENT_KEY, REFRESH_KEY};
use crate::sync::{Broadcaster, MarkerClock, NoopBroadcaster, SiteEvent};

pub struct ContentStore {
    items: Mutex<Vec<ContentItem>>,
    storage: Option<Arc<dyn KeyValueStore>>,
    broadcaster: Arc<dyn Broadcaster>,
    listeners: Arc<ListenerRegistry>,
    markers: Arc<MarkerClock>,
    nonce: AtomicU64,
    /// Held from mutation through persist, and around reload, so storage
    /// writes land in the order the list changed.
    writing: Mutex<()>,
}

impl ContentStore {
    /// Load the persisted list from `storage`, or the seed list if there is none
    /// or it cannot be read.
    pub fn open(storage: Arc<dyn KeyValueStore>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        let items = Self::load(storage.as_ref());
        Self::build(items, Some(storage), broadcaster)
    }

    /// A store without persistent storage: seed list only, nothing is read or written.
    pub fn ephemeral() -> Self {
        Self::build(seed_items(), None, Arc::new(NoopBroadcaster))
    }

    fn build(
        items: Vec<ContentItem>,
        storage: Option<Arc<dyn KeyValueStore>>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        let seed = Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;
        Self {
            items: Mutex::new(items),
            storage,
            broadcaster,
            listeners: Arc::new(ListenerRegistry::default()),
            markers: Arc::new(MarkerClock::new()),
            nonce: AtomicU64::new(seed),
            writing: Mutex::new(()),
        }
    }

    fn load(storage: &dyn KeyValueStore) -> Vec<ContentItem> {
        match storage.get(CONTENT_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<ContentItem>>(&raw) {
                Ok(items) => {
                    debug!("Loaded {} persisted content items", items.len());
                    items.into_iter().map(ContentItem::normalized).collect()
                }
                Err(e) => {
                    warn!("Persisted content is malformed, using seed list: {}", e);
                    seed_items()
                }
            },
            Ok(None) => {
                info!("No persisted content, using seed list");
                seed_items()
            }
            Err(e) => {
                warn!("Could not read persisted content, using seed list: {}", e);
                seed_items()
            }
        }
    }

    fn items(&self) -> MutexGuard<'_, Vec<ContentItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn writing(&self) -> MutexGuard<'_, ()> {
        self.writing.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every item, published or not, newest first.
    pub fn get_all(&self) -> Vec<ContentItem> {
        let mut items = self.items().clone();
        sort_newest_first(&mut items);
        items
    }

    /// Published items of one type, newest first.
    pub fn get_by_type(&self, kind: ContentType) -> Vec<ContentItem> {
        let mut items: Vec<ContentItem> = self
            .items()
            .iter()
            .filter(|item| item.kind == kind && item.published)
            .cloned()
            .collect();
        sort_newest_first(&mut items);
        items
    }

    pub fn get_by_id(&self, id: &str) -> Option<ContentItem> {
        self.items().iter().find(|item| item.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn add(&self, new: NewContent) -> Result<ContentItem> {
        new.validate()?;

        let (item, persisted) = {
            let _writing = self.writing();
            let (item, payload) = {
                let mut items = self.items();
                let id = self.fresh_id(&items, &new.title);
                let item = ContentItem::from_new(id, new);
                items.push(item.clone());
                (item, serde_json::to_string(&*items)?)
            };
            (item, self.persist(&payload))
        };

        info!("Added {} '{}' ({})", item.kind, item.title, item.id);
        self.commit(persisted)?;
        Ok(item)
    }

    /// Merge `patch` into the item with `id`. `Ok(None)` if there is no such item.
    pub fn update(&self, id: &str, patch: ContentPatch) -> Result<Option<ContentItem>> {
        patch.validate()?;

        let (item, persisted) = {
            let _writing = self.writing();
            let (item, payload) = {
                let mut items = self.items();
                let Some(item) = items.iter_mut().find(|item| item.id == id) else {
                    debug!("Update ignored, no content with id {}", id);
                    return Ok(None);
                };
                item.apply(patch);
                let item = item.clone();
                (item, serde_json::to_string(&*items)?)
            };
            (item, self.persist(&payload))
        };

        info!("Updated {} '{}' ({})", item.kind, item.title, item.id);
        self.commit(persisted)?;
        Ok(Some(item))
    }

    /// Remove the item with `id`. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let persisted = {
            let _writing = self.writing();
            let payload = {
                let mut items = self.items();
                let Some(index) = items.iter().position(|item| item.id == id) else {
                    debug!("Delete ignored, no content with id {}", id);
                    return Ok(false);
                };
                let removed = items.remove(index);
                info!("Deleted {} '{}' ({})", removed.kind, removed.title, removed.id);
                serde_json::to_string(&*items)?
            };
            self.persist(&payload)
        };

        self.commit(persisted)?;
        Ok(true)
    }

    /// Register `listener` to be called after every change to the list.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.listeners.add(Arc::new(listener));
        Subscription::new(id, &self.listeners)
    }

    /// Replace the in-memory list with the persisted one and notify listeners.
    ///
    /// This is the full reload other contexts trigger. It never broadcasts.
    /// Without storage there is nothing to re-read and listeners are not called.
    pub fn reload(&self) {
        let Some(storage) = &self.storage else {
            return;
        };

        {
            let _writing = self.writing();
            let fresh = Self::load(storage.as_ref());
            *self.items() = fresh;
        }
        self.listeners.notify();
    }

    /// Drop every listener. The store stays usable.
    pub fn dispose(&self) {
        let count = self.listeners.len();
        self.listeners.clear();
        debug!("Content store disposed ({} listeners dropped)", count);
    }

    pub fn markers(&self) -> Arc<MarkerClock> {
        self.markers.clone()
    }

    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    fn fresh_id(&self, items: &[ContentItem], title: &str) -> String {
        loop {
            let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
            let id = ContentItem::generate_id(title, nonce);
            if !items.iter().any(|item| item.id == id) {
                return id;
            }
        }
    }

    /// Must be called with the write lock held.
    fn persist(&self, payload: &str) -> Result<()> {
        match &self.storage {
            Some(storage) => storage.set(CONTENT_KEY, payload),
            None => Ok(()),
        }
    }

    /// Notify, then mark and broadcast. The in-memory change stands even if
    /// persisting failed; listeners are still told, the marker is not written.
    fn commit(&self, persisted: Result<()>) -> Result<()> {
        self.listeners.notify();

        if let Err(e) = persisted {
            error!("Failed to persist content: {}", e);
            return Err(e);
        }

        let marker = {
            let _writing = self.writing();
            let marker = self.markers.issue();
            if let Some(storage) = &self.storage {
                if let Err(e) = storage.set(REFRESH_KEY, &marker) {
                    warn!("Failed to write refresh marker: {}", e);
                }
            }
            marker
        };
        self.broadcaster.announce(SiteEvent::ContentUpdated { marker });

        Ok(())
    }
}
