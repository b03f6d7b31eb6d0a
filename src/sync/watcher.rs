use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{Broadcaster, MarkerClock, SiteEvent};
use crate::store::{KeyValueStore, REFRESH_KEY};

/// Polls the refresh marker and announces changes written by other contexts.
pub struct RefreshWatcher {
    storage: Arc<dyn KeyValueStore>,
    markers: Arc<MarkerClock>,
    broadcaster: Arc<dyn Broadcaster>,
    last_seen: Option<String>,
}

impl RefreshWatcher {
    /// The marker present at construction is the baseline and never triggers a refresh.
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        markers: Arc<MarkerClock>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        let last_seen = match storage.get(REFRESH_KEY) {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not read refresh marker baseline: {}", e);
                None
            }
        };

        Self {
            storage,
            markers,
            broadcaster,
            last_seen,
        }
    }

    /// Check the marker once. Returns the event announced, if any.
    pub fn poll(&mut self) -> Option<SiteEvent> {
        let current = match self.storage.get(REFRESH_KEY) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read refresh marker: {}", e);
                return None;
            }
        };

        if current == self.last_seen {
            return None;
        }
        self.last_seen = current.clone();

        let marker = current?;
        if self.markers.is_own(&marker) {
            debug!("Ignoring own refresh marker {}", marker);
            return None;
        }

        info!("Content changed in another context (marker {})", marker);
        let event = SiteEvent::RemoteRefresh { marker };
        self.broadcaster.announce(event.clone());
        Some(event)
    }

    pub async fn run(mut self, poll_interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    self.poll();
                }
            }
        }

        debug!("Refresh watcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::sync::NoopBroadcaster;

    fn watcher(storage: &MemoryStore, markers: Arc<MarkerClock>) -> RefreshWatcher {
        RefreshWatcher::new(Arc::new(storage.clone()), markers, Arc::new(NoopBroadcaster))
    }

    #[test]
    fn test_existing_marker_is_baseline() {
        let storage = MemoryStore::new();
        storage.set(REFRESH_KEY, "100").unwrap();
        let mut w = watcher(&storage, Arc::new(MarkerClock::new()));
        assert!(w.poll().is_none());
    }

    #[test]
    fn test_foreign_marker_announces_once() {
        let storage = MemoryStore::new();
        let mut w = watcher(&storage, Arc::new(MarkerClock::new()));

        storage.set(REFRESH_KEY, "200").unwrap();
        assert_eq!(
            w.poll(),
            Some(SiteEvent::RemoteRefresh {
                marker: "200".into()
            })
        );
        assert!(w.poll().is_none());
    }

    #[test]
    fn test_own_marker_is_ignored() {
        let storage = MemoryStore::new();
        let markers = Arc::new(MarkerClock::new());
        let mut w = watcher(&storage, markers.clone());

        let own = markers.issue();
        storage.set(REFRESH_KEY, &own).unwrap();
        assert!(w.poll().is_none());

        storage.set(REFRESH_KEY, "1").unwrap();
        assert!(w.poll().is_some());
    }

    #[test]
    fn test_removed_marker_is_not_a_refresh() {
        let storage = MemoryStore::new();
        storage.set(REFRESH_KEY, "5").unwrap();
        let mut w = watcher(&storage, Arc::new(MarkerClock::new()));

        storage.remove(REFRESH_KEY).unwrap();
        assert!(w.poll().is_none());
    }
}
