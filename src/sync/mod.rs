//! Cross-context change propagation.
//!
//! Every mutation in a [`ContentStore`](crate::content::ContentStore) writes a fresh
//! marker under [`REFRESH_KEY`](crate::store::REFRESH_KEY) and announces
//! [`SiteEvent::ContentUpdated`] in its own context. Other contexts notice the marker
//! change through a [`RefreshWatcher`] and announce [`SiteEvent::RemoteRefresh`].
//! A [`Reloader`] turns either event into a delayed full reload.
//!
//! ```text
//! mutation → persist → listeners → marker ─┬→ ContentUpdated ─→ Reloader (2s) → reload
//!                                          └→ other context: RefreshWatcher → RemoteRefresh → Reloader (1s) → reload
//! ```

mod broadcast;
mod config;
mod marker;
mod reloader;
mod watcher;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub use broadcast::{ChannelBroadcaster, NoopBroadcaster};
pub use config::SyncConfig;
pub use marker::MarkerClock;
pub use reloader::Reloader;
pub use watcher::RefreshWatcher;

use crate::content::ContentStore;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteEvent {
    /// This context changed the content.
    ContentUpdated { marker: String },
    /// Another context wrote a new refresh marker.
    RemoteRefresh { marker: String },
}

impl SiteEvent {
    pub fn marker(&self) -> &str {
        match self {
            SiteEvent::ContentUpdated { marker } | SiteEvent::RemoteRefresh { marker } => marker,
        }
    }
}

/// Injectable change notifier.
pub trait Broadcaster: Send + Sync {
    fn announce(&self, event: SiteEvent);
}

/// Handle to the running watcher and reloader tasks.
pub struct SyncHandle {
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SyncHandle {
    /// Stop both tasks and wait for them to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!("Sync task join error: {}", e);
            }
        }
        info!("Sync stopped");
    }
}

/// Spawn the refresh watcher and the reloader for `store` as tokio tasks.
pub fn spawn_sync(
    store: Arc<ContentStore>,
    storage: Arc<dyn KeyValueStore>,
    broadcaster: Arc<ChannelBroadcaster>,
    config: &SyncConfig,
) -> SyncHandle {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let watcher = RefreshWatcher::new(storage, store.markers(), broadcaster.clone());
    let reloader = Reloader::new(store, config.remote_delay(), config.local_delay());
    let events = broadcaster.subscribe();
    let poll_interval = config.poll_interval();

    let watcher_shutdown = shutdown_rx.clone();
    let watcher_task = tokio::spawn(async move {
        watcher.run(poll_interval, watcher_shutdown).await;
    });
    let reloader_task = tokio::spawn(async move {
        reloader.run(events, shutdown_rx).await;
    });

    info!(
        "Sync started (poll every {:?}, reload after {:?} remote / {:?} local)",
        poll_interval,
        config.remote_delay(),
        config.local_delay()
    );

    SyncHandle {
        shutdown_tx,
        tasks: vec![watcher_task, reloader_task],
    }
}
