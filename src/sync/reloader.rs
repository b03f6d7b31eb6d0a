use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::SiteEvent;
use crate::content::ContentStore;

/// Turns site events into a delayed full reload of the store.
pub struct Reloader {
    store: Arc<ContentStore>,
    remote_delay: Duration,
    local_delay: Duration,
}

impl Reloader {
    pub fn new(store: Arc<ContentStore>, remote_delay: Duration, local_delay: Duration) -> Self {
        Self {
            store,
            remote_delay,
            local_delay,
        }
    }

    fn delay_for(&self, event: &SiteEvent) -> Duration {
        match event {
            SiteEvent::ContentUpdated { .. } => self.local_delay,
            SiteEvent::RemoteRefresh { .. } => self.remote_delay,
        }
    }

    pub async fn run(
        self,
        mut events: broadcast::Receiver<SiteEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            let delay = tokio::select! {
                _ = shutdown.changed() => break,
                received = events.recv() => match received {
                    Ok(event) => {
                        debug!("Reload scheduled for {:?}", event);
                        self.delay_for(&event)
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Reloader lagged behind {} site events", skipped);
                        self.remote_delay
                    }
                    Err(RecvError::Closed) => break,
                },
            };

            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            // Everything that arrived during the grace period is covered by this reload
            loop {
                match events.try_recv() {
                    Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }

            info!("Reloading content");
            self.store.reload();
        }

        debug!("Reloader stopped");
    }
}
