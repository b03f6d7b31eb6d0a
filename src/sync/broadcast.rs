use tokio::sync::broadcast;
use tracing::debug;

use super::{Broadcaster, SiteEvent};

const DEFAULT_CAPACITY: usize = 64;

/// In-process event bus backed by a tokio broadcast channel.
pub struct ChannelBroadcaster {
    tx: broadcast::Sender<SiteEvent>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SiteEvent> {
        self.tx.subscribe()
    }
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn announce(&self, event: SiteEvent) {
        if self.tx.send(event).is_err() {
            debug!("No sync receivers for site event");
        }
    }
}

/// Used where nothing listens for site events, e.g. one-shot CLI commands.
pub struct NoopBroadcaster;

impl Broadcaster for NoopBroadcaster {
    fn announce(&self, _event: SiteEvent) {}
}
