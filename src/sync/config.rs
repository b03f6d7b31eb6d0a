use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing for cross-context refreshes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How often the refresh marker is polled (default: 500)
    pub poll_interval_ms: u64,

    /// Grace delay before reloading after another context changed content (default: 1000)
    pub remote_reload_delay_ms: u64,

    /// Grace delay before reloading after this context changed content (default: 2000)
    pub local_reload_delay_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            remote_reload_delay_ms: 1000,
            local_reload_delay_ms: 2000,
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        // A zero interval would make tokio's interval panic
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn remote_delay(&self) -> Duration {
        Duration::from_millis(self.remote_reload_delay_ms)
    }

    pub fn local_delay(&self) -> Duration {
        Duration::from_millis(self.local_reload_delay_ms)
    }
}
