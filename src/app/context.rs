use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

use crate::app::error::{Result, SiteError};
use crate::auth::{AdminSession, Credentials};
use crate::config::Config;
use crate::content::ContentStore;
use crate::feedback::FeedbackForwarder;
use crate::store::{KeyValueStore, MemoryStore, SqliteStore};
use crate::sync::{self, ChannelBroadcaster, SyncHandle};

pub struct AppContext {
    pub config: Config,
    pub store: Arc<ContentStore>,
    pub storage: Option<Arc<dyn KeyValueStore>>,
    pub broadcaster: Arc<ChannelBroadcaster>,
}

impl AppContext {
    /// Open the SQLite storage (`db_path`, else the configured path, else the
    /// default one). If no storage can be opened the site runs on the seed list only.
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Self {
        let opened = db_path
            .or_else(|| config.storage.path.clone())
            .map(Ok)
            .unwrap_or_else(Self::default_db_path)
            .and_then(SqliteStore::new);

        match opened {
            Ok(storage) => Self::with_storage(config, Arc::new(storage)),
            Err(e) => {
                warn!("Persistent storage unavailable, running on seed content: {}", e);
                Self::ephemeral(config)
            }
        }
    }

    pub fn with_storage(config: Config, storage: Arc<dyn KeyValueStore>) -> Self {
        let broadcaster = Arc::new(ChannelBroadcaster::default());
        let store = Arc::new(ContentStore::open(storage.clone(), broadcaster.clone()));

        Self {
            config,
            store,
            storage: Some(storage),
            broadcaster,
        }
    }

    pub fn in_memory(config: Config) -> Self {
        Self::with_storage(config, Arc::new(MemoryStore::new()))
    }

    pub fn ephemeral(config: Config) -> Self {
        Self {
            config,
            store: Arc::new(ContentStore::ephemeral()),
            storage: None,
            broadcaster: Arc::new(ChannelBroadcaster::default()),
        }
    }

    /// Log in with `password` against the configured admin gate.
    pub fn admin_session(&self, password: Option<&str>) -> Result<AdminSession> {
        let gate = self.config.admin.gate().ok_or_else(|| {
            SiteError::Config("no admin password configured (admin.password_sha256)".into())
        })?;
        let password = password.ok_or(SiteError::Unauthorized)?;

        let mut session = AdminSession::new();
        session.login(&gate, &Credentials::new(password));
        session.require()?;
        Ok(session)
    }

    /// Start cross-context sync. `None` when running without storage.
    pub fn spawn_sync(&self) -> Option<SyncHandle> {
        let storage = self.storage.clone()?;
        Some(sync::spawn_sync(
            self.store.clone(),
            storage,
            self.broadcaster.clone(),
            &self.config.sync,
        ))
    }

    pub fn feedback_forwarder(&self) -> Result<FeedbackForwarder> {
        FeedbackForwarder::from_config(&self.config.feedback)
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| SiteError::Config("Could not find data directory".into()))?;
        let site_dir = data_dir.join("geministics");
        std::fs::create_dir_all(&site_dir)?;
        Ok(site_dir.join("site.db"))
    }
}
