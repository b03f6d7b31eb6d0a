//! Configuration management for Geministics.
//!
//! Configuration is read from `~/.config/geministics/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use crate::auth::PasswordGate;
use crate::feedback::FeedbackConfig;
use crate::sync::SyncConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub sync: SyncConfig,
    pub feedback: FeedbackConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file holding the site's key-value storage
    /// (default: `<data dir>/geministics/site.db`)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Hex SHA-256 of the admin password. Admin commands are refused while unset.
    pub password_sha256: Option<String>,
}

impl AdminConfig {
    pub fn gate(&self) -> Option<PasswordGate> {
        self.password_sha256
            .as_deref()
            .filter(|digest| !digest.trim().is_empty())
            .map(PasswordGate::from_digest)
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/geministics/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("geministics").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Geministics configuration

[storage]
# SQLite file shared by every running instance. Defaults to the
# platform data directory, e.g. ~/.local/share/geministics/site.db
# path = "/srv/geministics/site.db"

[admin]
# Hex SHA-256 of the admin password. Generate one with:
#   printf '%s' 'your password' | sha256sum
# Admin commands are refused until this is set.
# password_sha256 = ""

[sync]
# How often to check whether another instance changed the content (ms)
poll_interval_ms = 500

# Wait before reloading after another instance changed content (ms)
remote_reload_delay_ms = 1000

# Wait before reloading after this instance changed content (ms)
local_reload_delay_ms = 2000

[feedback]
recipient = "owner@geministics.com"
subject = "New Feedback from Geministics Website"
sender = "feedback@geministics.com"
timeout_secs = 10

# Providers are tried in order; the first one that accepts the message wins.
# If all of them fail the message is written to the log.
#
# [[feedback.providers]]
# kind = "resend"
# api_key = "re_..."
#
# [[feedback.providers]]
# kind = "sendgrid"
# api_key = "SG...."
#
# [[feedback.providers]]
# kind = "emailjs"
# service_id = ""
# template_id = ""
# user_id = ""
#
# [[feedback.providers]]
# kind = "formspree"
# form_id = ""
#
# [[feedback.providers]]
# kind = "web3forms"
# access_key = ""
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{hash_password, Authenticator, Credentials};

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.sync, SyncConfig::default());
        assert_eq!(config.feedback, FeedbackConfig::default());
        assert!(config.storage.path.is_none());
        assert!(config.admin.gate().is_none());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[sync]
poll_interval_ms = 250
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.sync.poll_interval_ms, 250);
        assert_eq!(config.sync.remote_reload_delay_ms, 1000);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.sync, SyncConfig::default());
        assert!(config.feedback.providers.is_empty());
    }

    #[test]
    fn test_admin_gate_from_config() {
        let content = format!(
            "[admin]\npassword_sha256 = \"{}\"\n",
            hash_password("geministics2024")
        );
        let config: Config = toml::from_str(&content).unwrap();
        let gate = config.admin.gate().unwrap();
        assert!(gate.verify(&Credentials::new("geministics2024")));
        assert!(!gate.verify(&Credentials::new("guess")));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[storage]\npath = \"/tmp/site.db\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/site.db")));
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sync]\npoll_interval_ms = \"fast\"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
