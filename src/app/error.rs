use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Content not found: {0}")]
    ContentNotFound(String),

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Invalid feedback: {0}")]
    InvalidFeedback(String),

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("Relay {provider} failed: {reason}")]
    Relay { provider: String, reason: String },

    #[error("Admin password required")]
    Unauthorized,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SiteError>;
