//! Feedback form relay.
//!
//! A visitor's message is rendered into an [`Envelope`] and handed to a chain of
//! third-party email-forwarding providers ([`Relay`]s), first success wins.
//! Delivery is best-effort: when every provider fails the envelope is logged and
//! the visitor is still told the feedback was received.
//!
//! ```rust,ignore
//! let forwarder = FeedbackForwarder::from_config(&config.feedback)?;
//! let receipt = forwarder.submit("Lovely poems", Some("reader@example.com")).await?;
//! assert!(receipt.success);
//! ```

mod config;
mod forwarder;
mod providers;

pub use config::{FeedbackConfig, ProviderConfig};
pub use forwarder::{Delivery, FeedbackForwarder, FeedbackReceipt};
pub use providers::HttpRelay;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::app::{Result, SiteError};

const NOT_PROVIDED: &str = "Not provided";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub message: String,
    pub reply_to: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Feedback {
    pub fn new(message: impl Into<String>, reply_to: Option<String>) -> Result<Self> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(SiteError::InvalidFeedback("message must not be empty".into()));
        }
        let reply_to = reply_to
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());

        Ok(Self {
            message,
            reply_to,
            timestamp: Utc::now(),
        })
    }
}

/// A feedback message rendered for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub recipient: String,
    pub sender: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub message: String,
    pub reply_to: Option<String>,
    pub timestamp: String,
}

impl Envelope {
    pub fn compose(feedback: &Feedback, config: &FeedbackConfig) -> Self {
        let timestamp = feedback.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string();
        let reply_to = feedback.reply_to.as_deref().unwrap_or(NOT_PROVIDED);

        let text = format!(
            "New feedback received from Geministics website:\n\n\
             Timestamp: {}\n\
             User Email: {}\n\n\
             Feedback:\n{}\n\n\
             ---\n\
             Sent from Geministics Website Feedback Form",
            timestamp, reply_to, feedback.message
        );

        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #7c3aed;">New Feedback from Geministics</h2>
  <div style="background: #f8fafc; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <p><strong>Timestamp:</strong> {}</p>
    <p><strong>User Email:</strong> {}</p>
  </div>
  <div style="background: #ffffff; padding: 20px; border: 1px solid #e2e8f0; border-radius: 8px;">
    <h3 style="margin-top: 0;">Feedback:</h3>
    <p style="white-space: pre-wrap; line-height: 1.6;">{}</p>
  </div>
  <p style="color: #64748b; font-size: 14px; text-align: center;">Sent from Geministics Website Feedback Form</p>
</div>"#,
            timestamp,
            html_escape::encode_text(reply_to),
            html_escape::encode_text(&feedback.message)
        );

        Self {
            recipient: config.recipient.clone(),
            sender: config.sender.clone(),
            subject: config.subject.clone(),
            text,
            html,
            message: feedback.message.clone(),
            reply_to: feedback.reply_to.clone(),
            timestamp,
        }
    }
}

/// One way of getting an envelope to the site owner.
#[async_trait]
pub trait Relay: Send + Sync {
    fn name(&self) -> &str;
    async fn deliver(&self, envelope: &Envelope) -> Result<()>;
}
