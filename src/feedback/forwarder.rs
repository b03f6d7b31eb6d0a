use reqwest::Client;
use tracing::{info, warn};

use super::{Envelope, Feedback, FeedbackConfig, HttpRelay, Relay};
use crate::app::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// A provider accepted the message
    Sent { provider: String },
    /// Every provider failed; the envelope was written to the log
    Logged,
}

/// What the visitor is told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackReceipt {
    pub success: bool,
    pub message: String,
    pub delivery: Delivery,
}

impl From<Delivery> for FeedbackReceipt {
    fn from(delivery: Delivery) -> Self {
        // Total failure is still reported as success to the visitor
        let message = match delivery {
            Delivery::Sent { .. } => "Feedback sent successfully",
            Delivery::Logged => "Feedback received and logged",
        };
        Self {
            success: true,
            message: message.to_string(),
            delivery,
        }
    }
}

pub struct FeedbackForwarder {
    config: FeedbackConfig,
    relays: Vec<Box<dyn Relay>>,
}

impl FeedbackForwarder {
    pub fn new(config: FeedbackConfig, relays: Vec<Box<dyn Relay>>) -> Self {
        Self { config, relays }
    }

    /// Build an HTTP relay for every configured provider, in order.
    pub fn from_config(config: &FeedbackConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("geministics/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let relays = config
            .providers
            .iter()
            .map(|provider| {
                HttpRelay::new(client.clone(), provider.clone())
                    .map(|relay| Box::new(relay) as Box<dyn Relay>)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(config.clone(), relays))
    }

    pub fn relay_names(&self) -> Vec<&str> {
        self.relays.iter().map(|relay| relay.name()).collect()
    }

    /// Validate and forward a visitor's message.
    ///
    /// Only invalid input is an error; delivery problems never are.
    pub async fn submit(&self, message: &str, reply_to: Option<&str>) -> Result<FeedbackReceipt> {
        let feedback = Feedback::new(message, reply_to.map(String::from))?;
        let envelope = Envelope::compose(&feedback, &self.config);
        Ok(self.forward(&envelope).await.into())
    }

    pub async fn forward(&self, envelope: &Envelope) -> Delivery {
        for relay in &self.relays {
            match relay.deliver(envelope).await {
                Ok(()) => {
                    info!("Feedback sent via {}", relay.name());
                    return Delivery::Sent {
                        provider: relay.name().to_string(),
                    };
                }
                Err(e) => warn!("Feedback relay {} failed: {}", relay.name(), e),
            }
        }

        warn!(
            recipient = %envelope.recipient,
            subject = %envelope.subject,
            "All feedback relays failed, logging feedback:\n{}",
            envelope.text
        );
        Delivery::Logged
    }
}
