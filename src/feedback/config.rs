use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::app::Result;

/// Configuration for the feedback relay chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Address feedback is delivered to
    pub recipient: String,

    /// Subject line of every feedback email
    pub subject: String,

    /// From address used by providers that need one
    pub sender: String,

    /// Per-request timeout in seconds (default: 10)
    pub timeout_secs: u64,

    /// Providers, tried in order until one accepts the message
    pub providers: Vec<ProviderConfig>,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            recipient: "owner@geministics.com".to_string(),
            subject: "New Feedback from Geministics Website".to_string(),
            sender: "feedback@geministics.com".to_string(),
            timeout_secs: 10,
            providers: Vec::new(),
        }
    }
}

impl FeedbackConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One third-party email-forwarding provider. `endpoint` overrides the public API URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    Resend {
        api_key: String,
        #[serde(default)]
        endpoint: Option<String>,
    },
    SendGrid {
        api_key: String,
        #[serde(default)]
        endpoint: Option<String>,
    },
    EmailJs {
        service_id: String,
        template_id: String,
        user_id: String,
        #[serde(default)]
        endpoint: Option<String>,
    },
    Formspree {
        form_id: String,
        #[serde(default)]
        endpoint: Option<String>,
    },
    Web3Forms {
        access_key: String,
        #[serde(default)]
        endpoint: Option<String>,
    },
}

impl ProviderConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::Resend { .. } => "resend",
            ProviderConfig::SendGrid { .. } => "sendgrid",
            ProviderConfig::EmailJs { .. } => "emailjs",
            ProviderConfig::Formspree { .. } => "formspree",
            ProviderConfig::Web3Forms { .. } => "web3forms",
        }
    }

    pub fn endpoint(&self) -> Result<Url> {
        let custom = match self {
            ProviderConfig::Resend { endpoint, .. }
            | ProviderConfig::SendGrid { endpoint, .. }
            | ProviderConfig::EmailJs { endpoint, .. }
            | ProviderConfig::Formspree { endpoint, .. }
            | ProviderConfig::Web3Forms { endpoint, .. } => endpoint.as_deref(),
        };

        let url = match custom {
            Some(url) => Url::parse(url)?,
            None => self.default_endpoint()?,
        };
        Ok(url)
    }

    fn default_endpoint(&self) -> Result<Url> {
        let url = match self {
            ProviderConfig::Resend { .. } => Url::parse("https://api.resend.com/emails")?,
            ProviderConfig::SendGrid { .. } => Url::parse("https://api.sendgrid.com/v3/mail/send")?,
            ProviderConfig::EmailJs { .. } => {
                Url::parse("https://api.emailjs.com/api/v1.0/email/send")?
            }
            ProviderConfig::Formspree { form_id, .. } => {
                Url::parse("https://formspree.io/f/")?.join(form_id)?
            }
            ProviderConfig::Web3Forms { .. } => Url::parse("https://api.web3forms.com/submit")?,
        };
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_providers_parse_from_toml() {
        let content = r#"
recipient = "me@example.com"

[[providers]]
kind = "emailjs"
service_id = "svc"
template_id = "tpl"
user_id = "usr"

[[providers]]
kind = "formspree"
form_id = "xpwagdkr"
"#;
        let config: FeedbackConfig = toml::from_str(content).unwrap();
        assert_eq!(config.recipient, "me@example.com");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].name(), "emailjs");
        assert_eq!(config.providers[1].name(), "formspree");
    }

    #[test]
    fn test_unknown_provider_kind_rejected() {
        let content = r#"
[[providers]]
kind = "carrier-pigeon"
"#;
        assert!(toml::from_str::<FeedbackConfig>(content).is_err());
    }

    #[test]
    fn test_default_endpoints() {
        let formspree = ProviderConfig::Formspree {
            form_id: "abc123".into(),
            endpoint: None,
        };
        assert_eq!(
            formspree.endpoint().unwrap().as_str(),
            "https://formspree.io/f/abc123"
        );

        let web3 = ProviderConfig::Web3Forms {
            access_key: "k".into(),
            endpoint: None,
        };
        assert_eq!(
            web3.endpoint().unwrap().as_str(),
            "https://api.web3forms.com/submit"
        );
    }

    #[test]
    fn test_endpoint_override() {
        let resend = ProviderConfig::Resend {
            api_key: "k".into(),
            endpoint: Some("http://127.0.0.1:9999/emails".into()),
        };
        assert_eq!(
            resend.endpoint().unwrap().as_str(),
            "http://127.0.0.1:9999/emails"
        );

        let broken = ProviderConfig::Resend {
            api_key: "k".into(),
            endpoint: Some("not a url".into()),
        };
        assert!(broken.endpoint().is_err());
    }
}
