use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{Envelope, ProviderConfig, Relay};
use crate::app::{Result, SiteError};

/// A provider reached with a single JSON POST.
pub struct HttpRelay {
    client: Client,
    provider: ProviderConfig,
    endpoint: Url,
}

/// Web3Forms answers 200 with `success: false` on rejected submissions.
#[derive(Debug, Deserialize)]
struct Web3FormsReply {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

impl HttpRelay {
    pub fn new(client: Client, provider: ProviderConfig) -> Result<Self> {
        let endpoint = provider.endpoint()?;
        Ok(Self {
            client,
            provider,
            endpoint,
        })
    }

    fn bearer_token(&self) -> Option<&str> {
        match &self.provider {
            ProviderConfig::Resend { api_key, .. } | ProviderConfig::SendGrid { api_key, .. } => {
                Some(api_key)
            }
            _ => None,
        }
    }

    fn body(&self, envelope: &Envelope) -> Value {
        let reply_to = envelope.reply_to.as_deref();

        match &self.provider {
            ProviderConfig::Resend { .. } => {
                let mut body = json!({
                    "from": envelope.sender,
                    "to": [envelope.recipient],
                    "subject": envelope.subject,
                    "text": envelope.text,
                    "html": envelope.html,
                });
                if let Some(reply_to) = reply_to {
                    body["reply_to"] = json!(reply_to);
                }
                body
            }
            ProviderConfig::SendGrid { .. } => json!({
                "personalizations": [{
                    "to": [{ "email": envelope.recipient }],
                    "subject": envelope.subject,
                }],
                "from": { "email": envelope.sender },
                "content": [
                    { "type": "text/plain", "value": envelope.text },
                    { "type": "text/html", "value": envelope.html },
                ],
            }),
            ProviderConfig::EmailJs {
                service_id,
                template_id,
                user_id,
                ..
            } => json!({
                "service_id": service_id,
                "template_id": template_id,
                "user_id": user_id,
                "template_params": {
                    "to_email": envelope.recipient,
                    "subject": envelope.subject,
                    "message": envelope.message,
                    "user_email": reply_to.unwrap_or("Not provided"),
                    "timestamp": envelope.timestamp,
                },
            }),
            ProviderConfig::Formspree { .. } => json!({
                "email": reply_to.unwrap_or("anonymous@geministics.com"),
                "message": format!("{}\n\nTo: {}", envelope.text, envelope.recipient),
                "subject": envelope.subject,
                "_replyto": reply_to.unwrap_or("noreply@geministics.com"),
                "_subject": envelope.subject,
            }),
            ProviderConfig::Web3Forms { access_key, .. } => json!({
                "access_key": access_key,
                "subject": envelope.subject,
                "email": reply_to.unwrap_or("noreply@geministics.com"),
                "name": "Geministics Feedback",
                "message": envelope.text,
                "to": envelope.recipient,
                "from_name": "Geministics Website",
                "redirect": "false",
            }),
        }
    }

    fn failure(&self, reason: impl Into<String>) -> SiteError {
        SiteError::Relay {
            provider: self.provider.name().to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Relay for HttpRelay {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<()> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&self.body(envelope));

        if let Some(token) = self.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.failure(format!("HTTP {}", status)));
        }

        if let ProviderConfig::Web3Forms { .. } = self.provider {
            let reply: Web3FormsReply = response.json().await?;
            if !reply.success {
                return Err(self.failure(
                    reply
                        .message
                        .unwrap_or_else(|| "submission rejected".to_string()),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{Feedback, FeedbackConfig};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn envelope(reply_to: Option<&str>) -> Envelope {
        let feedback = Feedback::new("Beautiful site", reply_to.map(String::from)).unwrap();
        Envelope::compose(&feedback, &FeedbackConfig::default())
    }

    #[tokio::test]
    async fn test_resend_posts_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test"))
            .and(body_partial_json(json!({
                "to": ["owner@geministics.com"],
                "reply_to": "reader@example.com",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let relay = HttpRelay::new(
            Client::new(),
            ProviderConfig::Resend {
                api_key: "re_test".into(),
                endpoint: Some(format!("{}/emails", server.uri())),
            },
        )
        .unwrap();

        relay
            .deliver(&envelope(Some("reader@example.com")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let relay = HttpRelay::new(
            Client::new(),
            ProviderConfig::Formspree {
                form_id: "f1".into(),
                endpoint: Some(format!("{}/f/f1", server.uri())),
            },
        )
        .unwrap();

        let err = relay.deliver(&envelope(None)).await.unwrap_err();
        assert!(matches!(err, SiteError::Relay { ref provider, .. } if provider == "formspree"));
    }

    #[tokio::test]
    async fn test_web3forms_rejection_in_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .and(body_partial_json(json!({ "access_key": "k", "redirect": "false" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": false, "message": "Invalid key" })),
            )
            .mount(&server)
            .await;

        let relay = HttpRelay::new(
            Client::new(),
            ProviderConfig::Web3Forms {
                access_key: "k".into(),
                endpoint: Some(format!("{}/submit", server.uri())),
            },
        )
        .unwrap();

        let err = relay.deliver(&envelope(None)).await.unwrap_err();
        assert!(err.to_string().contains("Invalid key"));
    }

    #[test]
    fn test_emailjs_body_carries_raw_message() {
        let relay = HttpRelay::new(
            Client::new(),
            ProviderConfig::EmailJs {
                service_id: "svc".into(),
                template_id: "tpl".into(),
                user_id: "usr".into(),
                endpoint: None,
            },
        )
        .unwrap();

        let body = relay.body(&envelope(None));
        assert_eq!(body["service_id"], "svc");
        assert_eq!(body["template_params"]["message"], "Beautiful site");
        assert_eq!(body["template_params"]["user_email"], "Not provided");
        assert!(relay.bearer_token().is_none());
    }

    #[test]
    fn test_formspree_body_defaults_anonymous_sender() {
        let relay = HttpRelay::new(
            Client::new(),
            ProviderConfig::Formspree {
                form_id: "f1".into(),
                endpoint: None,
            },
        )
        .unwrap();

        let body = relay.body(&envelope(None));
        assert_eq!(body["email"], "anonymous@geministics.com");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .ends_with("To: owner@geministics.com"));
    }
}
