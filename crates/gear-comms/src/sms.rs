//! SMS delivery through a JSON webhook.

use std::time::Duration;

use async_trait::async_trait;
use gear_config::SmsConfig;
use serde::Serialize;

use crate::error::CommsError;
use crate::http::check_response;
use crate::transport::{OutgoingSms, SmsGateway};

/// Request body posted to the webhook.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct WebhookPayload<'a> {
    to: &'a str,
    message: &'a str,
}

/// Posts `{"to": ..., "message": ...}` to the configured URL.
pub struct WebhookSms {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl WebhookSms {
    /// # Errors
    ///
    /// Returns `CommsError::Http` if the HTTP client cannot be built.
    pub fn from_config(config: &SmsConfig) -> Result<Self, CommsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.webhook_url.trim().to_string(),
            token: Some(config.webhook_token.trim().to_string()).filter(|t| !t.is_empty()),
        })
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }
}

#[async_trait]
impl SmsGateway for WebhookSms {
    async fn send(&self, sms: &OutgoingSms) -> Result<(), CommsError> {
        if !self.is_configured() {
            return Err(CommsError::NotConfigured(
                "SMS webhook is not configured".into(),
            ));
        }
        let payload = WebhookPayload {
            to: &sms.to,
            message: &sms.body,
        };
        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        check_response(request.send().await?).await?;
        tracing::debug!(to = %sms.to, "sms sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn unconfigured_webhook_fails_with_message() {
        let gateway = WebhookSms::from_config(&SmsConfig::default()).unwrap();
        let err = gateway
            .send(&OutgoingSms {
                to: "+15550100".into(),
                body: "hi".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CommsError::NotConfigured(_)));
        assert_eq!(err.to_string(), "SMS webhook is not configured");
    }

    #[test]
    fn blank_token_is_dropped() {
        let gateway = WebhookSms::from_config(&SmsConfig {
            webhook_url: " https://sms.example.com/send ".into(),
            webhook_token: "  ".into(),
            timeout_secs: 5,
        })
        .unwrap();
        assert!(gateway.is_configured());
        assert_eq!(gateway.url, "https://sms.example.com/send");
        assert_eq!(gateway.token, None);
    }

    #[test]
    fn payload_uses_message_key() {
        let payload = WebhookPayload {
            to: "+15550100",
            message: "Lesson reminder",
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"to": "+15550100", "message": "Lesson reminder"})
        );
    }
}
