//! Stripe webhook configuration.

use serde::{Deserialize, Serialize};

fn default_currency() -> String {
    "cad".to_string()
}

/// Maximum age of a signed webhook timestamp, in seconds.
const fn default_tolerance_secs() -> i64 {
    300
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeConfig {
    #[serde(default)]
    pub secret_key: String,

    #[serde(default)]
    pub publishable_key: String,

    /// Endpoint signing secret (`whsec_...`).
    #[serde(default)]
    pub webhook_secret: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_tolerance_secs")]
    pub tolerance_secs: i64,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            publishable_key: String::new(),
            webhook_secret: String::new(),
            currency: default_currency(),
            tolerance_secs: default_tolerance_secs(),
        }
    }
}

impl StripeConfig {
    /// Check if incoming webhook signatures can be verified.
    pub fn can_verify_webhooks(&self) -> bool {
        !self.webhook_secret.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StripeConfig::default();
        assert!(!config.can_verify_webhooks());
        assert_eq!(config.currency, "cad");
        assert_eq!(config.tolerance_secs, 300);
    }
}
