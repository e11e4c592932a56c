//! SMS webhook configuration.

use serde::{Deserialize, Serialize};

const fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// Endpoint that accepts `{"to": ..., "message": ...}` JSON posts.
    #[serde(default)]
    pub webhook_url: String,

    /// Bearer token sent with each post, if set.
    #[serde(default)]
    pub webhook_token: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            webhook_token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SmsConfig {
    pub fn is_configured(&self) -> bool {
        !self.webhook_url.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = SmsConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.timeout_secs, 30);
    }
}
