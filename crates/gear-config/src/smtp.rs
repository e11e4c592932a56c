//! Outgoing mail server configuration.

use serde::{Deserialize, Serialize};

const fn default_port() -> u16 {
    465
}

const fn default_use_ssl() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Upgrade a plaintext connection with STARTTLS.
    #[serde(default)]
    pub use_tls: bool,

    /// Connect with implicit TLS (SMTPS).
    #[serde(default = "default_use_ssl")]
    pub use_ssl: bool,

    /// Sender address on every outgoing email.
    #[serde(default)]
    pub from_email: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            username: String::new(),
            password: String::new(),
            use_tls: false,
            use_ssl: default_use_ssl(),
            from_email: String::new(),
        }
    }
}

impl SmtpConfig {
    /// Check if a host and sender address are set.
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty() && !self.from_email.is_empty()
    }

    /// Check if the server should be authenticated against.
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = SmtpConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.port, 465);
        assert!(config.use_ssl);
        assert!(!config.use_tls);
        assert!(!config.has_credentials());
    }

    #[test]
    fn configured_when_host_and_sender_set() {
        let config = SmtpConfig {
            host: "smtp.example.com".into(),
            from_email: "office@example.com".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }
}
