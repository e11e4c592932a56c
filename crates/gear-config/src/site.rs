//! Public site identity and staff notification address.

use serde::{Deserialize, Serialize};

fn default_calendar_product_id() -> String {
    "-//Gearbox//CRM//EN".to_string()
}

fn default_calendar_uid_domain() -> String {
    "gearbox".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Public base URL, used to build calendar feed links.
    #[serde(default)]
    pub url: String,

    /// Staff inbox that receives new-lead and request alerts.
    #[serde(default)]
    pub notification_email: String,

    /// `PRODID` stamped on calendar feeds.
    #[serde(default = "default_calendar_product_id")]
    pub calendar_product_id: String,

    /// Domain part of calendar event UIDs.
    #[serde(default = "default_calendar_uid_domain")]
    pub calendar_uid_domain: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            notification_email: String::new(),
            calendar_product_id: default_calendar_product_id(),
            calendar_uid_domain: default_calendar_uid_domain(),
        }
    }
}

impl SiteConfig {
    /// The staff alert address, when one is configured.
    pub fn notification_email(&self) -> Option<&str> {
        Some(self.notification_email.as_str()).filter(|s| !s.is_empty())
    }

    /// Absolute subscription URL for a calendar feed token.
    pub fn feed_url(&self, token: &str) -> String {
        format!("{}/crm/calendar/{token}", self.url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_notification_email_is_none() {
        let mut config = SiteConfig::default();
        assert_eq!(config.notification_email(), None);
        config.notification_email = "office@example.com".into();
        assert_eq!(config.notification_email(), Some("office@example.com"));
    }

    #[test]
    fn feed_url_joins_cleanly() {
        let config = SiteConfig {
            url: "https://drive.example.com/".into(),
            ..Default::default()
        };
        assert_eq!(
            config.feed_url("abc"),
            "https://drive.example.com/crm/calendar/abc"
        );
    }
}
