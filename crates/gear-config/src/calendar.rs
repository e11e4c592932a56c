//! Embedded staff calendar on the dashboard.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CalendarConfig {
    /// Google calendar ID shown on the dashboard.
    #[serde(default)]
    pub google_calendar_id: String,

    /// Explicit embed URL; takes precedence over the derived one.
    #[serde(default)]
    pub google_embed_url: String,

    /// IANA time zone for the embed, e.g. `America/Toronto`.
    #[serde(default)]
    pub time_zone: String,
}

impl CalendarConfig {
    /// Embed URL for the dashboard calendar, if one can be built.
    pub fn embed_url(&self) -> Option<String> {
        if !self.google_embed_url.is_empty() {
            return Some(self.google_embed_url.clone());
        }
        if self.google_calendar_id.is_empty() {
            return None;
        }
        let mut url = format!(
            "https://calendar.google.com/calendar/embed?src={}",
            urlencoding::encode(&self.google_calendar_id)
        );
        if !self.time_zone.is_empty() {
            url.push_str("&ctz=");
            url.push_str(&urlencoding::encode(&self.time_zone));
        }
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_url_is_derived_and_encoded() {
        let config = CalendarConfig {
            google_calendar_id: "office@group.calendar.google.com".into(),
            time_zone: "America/Toronto".into(),
            ..Default::default()
        };
        assert_eq!(
            config.embed_url().as_deref(),
            Some(
                "https://calendar.google.com/calendar/embed?src=office%40group.calendar.google.com&ctz=America%2FToronto"
            )
        );
    }

    #[test]
    fn explicit_url_wins_and_empty_is_none() {
        assert_eq!(CalendarConfig::default().embed_url(), None);
        let config = CalendarConfig {
            google_calendar_id: "ignored".into(),
            google_embed_url: "https://example.com/embed".into(),
            ..Default::default()
        };
        assert_eq!(config.embed_url().as_deref(), Some("https://example.com/embed"));
    }
}
