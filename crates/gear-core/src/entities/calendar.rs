use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{CalendarProvider, FeedType};

/// A tokenized iCalendar subscription URL.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CalendarFeed {
    pub id: String,
    pub token: String,
    pub feed_type: FeedType,
    pub student_id: Option<String>,
    pub instructor_id: Option<String>,
    pub include_past: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Stored OAuth credentials for a staff user's external calendar.
///
/// Tokens are never serialized into command output.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CalendarAccount {
    pub id: String,
    pub owner_id: String,
    pub provider: CalendarProvider,
    pub account_email: Option<String>,
    #[serde(default, skip_serializing)]
    pub access_token: String,
    #[serde(default, skip_serializing)]
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub calendar_id: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
