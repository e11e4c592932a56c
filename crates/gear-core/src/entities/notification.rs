use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Audience, NotificationLevel, StaffRole};

/// A back-office user who can receive notifications.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StaffUser {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: StaffRole,
    pub is_staff: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl StaffUser {
    /// Whether this user belongs to the `staff` audience.
    #[must_use]
    pub const fn is_active_staff(&self) -> bool {
        self.is_staff && self.active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub body: String,
    pub level: NotificationLevel,
    pub audience: Audience,
    pub link: Option<String>,
    pub active: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-user read state of a notification.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NotificationReceipt {
    pub id: String,
    pub notification_id: String,
    pub user_id: String,
    pub read_at: Option<DateTime<Utc>>,
    pub dismissed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A receipt joined with its notification, as shown in a user's inbox.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct InboxItem {
    pub receipt_id: String,
    pub notification_id: String,
    pub title: String,
    pub body: String,
    pub level: NotificationLevel,
    pub link: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
