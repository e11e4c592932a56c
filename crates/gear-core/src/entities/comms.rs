use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Channel, DeliveryStatus, ReminderType, ScheduleStatus};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CommunicationTemplate {
    pub id: String,
    pub name: String,
    pub channel: Channel,
    /// Email subject; unused for SMS.
    pub subject: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A one-off communication queued by staff, then delivered by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CommunicationLog {
    pub id: String,
    pub channel: Channel,
    pub template_id: Option<String>,
    pub lead_id: Option<String>,
    pub student_id: Option<String>,
    pub recipient_email: Option<String>,
    pub recipient_phone: Option<String>,
    pub status: DeliveryStatus,
    pub error_message: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A message with a due time, delivered by the scheduler once due.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ScheduledMessage {
    pub id: String,
    pub channel: Channel,
    pub template_id: Option<String>,
    pub lead_id: Option<String>,
    pub student_id: Option<String>,
    pub recipient_email: Option<String>,
    pub recipient_phone: Option<String>,
    pub subject: Option<String>,
    pub body: String,
    pub scheduled_for: DateTime<Utc>,
    pub status: ScheduleStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Marker that a reminder was generated for a lesson.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReminderLog {
    pub id: String,
    pub lesson_id: String,
    pub reminder_type: ReminderType,
    pub scheduled_for: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
