//! Report and response types returned as JSON by `gearbox` commands and the HTTP API.

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Lead, Lesson, Payment};

/// Result of reconciling a notification's receipts with its audience.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SyncReport {
    pub added: u32,
    pub removed: u32,
}

/// Result of `gearbox comms send-queued`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: u32,
    pub failed: u32,
}

/// Result of one scheduler pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SchedulerReport {
    pub reminders_enqueued: u32,
    pub sent: u32,
    pub failed: u32,
}

/// Count of batch items processed, e.g. certificates issued.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: u32,
    pub skipped: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusCount {
    pub status: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: u32,
}

/// Headline numbers on the back-office dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DashboardKpis {
    pub total_students: u32,
    /// Completed payments since the start of the current month, in cents.
    pub revenue_this_month_cents: i64,
    pub new_leads_this_month: u32,
    pub pending_enrollment_requests: u32,
}

/// Response from `gearbox dashboard`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DashboardSummary {
    pub generated_at: DateTime<Utc>,
    pub kpis: DashboardKpis,
    pub leads_by_status: Vec<StatusCount>,
    pub invoices_by_status: Vec<StatusCount>,
    pub lessons_by_status: Vec<StatusCount>,
    pub lessons_next_7_days: Vec<DayCount>,
    pub recent_leads: Vec<Lead>,
    pub upcoming_lessons: Vec<Lesson>,
    pub recent_payments: Vec<Payment>,
    pub calendar_embed_url: Option<String>,
}
