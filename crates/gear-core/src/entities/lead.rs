use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{LeadStatus, LeadTaskStatus, LessonRequestStatus, RequestStatus};

/// A prospective customer captured from a website form or entered by staff.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Lead {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub interest: Option<String>,
    pub status: LeadStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LeadNote {
    pub id: String,
    pub lead_id: String,
    pub body: String,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A follow-up item on a lead (call back, send pricing, ...).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LeadTask {
    pub id: String,
    pub lead_id: String,
    pub title: String,
    pub due_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub status: LeadTaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// "Apply now" request from the pricing page.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EnrollmentRequest {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub package: Option<String>,
    pub preferred_location: Option<String>,
    pub preferred_schedule: Option<String>,
    pub notes: Option<String>,
    pub lead_id: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LessonRequest {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time: Option<String>,
    pub notes: Option<String>,
    pub lead_id: Option<String>,
    pub status: LessonRequestStatus,
    pub created_at: DateTime<Utc>,
}
