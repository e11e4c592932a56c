use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{CourseType, DeliveryMode, ModuleType, PlanFrequency};

/// A catalog course (BDE, defensive driving, ...).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub course_type: CourseType,
    pub description: Option<String>,
    pub hours: u32,
    pub price_cents: i64,
    pub display_order: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CourseModule {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub module_type: ModuleType,
    pub sequence: u32,
    pub hours: u32,
}

/// A dated intake of a course that students enroll into.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CourseSession {
    pub id: String,
    pub course_id: String,
    pub delivery_mode: DeliveryMode,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub capacity: u32,
    pub enrollment_open: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PaymentPlan {
    pub id: String,
    pub course_id: Option<String>,
    pub name: String,
    pub frequency: PlanFrequency,
    pub installments: u32,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// One installment of a payment plan applied to an enrollment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PaymentSchedule {
    pub id: String,
    pub enrollment_id: String,
    pub plan_id: String,
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub amount_cents: i64,
    pub paid: bool,
}
