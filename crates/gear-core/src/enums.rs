//! Status enums, record kinds, and audit actions for Gearbox.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and store the same string in SQL (`as_str()`). Lifecycle enums that staff
//! move forward by hand provide `allowed_next_states()`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! display_as_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

// ---------------------------------------------------------------------------
// Leads and intake
// ---------------------------------------------------------------------------

/// Pipeline stage of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
    Closed,
}

impl LeadStatus {
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::Converted,
        Self::Closed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Converted => "converted",
            Self::Closed => "closed",
        }
    }
}

/// Follow-up task on a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeadTaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl LeadTaskStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

/// Status of a website enrollment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    New,
    Contacted,
    Converted,
    Closed,
}

impl RequestStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Converted => "converted",
            Self::Closed => "closed",
        }
    }
}

/// Status of a website lesson request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LessonRequestStatus {
    New,
    Scheduled,
    Closed,
}

impl LessonRequestStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Scheduled => "scheduled",
            Self::Closed => "closed",
        }
    }
}

// ---------------------------------------------------------------------------
// Students and courses
// ---------------------------------------------------------------------------

/// Kind of document a student uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Id,
    License,
    ProofOfAddress,
    Other,
}

impl DocumentType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::License => "license",
            Self::ProofOfAddress => "proof_of_address",
            Self::Other => "other",
        }
    }
}

/// Catalog category of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CourseType {
    Bde,
    Defensive,
    TestPrep,
    Refresher,
}

impl CourseType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bde => "bde",
            Self::Defensive => "defensive",
            Self::TestPrep => "test_prep",
            Self::Refresher => "refresher",
        }
    }
}

/// How a course session is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    InClass,
    Online,
}

impl DeliveryMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InClass => "in_class",
            Self::Online => "online",
        }
    }
}

/// Kind of course module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    Theory,
    Homework,
    Driving,
}

impl ModuleType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Theory => "theory",
            Self::Homework => "homework",
            Self::Driving => "driving",
        }
    }
}

/// Per-student progress through a course module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

/// Installment cadence of a payment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlanFrequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl PlanFrequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }
}

// ---------------------------------------------------------------------------
// EnrollmentStatus
// ---------------------------------------------------------------------------

/// Payment/progress status of an enrollment.
///
/// ```text
/// pending → paid → active → completed
///         → active        → dropped
///         → dropped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Paid,
    Active,
    Completed,
    Dropped,
}

impl EnrollmentStatus {
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Paid, Self::Active, Self::Dropped],
            Self::Paid => &[Self::Active, Self::Completed, Self::Dropped],
            Self::Active => &[Self::Paid, Self::Completed, Self::Dropped],
            Self::Completed | Self::Dropped => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Whether this enrollment lifts the unpaid-student lesson cap.
    #[must_use]
    pub const fn counts_as_paid(self) -> bool {
        matches!(self, Self::Paid | Self::Completed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Dropped => "dropped",
        }
    }
}

// ---------------------------------------------------------------------------
// Lessons
// ---------------------------------------------------------------------------

/// Kind of lesson.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LessonType {
    Theory,
    #[default]
    Driving,
}

impl LessonType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Theory => "theory",
            Self::Driving => "driving",
        }
    }

    /// Human label used in calendar summaries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Theory => "Theory",
            Self::Driving => "Driving",
        }
    }
}

/// Status of a scheduled lesson.
///
/// ```text
/// scheduled → completed
///           → cancelled
///           → missed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    Scheduled,
    Completed,
    Cancelled,
    Missed,
}

impl LessonStatus {
    pub const ALL: [Self; 4] = [
        Self::Scheduled,
        Self::Completed,
        Self::Cancelled,
        Self::Missed,
    ];

    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Scheduled => &[Self::Completed, Self::Cancelled, Self::Missed],
            Self::Completed | Self::Cancelled | Self::Missed => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Missed => "missed",
        }
    }
}

/// Attendance outcome recorded against a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Attended,
    Missed,
    Cancelled,
    Rescheduled,
}

impl AttendanceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attended => "attended",
            Self::Missed => "missed",
            Self::Cancelled => "cancelled",
            Self::Rescheduled => "rescheduled",
        }
    }
}

/// Resource that two overlapping lessons both claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Instructor,
    Vehicle,
    Classroom,
}

impl ConflictKind {
    /// Check order used when validating a lesson.
    pub const ALL: [Self; 3] = [Self::Instructor, Self::Vehicle, Self::Classroom];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instructor => "instructor",
            Self::Vehicle => "vehicle",
            Self::Classroom => "classroom",
        }
    }

    /// Staff-facing rejection message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Instructor => "Instructor is already booked for this time.",
            Self::Vehicle => "Vehicle is already booked for this time.",
            Self::Classroom => "Classroom is already booked for this time.",
        }
    }

    /// SQL column on `lessons` holding this resource.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Instructor => "instructor_id",
            Self::Vehicle => "vehicle_id",
            Self::Classroom => "classroom_id",
        }
    }
}

// ---------------------------------------------------------------------------
// Billing
// ---------------------------------------------------------------------------

/// Invoice lifecycle.
///
/// ```text
/// draft → issued → paid
///       → void   → overdue → paid
///                → void
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    Paid,
    Overdue,
    Void,
}

impl InvoiceStatus {
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Issued,
        Self::Paid,
        Self::Overdue,
        Self::Void,
    ];

    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Issued, Self::Void],
            Self::Issued => &[Self::Paid, Self::Overdue, Self::Void],
            Self::Overdue => &[Self::Paid, Self::Void],
            Self::Paid | Self::Void => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Issued => "issued",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Void => "void",
        }
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Stripe,
    Square,
    Cash,
    Transfer,
    Other,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::Square => "square",
            Self::Cash => "cash",
            Self::Transfer => "transfer",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    Pending,
    Issued,
    Submitted,
}

impl CertificateStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Issued => "issued",
            Self::Submitted => "submitted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Submitted,
    Failed,
}

impl SubmissionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Failed => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// Communications
// ---------------------------------------------------------------------------

/// Delivery channel for templates, logs, and scheduled messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }
}

/// Status of a one-off communication log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Queued,
    Sent,
    Failed,
}

impl DeliveryStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

/// Status of a message waiting for its due time.
///
/// ```text
/// scheduled → sent
///           → failed
///           → cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Scheduled,
    Sent,
    Failed,
    Cancelled,
}

impl ScheduleStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Scheduled => &[Self::Sent, Self::Failed, Self::Cancelled],
            Self::Sent | Self::Failed | Self::Cancelled => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Kind of automatic reminder; at most one per lesson and kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    #[serde(rename = "lesson_24h")]
    Lesson24h,
}

impl ReminderType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lesson24h => "lesson_24h",
        }
    }
}

// ---------------------------------------------------------------------------
// Staff and notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Who receives a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Every active staff user.
    Staff,
    /// Only the explicitly selected recipients.
    Selected,
}

impl Audience {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Selected => "selected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Admin,
    Manager,
    Instructor,
    Staff,
}

impl StaffRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Instructor => "instructor",
            Self::Staff => "staff",
        }
    }
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Whose lessons a calendar feed publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedType {
    Student,
    Instructor,
}

impl FeedType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CalendarProvider {
    Google,
    Outlook,
}

impl CalendarProvider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Outlook => "outlook",
        }
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of record, used in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Lead,
    LeadNote,
    LeadTask,
    EnrollmentRequest,
    LessonRequest,
    Student,
    StudentDocument,
    Course,
    CourseModule,
    CourseSession,
    PaymentPlan,
    Enrollment,
    ModuleProgress,
    Instructor,
    Vehicle,
    Classroom,
    Lesson,
    Attendance,
    Conflict,
    Invoice,
    Payment,
    Certificate,
    MinistrySubmission,
    Template,
    CommunicationLog,
    ScheduledMessage,
    StaffUser,
    Notification,
    CalendarFeed,
    CalendarAccount,
    BlogPost,
    BlogComment,
    Testimonial,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::LeadNote => "lead_note",
            Self::LeadTask => "lead_task",
            Self::EnrollmentRequest => "enrollment_request",
            Self::LessonRequest => "lesson_request",
            Self::Student => "student",
            Self::StudentDocument => "student_document",
            Self::Course => "course",
            Self::CourseModule => "course_module",
            Self::CourseSession => "course_session",
            Self::PaymentPlan => "payment_plan",
            Self::Enrollment => "enrollment",
            Self::ModuleProgress => "module_progress",
            Self::Instructor => "instructor",
            Self::Vehicle => "vehicle",
            Self::Classroom => "classroom",
            Self::Lesson => "lesson",
            Self::Attendance => "attendance",
            Self::Conflict => "conflict",
            Self::Invoice => "invoice",
            Self::Payment => "payment",
            Self::Certificate => "certificate",
            Self::MinistrySubmission => "ministry_submission",
            Self::Template => "template",
            Self::CommunicationLog => "communication_log",
            Self::ScheduledMessage => "scheduled_message",
            Self::StaffUser => "staff_user",
            Self::Notification => "notification",
            Self::CalendarFeed => "calendar_feed",
            Self::CalendarAccount => "calendar_account",
            Self::BlogPost => "blog_post",
            Self::BlogComment => "blog_comment",
            Self::Testimonial => "testimonial",
        }
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    StatusChanged,
    Deleted,
    Synced,
    Sent,
    Failed,
    Generated,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusChanged => "status_changed",
            Self::Deleted => "deleted",
            Self::Synced => "synced",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Generated => "generated",
        }
    }
}

display_as_str!(
    LeadStatus,
    LeadTaskStatus,
    RequestStatus,
    LessonRequestStatus,
    DocumentType,
    CourseType,
    DeliveryMode,
    ModuleType,
    ProgressStatus,
    PlanFrequency,
    EnrollmentStatus,
    LessonType,
    LessonStatus,
    AttendanceStatus,
    ConflictKind,
    InvoiceStatus,
    PaymentMethod,
    PaymentStatus,
    CertificateStatus,
    SubmissionStatus,
    Channel,
    DeliveryStatus,
    ScheduleStatus,
    ReminderType,
    NotificationLevel,
    Audience,
    StaffRole,
    FeedType,
    CalendarProvider,
    EntityType,
    AuditAction,
);
