use gear_core::entities::{
    AuditEntry, BlogPost, CalendarFeed, Certificate, CommunicationLog, CommunicationTemplate,
    ConflictDetection, Course, CourseSession, Enrollment, EnrollmentRequest, InboxItem, Invoice,
    Lead, Lesson, LessonRequest, MinistrySubmission, Notification, NotificationReceipt, Payment,
    PaymentPlan, PaymentSchedule, ScheduledMessage, StaffUser, Student, Testimonial,
};
use gear_core::forms::{ContactForm, EnrollmentRequestForm, LessonRequestForm};
use gear_core::responses::{DashboardSummary, DispatchReport, SchedulerReport, SyncReport};
use schemars::{Schema, schema_for};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Names accepted by `gearbox schema`.
pub const TYPE_NAMES: &[&str] = &[
    "audit-entry",
    "blog-post",
    "calendar-feed",
    "certificate",
    "communication-log",
    "communication-template",
    "conflict",
    "contact-form",
    "course",
    "course-session",
    "dashboard-summary",
    "dispatch-report",
    "enrollment",
    "enrollment-request",
    "enrollment-request-form",
    "inbox-item",
    "invoice",
    "lead",
    "lesson",
    "lesson-request",
    "lesson-request-form",
    "ministry-submission",
    "notification",
    "notification-receipt",
    "payment",
    "payment-plan",
    "payment-schedule",
    "scheduled-message",
    "scheduler-report",
    "staff-user",
    "student",
    "sync-report",
    "testimonial",
];

/// Handle `gearbox schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = schema_by_name(&args.type_name)?;
    output(&schema, flags.format)
}

fn schema_by_name(raw: &str) -> anyhow::Result<Schema> {
    let name = raw.trim().to_ascii_lowercase().replace('_', "-");
    let schema = match name.as_str() {
        "audit-entry" => schema_for!(AuditEntry),
        "blog-post" => schema_for!(BlogPost),
        "calendar-feed" => schema_for!(CalendarFeed),
        "certificate" => schema_for!(Certificate),
        "communication-log" => schema_for!(CommunicationLog),
        "communication-template" => schema_for!(CommunicationTemplate),
        "conflict" => schema_for!(ConflictDetection),
        "contact-form" => schema_for!(ContactForm),
        "course" => schema_for!(Course),
        "course-session" => schema_for!(CourseSession),
        "dashboard-summary" => schema_for!(DashboardSummary),
        "dispatch-report" => schema_for!(DispatchReport),
        "enrollment" => schema_for!(Enrollment),
        "enrollment-request" => schema_for!(EnrollmentRequest),
        "enrollment-request-form" => schema_for!(EnrollmentRequestForm),
        "inbox-item" => schema_for!(InboxItem),
        "invoice" => schema_for!(Invoice),
        "lead" => schema_for!(Lead),
        "lesson" => schema_for!(Lesson),
        "lesson-request" => schema_for!(LessonRequest),
        "lesson-request-form" => schema_for!(LessonRequestForm),
        "ministry-submission" => schema_for!(MinistrySubmission),
        "notification" => schema_for!(Notification),
        "notification-receipt" => schema_for!(NotificationReceipt),
        "payment" => schema_for!(Payment),
        "payment-plan" => schema_for!(PaymentPlan),
        "payment-schedule" => schema_for!(PaymentSchedule),
        "scheduled-message" => schema_for!(ScheduledMessage),
        "scheduler-report" => schema_for!(SchedulerReport),
        "staff-user" => schema_for!(StaffUser),
        "student" => schema_for!(Student),
        "sync-report" => schema_for!(SyncReport),
        "testimonial" => schema_for!(Testimonial),
        _ => anyhow::bail!(
            "unknown schema type '{raw}'. Known types: {}",
            TYPE_NAMES.join(", ")
        ),
    };
    Ok(schema)
}
