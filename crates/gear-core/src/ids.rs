//! ID prefix constants.
//!
//! Every row ID is `{prefix}-{8 hex chars}`, generated in SQL by
//! `GearDb::generate_id`.

pub const PREFIX_LEAD: &str = "led";
pub const PREFIX_LEAD_NOTE: &str = "lnt";
pub const PREFIX_LEAD_TASK: &str = "ltk";
pub const PREFIX_ENROLLMENT_REQUEST: &str = "erq";
pub const PREFIX_LESSON_REQUEST: &str = "lrq";
pub const PREFIX_STUDENT: &str = "stu";
pub const PREFIX_STUDENT_DOCUMENT: &str = "sdc";
pub const PREFIX_COURSE: &str = "crs";
pub const PREFIX_COURSE_MODULE: &str = "cmd";
pub const PREFIX_COURSE_SESSION: &str = "cse";
pub const PREFIX_PAYMENT_PLAN: &str = "ppl";
pub const PREFIX_PAYMENT_SCHEDULE: &str = "psc";
pub const PREFIX_ENROLLMENT: &str = "enr";
pub const PREFIX_MODULE_PROGRESS: &str = "mpg";
pub const PREFIX_INSTRUCTOR: &str = "ins";
pub const PREFIX_VEHICLE: &str = "veh";
pub const PREFIX_CLASSROOM: &str = "cls";
pub const PREFIX_LESSON: &str = "lsn";
pub const PREFIX_ATTENDANCE: &str = "att";
pub const PREFIX_CONFLICT: &str = "cfd";
pub const PREFIX_INVOICE: &str = "inv";
pub const PREFIX_PAYMENT: &str = "pay";
pub const PREFIX_CERTIFICATE: &str = "crt";
pub const PREFIX_MINISTRY_SUBMISSION: &str = "mns";
pub const PREFIX_TEMPLATE: &str = "tpl";
pub const PREFIX_COMMUNICATION_LOG: &str = "clg";
pub const PREFIX_SCHEDULED_MESSAGE: &str = "sch";
pub const PREFIX_REMINDER_LOG: &str = "rml";
pub const PREFIX_STAFF_USER: &str = "usr";
pub const PREFIX_NOTIFICATION: &str = "ntf";
pub const PREFIX_RECEIPT: &str = "rcp";
pub const PREFIX_CALENDAR_FEED: &str = "cfe";
pub const PREFIX_CALENDAR_ACCOUNT: &str = "cac";
pub const PREFIX_BLOG_POST: &str = "blg";
pub const PREFIX_BLOG_COMMENT: &str = "bcm";
pub const PREFIX_TESTIMONIAL: &str = "tst";
pub const PREFIX_AUDIT: &str = "aud";

/// Every prefix in use, for uniqueness and format checks.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_LEAD,
    PREFIX_LEAD_NOTE,
    PREFIX_LEAD_TASK,
    PREFIX_ENROLLMENT_REQUEST,
    PREFIX_LESSON_REQUEST,
    PREFIX_STUDENT,
    PREFIX_STUDENT_DOCUMENT,
    PREFIX_COURSE,
    PREFIX_COURSE_MODULE,
    PREFIX_COURSE_SESSION,
    PREFIX_PAYMENT_PLAN,
    PREFIX_PAYMENT_SCHEDULE,
    PREFIX_ENROLLMENT,
    PREFIX_MODULE_PROGRESS,
    PREFIX_INSTRUCTOR,
    PREFIX_VEHICLE,
    PREFIX_CLASSROOM,
    PREFIX_LESSON,
    PREFIX_ATTENDANCE,
    PREFIX_CONFLICT,
    PREFIX_INVOICE,
    PREFIX_PAYMENT,
    PREFIX_CERTIFICATE,
    PREFIX_MINISTRY_SUBMISSION,
    PREFIX_TEMPLATE,
    PREFIX_COMMUNICATION_LOG,
    PREFIX_SCHEDULED_MESSAGE,
    PREFIX_REMINDER_LOG,
    PREFIX_STAFF_USER,
    PREFIX_NOTIFICATION,
    PREFIX_RECEIPT,
    PREFIX_CALENDAR_FEED,
    PREFIX_CALENDAR_ACCOUNT,
    PREFIX_BLOG_POST,
    PREFIX_BLOG_COMMENT,
    PREFIX_TESTIMONIAL,
    PREFIX_AUDIT,
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::ALL_PREFIXES;

    #[test]
    fn prefixes_are_unique_three_letter_codes() {
        let mut seen = HashSet::new();
        for prefix in ALL_PREFIXES {
            assert_eq!(prefix.len(), 3, "prefix '{prefix}' should be 3 chars");
            assert!(prefix.chars().all(|c| c.is_ascii_lowercase()));
            assert!(seen.insert(*prefix), "duplicate prefix '{prefix}'");
        }
    }
}
