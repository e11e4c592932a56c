//! Entity structs for all Gearbox records.
//!
//! Each entity maps to a table in the libSQL database (see
//! `gear-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON output and schema dumps.
//! Money is stored in integer cents.

mod audit;
mod billing;
mod calendar;
mod comms;
mod course;
mod credential;
mod enrollment;
mod lead;
mod marketing;
mod notification;
mod scheduling;
mod student;

pub use audit::AuditEntry;
pub use billing::{Invoice, Payment};
pub use calendar::{CalendarAccount, CalendarFeed};
pub use comms::{CommunicationLog, CommunicationTemplate, ReminderLog, ScheduledMessage};
pub use course::{Course, CourseModule, CourseSession, PaymentPlan, PaymentSchedule};
pub use credential::{Certificate, MinistrySubmission};
pub use enrollment::{Enrollment, ModuleProgress};
pub use lead::{EnrollmentRequest, Lead, LeadNote, LeadTask, LessonRequest};
pub use marketing::{BlogComment, BlogPost, Testimonial};
pub use notification::{InboxItem, Notification, NotificationReceipt, StaffUser};
pub use scheduling::{Classroom, ConflictDetection, Instructor, Lesson, LessonAttendance, Vehicle};
pub use student::{Student, StudentDocument};
