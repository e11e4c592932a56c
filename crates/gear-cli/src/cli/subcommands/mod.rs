pub mod blog;
pub mod calendar;
pub mod comms;
pub mod course;
pub mod credential;
pub mod enrollment;
pub mod invoice;
pub mod lead;
pub mod lesson;
pub mod notification;
pub mod request;
pub mod resource;
pub mod scheduler;
pub mod staff;
pub mod student;

pub use blog::{BlogCommands, TestimonialCommands};
pub use calendar::CalendarCommands;
pub use comms::CommsCommands;
pub use course::CourseCommands;
pub use credential::{CertificateCommands, MinistryCommands};
pub use enrollment::EnrollmentCommands;
pub use invoice::InvoiceCommands;
pub use lead::LeadCommands;
pub use lesson::LessonCommands;
pub use notification::NotificationCommands;
pub use request::RequestCommands;
pub use resource::ResourceCommands;
pub use scheduler::SchedulerCommands;
pub use staff::StaffCommands;
pub use student::StudentCommands;
