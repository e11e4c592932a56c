use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    BlogCommands, CalendarCommands, CertificateCommands, CommsCommands, CourseCommands,
    EnrollmentCommands, InvoiceCommands, LeadCommands, LessonCommands, MinistryCommands,
    NotificationCommands, RequestCommands, ResourceCommands, SchedulerCommands, StaffCommands,
    StudentCommands, TestimonialCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create the .gearbox directory for a project.
    Init(InitArgs),
    /// Leads, notes and follow-up tasks.
    Lead {
        #[command(subcommand)]
        action: LeadCommands,
    },
    /// Enrollment and lesson requests from the website.
    Request {
        #[command(subcommand)]
        action: RequestCommands,
    },
    /// Students and their documents.
    Student {
        #[command(subcommand)]
        action: StudentCommands,
    },
    /// Course catalog, sessions and payment plans.
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },
    /// Enrollments and module progress.
    Enrollment {
        #[command(subcommand)]
        action: EnrollmentCommands,
    },
    /// Lessons, attendance and conflicts.
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },
    /// Instructors, vehicles and classrooms.
    Resource {
        #[command(subcommand)]
        action: ResourceCommands,
    },
    /// Invoices and payments.
    Invoice {
        #[command(subcommand)]
        action: InvoiceCommands,
    },
    /// Completion certificates.
    Certificate {
        #[command(subcommand)]
        action: CertificateCommands,
    },
    /// Ministry submissions.
    Ministry {
        #[command(subcommand)]
        action: MinistryCommands,
    },
    /// Templates, queued and scheduled communications.
    Comms {
        #[command(subcommand)]
        action: CommsCommands,
    },
    /// Reminder generation and scheduled delivery.
    Scheduler {
        #[command(subcommand)]
        action: SchedulerCommands,
    },
    /// Staff notifications and receipts.
    Notification {
        #[command(subcommand)]
        action: NotificationCommands,
    },
    /// Staff users.
    Staff {
        #[command(subcommand)]
        action: StaffCommands,
    },
    /// Calendar feeds and provider accounts.
    Calendar {
        #[command(subcommand)]
        action: CalendarCommands,
    },
    /// Blog posts and comments.
    Blog {
        #[command(subcommand)]
        action: BlogCommands,
    },
    /// Testimonials.
    Testimonial {
        #[command(subcommand)]
        action: TestimonialCommands,
    },
    /// Back-office dashboard summary.
    Dashboard,
    /// Query the audit trail.
    Audit(AuditArgs),
    /// Run the HTTP server.
    Serve(ServeArgs),
    /// Load demo data.
    Seed(SeedArgs),
    /// Print the JSON schema of a record or report type.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config.toml.
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub entity_type: Option<String>,
    #[arg(long)]
    pub entity_id: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Bind address, overriding server.host and server.port.
    #[arg(long)]
    pub bind: Option<String>,
    /// Run the reminder scheduler alongside the server.
    #[arg(long)]
    pub with_scheduler: bool,
}

#[derive(Clone, Debug, Args)]
pub struct SeedArgs {
    /// Seed even when students already exist.
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Type name, e.g. lead, lesson, dashboard-summary.
    pub type_name: String,
}
