use chrono::NaiveDate;
use clap::Subcommand;

/// Enrollment commands.
#[derive(Clone, Debug, Subcommand)]
pub enum EnrollmentCommands {
    /// Enroll a student in a course.
    Create {
        #[arg(long)]
        student: String,
        #[arg(long)]
        course: String,
        #[arg(long)]
        session: Option<String>,
        #[arg(long)]
        plan: Option<String>,
        /// Outstanding balance, e.g. 1299.00
        #[arg(long, default_value = "0")]
        balance: String,
    },
    /// Get an enrollment by ID.
    Get { id: String },
    /// List enrollments.
    List {
        #[arg(long)]
        student: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Set an enrollment's status.
    Status { id: String, status: String },
    /// Generate the installment schedule from a payment plan.
    ApplyPlan {
        id: String,
        #[arg(long)]
        plan: String,
        #[arg(long)]
        first_due: NaiveDate,
    },
    /// Show the installment schedule.
    Schedule { id: String },
    /// Mark an installment paid.
    PayInstallment { schedule_id: String },
    /// Record progress on a course module.
    Progress {
        id: String,
        #[arg(long)]
        module: String,
        #[arg(long)]
        status: String,
    },
    /// List module progress.
    ProgressList { id: String },
}
