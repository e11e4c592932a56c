use chrono::NaiveDate;
use clap::Subcommand;

/// Course catalog commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CourseCommands {
    /// Create a course.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        course_type: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value_t = 0)]
        hours: u32,
        /// Price, e.g. 1299.00
        #[arg(long)]
        price: String,
        #[arg(long, default_value_t = 0)]
        display_order: i64,
        #[arg(long)]
        inactive: bool,
    },
    /// Get a course by ID or slug.
    Get { id_or_slug: String },
    /// List courses by display order.
    List {
        #[arg(long)]
        all: bool,
    },
    /// Update a course.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        hours: Option<u32>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        display_order: Option<i64>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Add a module to a course.
    AddModule {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        module_type: String,
        #[arg(long)]
        sequence: u32,
        #[arg(long, default_value_t = 0)]
        hours: u32,
    },
    /// List a course's modules.
    Modules { id: String },
    /// Schedule a session of a course.
    AddSession {
        id: String,
        #[arg(long)]
        delivery_mode: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// 0 means unlimited.
        #[arg(long, default_value_t = 0)]
        capacity: u32,
    },
    /// List a course's sessions.
    Sessions {
        id: String,
        #[arg(long)]
        open_only: bool,
    },
    /// Open or close a session for enrollment.
    SessionOpen {
        session_id: String,
        #[arg(action = clap::ArgAction::Set)]
        open: bool,
    },
    /// Create a payment plan.
    AddPlan {
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        frequency: String,
        #[arg(long)]
        installments: u32,
        #[arg(long)]
        total: String,
    },
    /// List payment plans.
    Plans {
        #[arg(long)]
        course: Option<String>,
    },
}
