use clap::Subcommand;

/// Website request commands.
#[derive(Clone, Debug, Subcommand)]
pub enum RequestCommands {
    /// List enrollment requests.
    Enrollments {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Set an enrollment request's status.
    EnrollmentStatus { id: String, status: String },
    /// List lesson requests.
    Lessons {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Set a lesson request's status.
    LessonStatus { id: String, status: String },
}
