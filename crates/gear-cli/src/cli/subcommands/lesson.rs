use chrono::{DateTime, Utc};
use clap::Subcommand;

/// Lesson commands.
#[derive(Clone, Debug, Subcommand)]
pub enum LessonCommands {
    /// Book a lesson after checking for conflicts.
    Schedule {
        #[arg(long)]
        student: String,
        #[arg(long)]
        enrollment: Option<String>,
        #[arg(long)]
        instructor: Option<String>,
        #[arg(long)]
        vehicle: Option<String>,
        #[arg(long)]
        classroom: Option<String>,
        #[arg(long, default_value = "driving")]
        lesson_type: String,
        #[arg(long)]
        start: DateTime<Utc>,
        /// Defaults to one hour after start.
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Check a booking for conflicts without writing it.
    Check {
        #[arg(long)]
        student: String,
        #[arg(long)]
        instructor: Option<String>,
        #[arg(long)]
        vehicle: Option<String>,
        #[arg(long)]
        classroom: Option<String>,
        #[arg(long)]
        start: DateTime<Utc>,
        #[arg(long)]
        end: Option<DateTime<Utc>>,
    },
    /// Move or reassign a lesson.
    Reschedule {
        id: String,
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        #[arg(long)]
        instructor: Option<String>,
        #[arg(long)]
        vehicle: Option<String>,
        #[arg(long)]
        classroom: Option<String>,
    },
    /// Get a lesson by ID.
    Get { id: String },
    /// List lessons.
    List {
        #[arg(long)]
        student: Option<String>,
        #[arg(long)]
        instructor: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        from: Option<DateTime<Utc>>,
        #[arg(long)]
        to: Option<DateTime<Utc>>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Next scheduled lessons.
    Upcoming {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Set a lesson's status.
    Status { id: String, status: String },
    /// Delete a lesson.
    Delete { id: String },
    /// Record attendance.
    Attend {
        id: String,
        status: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Record conflicts for the given lessons.
    DetectConflicts { ids: Vec<String> },
    /// List recorded conflicts.
    Conflicts {
        #[arg(long)]
        all: bool,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Resolve a recorded conflict.
    ResolveConflict {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
}
