use chrono::{DateTime, Utc};
use clap::Subcommand;

/// Lead commands.
#[derive(Clone, Debug, Subcommand)]
pub enum LeadCommands {
    /// Create a lead.
    Create {
        #[arg(long)]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        interest: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Get a lead by ID.
    Get { id: String },
    /// List leads, newest first.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Update lead fields.
    Update {
        id: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        interest: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Move a lead through the pipeline.
    Status { id: String, status: String },
    /// Convert a lead into a student.
    Convert { id: String },
    /// Delete a lead.
    Delete { id: String },
    /// Add a note.
    Note {
        id: String,
        body: String,
        #[arg(long)]
        author: Option<String>,
    },
    /// List notes.
    Notes { id: String },
    /// Create a follow-up task.
    Task {
        id: String,
        title: String,
        #[arg(long)]
        due: Option<DateTime<Utc>>,
        #[arg(long)]
        assign: Option<String>,
    },
    /// Set a task's status.
    TaskStatus { task_id: String, status: String },
    /// List a lead's tasks.
    Tasks { id: String },
}
