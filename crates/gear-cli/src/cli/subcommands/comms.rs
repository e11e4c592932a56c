use chrono::{DateTime, Utc};
use clap::Subcommand;

/// Communication commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CommsCommands {
    /// Create a template.
    AddTemplate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        channel: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        body: String,
    },
    /// Replace a template's subject and body.
    EditTemplate {
        id: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        body: String,
    },
    /// Delete a template.
    DeleteTemplate { id: String },
    /// List templates.
    Templates {
        #[arg(long)]
        channel: Option<String>,
    },
    /// Queue a templated communication.
    Queue {
        #[arg(long)]
        template: String,
        #[arg(long)]
        channel: String,
        #[arg(long)]
        lead: Option<String>,
        #[arg(long)]
        student: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// List communication log rows.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Deliver every queued communication.
    SendQueued,
    /// Schedule a message for later delivery.
    Schedule {
        #[arg(long)]
        channel: String,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        #[arg(long)]
        template: Option<String>,
        #[arg(long)]
        lead: Option<String>,
        #[arg(long)]
        student: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, default_value = "")]
        body: String,
    },
    /// List scheduled messages.
    Scheduled {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Cancel a scheduled message.
    Cancel { id: String },
}
