use chrono::{DateTime, Utc};
use clap::Subcommand;

/// Calendar commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CalendarCommands {
    /// Create a feed for a student or an instructor.
    AddFeed {
        #[arg(long, conflicts_with = "instructor")]
        student: Option<String>,
        #[arg(long)]
        instructor: Option<String>,
        #[arg(long)]
        include_past: bool,
    },
    /// List feeds.
    Feeds,
    /// Deactivate a feed.
    DeactivateFeed { id: String },
    /// Print a feed's iCalendar text.
    Render { token: String },
    /// Store provider credentials for a staff user.
    LinkAccount {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        provider: String,
        #[arg(long)]
        account_email: Option<String>,
        #[arg(long)]
        access_token: String,
        #[arg(long)]
        refresh_token: Option<String>,
        #[arg(long)]
        expires_at: Option<DateTime<Utc>>,
        #[arg(long)]
        calendar_id: Option<String>,
    },
    /// List provider accounts.
    Accounts {
        #[arg(long)]
        owner: Option<String>,
    },
    /// Deactivate a provider account.
    UnlinkAccount { id: String },
}
