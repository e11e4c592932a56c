use clap::Subcommand;

/// Staff notification commands.
#[derive(Clone, Debug, Subcommand)]
pub enum NotificationCommands {
    /// Create a notification and fan it out.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long, default_value = "info")]
        level: String,
        /// Selecting recipients switches the audience to `selected`.
        #[arg(long = "recipient")]
        recipients: Vec<String>,
        #[arg(long)]
        link: Option<String>,
    },
    /// Get a notification.
    Get { id: String },
    /// List notifications.
    List {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Reconcile receipts with the audience.
    Sync { id: String },
    /// Replace the explicit recipients.
    Recipients {
        id: String,
        #[arg(required = true)]
        users: Vec<String>,
    },
    /// Activate notifications.
    Activate {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Deactivate notifications.
    Deactivate {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// List a notification's receipts.
    Receipts { id: String },
    /// A user's inbox.
    Inbox {
        user: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// A user's unread count.
    Unread { user: String },
    /// Mark one receipt read for its user.
    Read { receipt: String, user: String },
    /// Mark every receipt read for a user.
    ReadAll { user: String },
    /// Clear a receipt's read state.
    MarkUnread { receipt: String },
    /// Dismiss a receipt.
    Dismiss { receipt: String },
    /// Undo a dismissal.
    Undismiss { receipt: String },
}
