use clap::Subcommand;

/// Staff user commands.
#[derive(Clone, Debug, Subcommand)]
pub enum StaffCommands {
    /// Add a staff user.
    Add {
        username: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value = "staff")]
        role: String,
        /// Exclude from staff-wide notifications.
        #[arg(long)]
        not_staff: bool,
    },
    /// Get a staff user.
    Get { id: String },
    /// List staff users.
    List,
    /// Activate a user.
    Activate { id: String },
    /// Deactivate a user.
    Deactivate { id: String },
}
