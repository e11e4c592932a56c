use clap::Subcommand;

/// Scheduler commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SchedulerCommands {
    /// Generate reminders and deliver due messages once.
    RunOnce,
    /// Run passes periodically until interrupted.
    Loop {
        /// Overrides scheduler.interval_secs.
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}
