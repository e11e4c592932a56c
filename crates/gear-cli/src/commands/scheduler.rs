use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SchedulerCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox scheduler`.
pub async fn handle(
    action: &SchedulerCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let dispatcher = ctx.dispatcher()?;
    match action {
        SchedulerCommands::RunOnce => {
            let report = dispatcher.run_scheduler(Utc::now()).await?;
            output(&report, flags.format)
        }
        SchedulerCommands::Loop { interval_secs } => {
            let every = interval_secs.unwrap_or(ctx.config.scheduler.interval_secs).max(1);
            if !flags.quiet {
                eprintln!("scheduler running every {every}s; press Ctrl-C to stop");
            }
            dispatcher
                .run_scheduler_loop(Duration::from_secs(every), shutdown_signal())
                .await;
            output(&json!({ "stopped": true }), flags.format)
        }
    }
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
