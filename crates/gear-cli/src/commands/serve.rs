use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use gear_server::AppState;
use gear_server::stripe::WebhookVerifier;
use serde_json::json;
use tokio::sync::watch;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ServeArgs;
use crate::commands::scheduler::shutdown_signal;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox serve`.
///
/// One Ctrl-C stops both the server and, when requested, the scheduler loop.
pub async fn handle(args: &ServeArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let address = args
        .bind
        .clone()
        .unwrap_or_else(|| ctx.config.server.bind_address());
    if !ctx.config.stripe.can_verify_webhooks() {
        tracing::warn!("stripe.webhook_secret is empty; webhook requests will be rejected");
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(true);
    });

    let scheduler = if args.with_scheduler {
        let dispatcher = ctx.dispatcher()?;
        let every = Duration::from_secs(ctx.config.scheduler.interval_secs.max(1));
        let stop = stopped(stop_rx.clone());
        Some(tokio::spawn(async move {
            dispatcher.run_scheduler_loop(every, stop).await;
        }))
    } else {
        None
    };

    let state = AppState::new(
        Arc::clone(&ctx.service),
        WebhookVerifier::from_config(&ctx.config.stripe),
    );
    if !flags.quiet {
        eprintln!("gearbox listening on {address}; press Ctrl-C to stop");
    }
    gear_server::serve(state, &address, stopped(stop_rx))
        .await
        .with_context(|| format!("HTTP server on {address} failed"))?;

    if let Some(handle) = scheduler {
        handle.await.context("scheduler task panicked")?;
    }
    output(&json!({ "stopped": true, "address": address }), flags.format)
}

/// Resolves once the stop flag flips, or when the sender is gone.
async fn stopped(mut rx: watch::Receiver<bool>) {
    loop {
        let stop = *rx.borrow_and_update();
        if stop || rx.changed().await.is_err() {
            return;
        }
    }
}
