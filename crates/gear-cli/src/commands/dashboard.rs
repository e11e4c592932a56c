use chrono::Utc;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox dashboard`.
pub async fn handle(ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let summary = ctx.service.dashboard(Utc::now()).await?;
    output(&summary, flags.format)
}
