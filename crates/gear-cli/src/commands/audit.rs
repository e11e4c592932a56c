use gear_core::enums::{AuditAction, EntityType};
use gear_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_opt_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox audit`.
pub async fn handle(args: &AuditArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = AuditFilter {
        entity_type: parse_opt_enum::<EntityType>(args.entity_type.as_deref(), "entity type")?,
        entity_id: args.entity_id.clone(),
        action: parse_opt_enum::<AuditAction>(args.action.as_deref(), "action")?,
        limit: Some(effective_limit(args.limit, flags.limit, ctx.default_limit())),
    };
    let entries = ctx.service.query_audit(&filter).await?;
    output(&entries, flags.format)
}
