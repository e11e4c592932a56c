use gear_core::enums::{Audience, NotificationLevel};
use gear_db::repos::notification::NewNotification;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::NotificationCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox notification`.
pub async fn handle(
    action: &NotificationCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        NotificationCommands::Create {
            title,
            body,
            level,
            recipients,
            link,
        } => {
            let audience = if recipients.is_empty() {
                Audience::Staff
            } else {
                Audience::Selected
            };
            let notification = service
                .create_notification(NewNotification {
                    level: parse_enum::<NotificationLevel>(level, "level")?,
                    audience,
                    link: link.clone(),
                    created_by: service.settings().actor.clone(),
                    recipients: recipients.clone(),
                    ..NewNotification::for_staff(title.clone(), body.clone())
                })
                .await?;
            let receipts = service.list_notification_receipts(&notification.id).await?;
            output(
                &json!({ "notification": notification, "receipts": receipts.len() }),
                flags.format,
            )
        }
        NotificationCommands::Get { id } => {
            let notification = service.get_notification(id).await?;
            let receipts = service.list_notification_receipts(id).await?;
            output(
                &json!({ "notification": notification, "receipts": receipts }),
                flags.format,
            )
        }
        NotificationCommands::List { limit } => {
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            output(&service.list_notifications(limit).await?, flags.format)
        }
        NotificationCommands::Sync { id } => {
            output(&service.sync_receipts(id).await?, flags.format)
        }
        NotificationCommands::Recipients { id, users } => output(
            &service.set_notification_recipients(id, users).await?,
            flags.format,
        ),
        NotificationCommands::Activate { ids } => {
            let updated = service.set_notification_active(ids, true).await?;
            output(&json!({ "updated": updated }), flags.format)
        }
        NotificationCommands::Deactivate { ids } => {
            let updated = service.set_notification_active(ids, false).await?;
            output(&json!({ "updated": updated }), flags.format)
        }
        NotificationCommands::Receipts { id } => output(
            &service.list_notification_receipts(id).await?,
            flags.format,
        ),
        NotificationCommands::Inbox { user, limit } => {
            let items = service
                .list_receipts(user, limit.or(flags.limit).map(i64::from))
                .await?;
            output(&json!({ "items": items }), flags.format)
        }
        NotificationCommands::Unread { user } => output(
            &json!({ "unread_count": service.unread_count(user).await? }),
            flags.format,
        ),
        NotificationCommands::Read { receipt, user } => {
            let read_at = service.mark_read(receipt, user).await?;
            output(&json!({ "ok": true, "read_at": read_at }), flags.format)
        }
        NotificationCommands::ReadAll { user } => {
            let updated = service.mark_all_read(user).await?;
            output(&json!({ "ok": true, "updated": updated }), flags.format)
        }
        NotificationCommands::MarkUnread { receipt } => {
            output(&service.mark_unread(receipt).await?, flags.format)
        }
        NotificationCommands::Dismiss { receipt } => {
            output(&service.dismiss(receipt).await?, flags.format)
        }
        NotificationCommands::Undismiss { receipt } => {
            output(&service.clear_dismiss(receipt).await?, flags.format)
        }
    }
}
