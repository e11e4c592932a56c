use chrono::Utc;
use gear_core::enums::{Channel, DeliveryStatus, ScheduleStatus};
use gear_db::repos::comms::{NewCommunication, NewScheduledMessage, NewTemplate};
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::CommsCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{parse_enum, parse_opt_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox comms`.
pub async fn handle(
    action: &CommsCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        CommsCommands::AddTemplate {
            name,
            channel,
            subject,
            body,
        } => {
            let template = service
                .create_template(NewTemplate {
                    name: name.clone(),
                    channel: parse_enum::<Channel>(channel, "channel")?,
                    subject: subject.clone(),
                    body: body.clone(),
                })
                .await?;
            output(&template, flags.format)
        }
        CommsCommands::EditTemplate { id, subject, body } => output(
            &service
                .update_template(id, subject.as_deref(), body)
                .await?,
            flags.format,
        ),
        CommsCommands::DeleteTemplate { id } => {
            service.delete_template(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        CommsCommands::Templates { channel } => {
            let channel = parse_opt_enum::<Channel>(channel.as_deref(), "channel")?;
            output(&service.list_templates(channel).await?, flags.format)
        }
        CommsCommands::Queue {
            template,
            channel,
            lead,
            student,
            email,
            phone,
        } => {
            let log = service
                .queue_communication(NewCommunication {
                    channel: parse_enum::<Channel>(channel, "channel")?,
                    template_id: Some(template.clone()),
                    lead_id: lead.clone(),
                    student_id: student.clone(),
                    recipient_email: email.clone(),
                    recipient_phone: phone.clone(),
                })
                .await?;
            output(&log, flags.format)
        }
        CommsCommands::List { status, limit } => {
            let status = parse_opt_enum::<DeliveryStatus>(status.as_deref(), "status")?;
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            output(&service.list_communications(status, limit).await?, flags.format)
        }
        CommsCommands::SendQueued => {
            let report = ctx.dispatcher()?.send_queued_communications().await?;
            output(&report, flags.format)
        }
        CommsCommands::Schedule {
            channel,
            at,
            template,
            lead,
            student,
            email,
            phone,
            subject,
            body,
        } => {
            let channel = parse_enum::<Channel>(channel, "channel")?;
            if template.is_none() && body.trim().is_empty() {
                anyhow::bail!("a scheduled message needs --body or --template");
            }
            let message = service
                .schedule_message(NewScheduledMessage {
                    channel,
                    template_id: template.clone(),
                    lead_id: lead.clone(),
                    student_id: student.clone(),
                    recipient_email: email.clone(),
                    recipient_phone: phone.clone(),
                    subject: subject.clone(),
                    body: body.clone(),
                    scheduled_for: at.unwrap_or_else(Utc::now),
                })
                .await?;
            output(&message, flags.format)
        }
        CommsCommands::Scheduled { status, limit } => {
            let status = parse_opt_enum::<ScheduleStatus>(status.as_deref(), "status")?;
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            output(
                &service.list_scheduled_messages(status, limit).await?,
                flags.format,
            )
        }
        CommsCommands::Cancel { id } => {
            output(&service.cancel_scheduled_message(id).await?, flags.format)
        }
    }
}
