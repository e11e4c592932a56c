use chrono::Utc;
use gear_core::enums::CalendarProvider;
use gear_db::repos::calendar::{CalendarCredentials, NewCalendarFeed};
use serde_json::json;

use crate::cli::subcommands::CalendarCommands;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::{output, output_text};

/// Handle `gearbox calendar`.
pub async fn handle(
    action: &CalendarCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        CalendarCommands::AddFeed {
            student,
            instructor,
            include_past,
        } => {
            let mut new = match (student, instructor) {
                (Some(student), None) => NewCalendarFeed::for_student(student.clone()),
                (None, Some(instructor)) => NewCalendarFeed::for_instructor(instructor.clone()),
                _ => anyhow::bail!("pass exactly one of --student or --instructor"),
            };
            new.include_past = *include_past;
            let feed = service.create_calendar_feed(new).await?;
            let url = ctx
                .config
                .site
                .url
                .trim_end_matches('/')
                .to_string();
            output(
                &json!({
                    "feed": feed,
                    "url": format!("{url}/crm/calendar/{}", feed.token),
                }),
                flags.format,
            )
        }
        CalendarCommands::Feeds => output(&service.list_calendar_feeds().await?, flags.format),
        CalendarCommands::DeactivateFeed { id } => {
            service.deactivate_calendar_feed(id).await?;
            output(&json!({ "deactivated": id }), flags.format)
        }
        CalendarCommands::Render { token } => {
            let ics = service.render_feed(token, Utc::now()).await?;
            match flags.format {
                OutputFormat::Raw | OutputFormat::Table => {
                    output_text(&ics);
                    Ok(())
                }
                OutputFormat::Json => output(&json!({ "ics": ics }), flags.format),
            }
        }
        CalendarCommands::LinkAccount {
            owner,
            provider,
            account_email,
            access_token,
            refresh_token,
            expires_at,
            calendar_id,
        } => {
            let account = service
                .upsert_calendar_account(CalendarCredentials {
                    owner_id: owner.clone(),
                    provider: parse_enum::<CalendarProvider>(provider, "provider")?,
                    account_email: account_email.clone(),
                    access_token: access_token.clone(),
                    refresh_token: refresh_token.clone(),
                    token_expires_at: *expires_at,
                    calendar_id: calendar_id.clone(),
                })
                .await?;
            output(&account, flags.format)
        }
        CalendarCommands::Accounts { owner } => output(
            &service.list_calendar_accounts(owner.as_deref()).await?,
            flags.format,
        ),
        CalendarCommands::UnlinkAccount { id } => {
            service.deactivate_calendar_account(id).await?;
            output(&json!({ "deactivated": id }), flags.format)
        }
    }
}
