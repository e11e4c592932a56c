use gear_core::enums::{LeadStatus, LeadTaskStatus};
use gear_db::repos::lead::NewLead;
use gear_db::updates::lead::LeadUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::LeadCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{parse_enum, parse_opt_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox lead`.
pub async fn handle(
    action: &LeadCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        LeadCommands::Create {
            first_name,
            last_name,
            email,
            phone,
            source,
            interest,
            notes,
        } => {
            let lead = service
                .create_lead(NewLead {
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    email: email.clone(),
                    phone: phone.clone(),
                    source: source.clone(),
                    interest: interest.clone(),
                    notes: notes.clone(),
                })
                .await?;
            output(&lead, flags.format)
        }
        LeadCommands::Get { id } => {
            let lead = service.get_lead(id).await?;
            let notes = service.list_lead_notes(id).await?;
            let tasks = service.list_lead_tasks(id).await?;
            output(
                &json!({ "lead": lead, "notes": notes, "tasks": tasks }),
                flags.format,
            )
        }
        LeadCommands::List {
            status,
            search,
            limit,
        } => {
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            let leads = if let Some(query) = search {
                service.search_leads(query, limit).await?
            } else {
                let status = parse_opt_enum::<LeadStatus>(status.as_deref(), "status")?;
                service.list_leads(status, limit).await?
            };
            output(&leads, flags.format)
        }
        LeadCommands::Update {
            id,
            first_name,
            last_name,
            email,
            phone,
            interest,
            notes,
        } => {
            let mut update = LeadUpdateBuilder::new();
            if let Some(value) = first_name {
                update = update.first_name(value);
            }
            if let Some(value) = last_name {
                update = update.last_name(value);
            }
            if email.is_some() {
                update = update.email(email.clone());
            }
            if phone.is_some() {
                update = update.phone(phone.clone());
            }
            if interest.is_some() {
                update = update.interest(interest.clone());
            }
            if notes.is_some() {
                update = update.notes(notes.clone());
            }
            let lead = service.update_lead(id, update.build()).await?;
            output(&lead, flags.format)
        }
        LeadCommands::Status { id, status } => {
            let status = parse_enum::<LeadStatus>(status, "status")?;
            let lead = service.set_lead_status(id, status).await?;
            output(&lead, flags.format)
        }
        LeadCommands::Convert { id } => {
            let student = service.convert_lead(id).await?;
            output(&student, flags.format)
        }
        LeadCommands::Delete { id } => {
            service.delete_lead(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        LeadCommands::Note { id, body, author } => {
            let author = author.as_deref().or(ctx.service.settings().actor.as_deref());
            let note = service.add_lead_note(id, body, author).await?;
            output(&note, flags.format)
        }
        LeadCommands::Notes { id } => output(&service.list_lead_notes(id).await?, flags.format),
        LeadCommands::Task {
            id,
            title,
            due,
            assign,
        } => {
            let task = service
                .create_lead_task(id, title, *due, assign.as_deref())
                .await?;
            output(&task, flags.format)
        }
        LeadCommands::TaskStatus { task_id, status } => {
            let status = parse_enum::<LeadTaskStatus>(status, "task status")?;
            let task = service.set_lead_task_status(task_id, status).await?;
            output(&task, flags.format)
        }
        LeadCommands::Tasks { id } => output(&service.list_lead_tasks(id).await?, flags.format),
    }
}
