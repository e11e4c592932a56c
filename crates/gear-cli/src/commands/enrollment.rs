use gear_core::enums::{EnrollmentStatus, ProgressStatus};
use gear_db::repos::enrollment::NewEnrollment;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::EnrollmentCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{parse_amount, parse_enum, parse_opt_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox enrollment`.
pub async fn handle(
    action: &EnrollmentCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        EnrollmentCommands::Create {
            student,
            course,
            session,
            plan,
            balance,
        } => {
            let enrollment = service
                .create_enrollment(NewEnrollment {
                    student_id: student.clone(),
                    course_id: course.clone(),
                    session_id: session.clone(),
                    payment_plan_id: plan.clone(),
                    balance_cents: parse_amount(balance, "balance")?,
                })
                .await?;
            output(&enrollment, flags.format)
        }
        EnrollmentCommands::Get { id } => {
            let enrollment = service.get_enrollment(id).await?;
            let progress = service.list_module_progress(id).await?;
            let schedule = service.list_payment_schedule(id).await?;
            output(
                &json!({
                    "enrollment": enrollment,
                    "progress": progress,
                    "payment_schedule": schedule,
                }),
                flags.format,
            )
        }
        EnrollmentCommands::List {
            student,
            status,
            limit,
        } => {
            let status = parse_opt_enum::<EnrollmentStatus>(status.as_deref(), "status")?;
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            output(
                &service
                    .list_enrollments(student.as_deref(), status, limit)
                    .await?,
                flags.format,
            )
        }
        EnrollmentCommands::Status { id, status } => {
            let status = parse_enum::<EnrollmentStatus>(status, "status")?;
            output(&service.set_enrollment_status(id, status).await?, flags.format)
        }
        EnrollmentCommands::ApplyPlan {
            id,
            plan,
            first_due,
        } => output(
            &service.apply_payment_plan(id, plan, *first_due).await?,
            flags.format,
        ),
        EnrollmentCommands::Schedule { id } => {
            output(&service.list_payment_schedule(id).await?, flags.format)
        }
        EnrollmentCommands::PayInstallment { schedule_id } => {
            service.mark_installment_paid(schedule_id).await?;
            output(&json!({ "paid": schedule_id }), flags.format)
        }
        EnrollmentCommands::Progress { id, module, status } => {
            let status = parse_enum::<ProgressStatus>(status, "progress status")?;
            output(
                &service.set_module_progress(id, module, status).await?,
                flags.format,
            )
        }
        EnrollmentCommands::ProgressList { id } => {
            output(&service.list_module_progress(id).await?, flags.format)
        }
    }
}
