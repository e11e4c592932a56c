use gear_core::enums::{LessonRequestStatus, RequestStatus};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::RequestCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{parse_enum, parse_opt_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox request`.
pub async fn handle(
    action: &RequestCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        RequestCommands::Enrollments { status, limit } => {
            let status = parse_opt_enum::<RequestStatus>(status.as_deref(), "status")?;
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            output(
                &service.list_enrollment_requests(status, limit).await?,
                flags.format,
            )
        }
        RequestCommands::EnrollmentStatus { id, status } => {
            let status = parse_enum::<RequestStatus>(status, "status")?;
            output(
                &service.set_enrollment_request_status(id, status).await?,
                flags.format,
            )
        }
        RequestCommands::Lessons { status, limit } => {
            let status = parse_opt_enum::<LessonRequestStatus>(status.as_deref(), "status")?;
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            output(&service.list_lesson_requests(status, limit).await?, flags.format)
        }
        RequestCommands::LessonStatus { id, status } => {
            let status = parse_enum::<LessonRequestStatus>(status, "status")?;
            output(
                &service.set_lesson_request_status(id, status).await?,
                flags.format,
            )
        }
    }
}
