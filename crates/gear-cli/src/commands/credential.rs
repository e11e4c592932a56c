use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{CertificateCommands, MinistryCommands};
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox certificate`.
pub async fn handle_certificate(
    action: &CertificateCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        CertificateCommands::Issue { enrollments } => {
            let issued = ctx.service.issue_certificates(enrollments).await?;
            tracing::info!(requested = enrollments.len(), issued, "certificates issued");
            output(
                &json!({ "requested": enrollments.len(), "issued": issued }),
                flags.format,
            )
        }
        CertificateCommands::Get { enrollment } => {
            output(&ctx.service.get_certificate(enrollment).await?, flags.format)
        }
    }
}

/// Handle `gearbox ministry`.
pub async fn handle_ministry(
    action: &MinistryCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        MinistryCommands::Submit { enrollments } => {
            let submitted = ctx.service.submit_ministry(enrollments).await?;
            tracing::info!(requested = enrollments.len(), submitted, "ministry reports submitted");
            output(
                &json!({ "requested": enrollments.len(), "submitted": submitted }),
                flags.format,
            )
        }
        MinistryCommands::Get { enrollment } => output(
            &ctx.service.get_ministry_submission(enrollment).await?,
            flags.format,
        ),
    }
}
