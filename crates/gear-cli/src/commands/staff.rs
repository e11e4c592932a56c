use gear_core::enums::StaffRole;
use gear_db::repos::staff::NewStaffUser;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::StaffCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox staff`.
pub async fn handle(
    action: &StaffCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        StaffCommands::Add {
            username,
            full_name,
            email,
            role,
            not_staff,
        } => {
            let user = service
                .create_staff_user(NewStaffUser {
                    full_name: full_name.clone(),
                    email: email.clone(),
                    role: parse_enum::<StaffRole>(role, "role")?,
                    is_staff: !not_staff,
                    ..NewStaffUser::staff(username.clone())
                })
                .await?;
            output(&user, flags.format)
        }
        StaffCommands::Get { id } => output(&service.get_staff_user(id).await?, flags.format),
        StaffCommands::List => output(&service.list_staff_users().await?, flags.format),
        StaffCommands::Activate { id } => {
            output(&service.set_staff_active(id, true).await?, flags.format)
        }
        StaffCommands::Deactivate { id } => {
            output(&service.set_staff_active(id, false).await?, flags.format)
        }
    }
}
