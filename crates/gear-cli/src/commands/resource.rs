use gear_core::enums::EntityType;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ResourceCommands;
use crate::context::AppContext;
use crate::output::output;

fn resource_kind(raw: &str) -> anyhow::Result<EntityType> {
    match raw {
        "instructor" | "instructors" => Ok(EntityType::Instructor),
        "vehicle" | "vehicles" => Ok(EntityType::Vehicle),
        "classroom" | "classrooms" => Ok(EntityType::Classroom),
        other => anyhow::bail!(
            "invalid resource kind '{other}': expected instructor, vehicle or classroom"
        ),
    }
}

/// Handle `gearbox resource`.
pub async fn handle(
    action: &ResourceCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        ResourceCommands::AddInstructor { name, email, phone } => output(
            &service
                .create_instructor(name, email.as_deref(), phone.as_deref())
                .await?,
            flags.format,
        ),
        ResourceCommands::AddVehicle {
            name,
            plate,
            transmission,
        } => output(
            &service
                .create_vehicle(name, plate.as_deref(), transmission.as_deref())
                .await?,
            flags.format,
        ),
        ResourceCommands::AddClassroom {
            name,
            location,
            capacity,
        } => output(
            &service
                .create_classroom(name, location.as_deref(), *capacity)
                .await?,
            flags.format,
        ),
        ResourceCommands::List { kind, all } => match resource_kind(kind)? {
            EntityType::Instructor => output(&service.list_instructors(*all).await?, flags.format),
            EntityType::Vehicle => output(&service.list_vehicles(*all).await?, flags.format),
            _ => output(&service.list_classrooms(*all).await?, flags.format),
        },
        ResourceCommands::Deactivate { kind, id } => {
            service.deactivate_resource(resource_kind(kind)?, id).await?;
            output(&json!({ "deactivated": id }), flags.format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_kinds_accept_plurals() {
        assert_eq!(resource_kind("vehicles").unwrap(), EntityType::Vehicle);
        assert_eq!(resource_kind("instructor").unwrap(), EntityType::Instructor);
        assert!(resource_kind("lesson").is_err());
    }
}
