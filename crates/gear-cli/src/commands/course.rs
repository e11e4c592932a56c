use gear_core::enums::{CourseType, DeliveryMode, ModuleType, PlanFrequency};
use gear_db::repos::course::{NewCourse, NewCourseSession, NewPaymentPlan};
use gear_db::updates::course::CourseUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::CourseCommands;
use crate::commands::shared::parse::{parse_amount, parse_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox course`.
pub async fn handle(
    action: &CourseCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        CourseCommands::Create {
            name,
            course_type,
            description,
            hours,
            price,
            display_order,
            inactive,
        } => {
            let course = service
                .create_course(NewCourse {
                    name: name.clone(),
                    course_type: parse_enum::<CourseType>(course_type, "course type")?,
                    description: description.clone(),
                    hours: *hours,
                    price_cents: parse_amount(price, "price")?,
                    display_order: *display_order,
                    active: !inactive,
                })
                .await?;
            output(&course, flags.format)
        }
        CourseCommands::Get { id_or_slug } => {
            let course = match service.get_course(id_or_slug).await {
                Ok(course) => course,
                Err(gear_db::error::DatabaseError::NoResult) => {
                    service.get_course_by_slug(id_or_slug).await?
                }
                Err(error) => return Err(error.into()),
            };
            let modules = service.list_course_modules(&course.id).await?;
            let sessions = service.list_course_sessions(&course.id, false).await?;
            let plans = service.list_payment_plans(Some(&course.id)).await?;
            output(
                &json!({
                    "course": course,
                    "modules": modules,
                    "sessions": sessions,
                    "payment_plans": plans,
                }),
                flags.format,
            )
        }
        CourseCommands::List { all } => output(&service.list_courses(*all).await?, flags.format),
        CourseCommands::Update {
            id,
            name,
            description,
            hours,
            price,
            display_order,
            active,
        } => {
            let mut update = CourseUpdateBuilder::new();
            if let Some(value) = name {
                update = update.name(value);
            }
            if description.is_some() {
                update = update.description(description.clone());
            }
            if let Some(value) = hours {
                update = update.hours(*value);
            }
            if let Some(value) = price {
                update = update.price_cents(parse_amount(value, "price")?);
            }
            if let Some(value) = display_order {
                update = update.display_order(*value);
            }
            if let Some(value) = active {
                update = update.active(*value);
            }
            output(&service.update_course(id, update.build()).await?, flags.format)
        }
        CourseCommands::AddModule {
            id,
            title,
            module_type,
            sequence,
            hours,
        } => {
            let module_type = parse_enum::<ModuleType>(module_type, "module type")?;
            let module = service
                .add_course_module(id, title, module_type, *sequence, *hours)
                .await?;
            output(&module, flags.format)
        }
        CourseCommands::Modules { id } => {
            output(&service.list_course_modules(id).await?, flags.format)
        }
        CourseCommands::AddSession {
            id,
            delivery_mode,
            location,
            start,
            end,
            capacity,
        } => {
            let session = service
                .create_course_session(NewCourseSession {
                    course_id: id.clone(),
                    delivery_mode: parse_enum::<DeliveryMode>(delivery_mode, "delivery mode")?,
                    location: location.clone(),
                    start_date: *start,
                    end_date: *end,
                    capacity: *capacity,
                })
                .await?;
            output(&session, flags.format)
        }
        CourseCommands::Sessions { id, open_only } => output(
            &service.list_course_sessions(id, *open_only).await?,
            flags.format,
        ),
        CourseCommands::SessionOpen { session_id, open } => {
            service.set_session_enrollment_open(session_id, *open).await?;
            output(
                &json!({ "session_id": session_id, "enrollment_open": open }),
                flags.format,
            )
        }
        CourseCommands::AddPlan {
            course,
            name,
            frequency,
            installments,
            total,
        } => {
            let plan = service
                .create_payment_plan(NewPaymentPlan {
                    course_id: course.clone(),
                    name: name.clone(),
                    frequency: parse_enum::<PlanFrequency>(frequency, "frequency")?,
                    installments: *installments,
                    total_cents: parse_amount(total, "total")?,
                })
                .await?;
            output(&plan, flags.format)
        }
        CourseCommands::Plans { course } => output(
            &service.list_payment_plans(course.as_deref()).await?,
            flags.format,
        ),
    }
}
