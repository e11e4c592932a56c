use chrono::Utc;
use gear_core::enums::{AttendanceStatus, LessonStatus, LessonType};
use gear_db::repos::lesson::{LessonFilter, NewLesson};
use gear_db::updates::lesson::LessonUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::LessonCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{parse_enum, parse_opt_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `gearbox lesson`.
pub async fn handle(
    action: &LessonCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        LessonCommands::Schedule {
            student,
            enrollment,
            instructor,
            vehicle,
            classroom,
            lesson_type,
            start,
            end,
            notes,
        } => {
            let lesson = service
                .schedule_lesson(NewLesson {
                    student_id: student.clone(),
                    enrollment_id: enrollment.clone(),
                    instructor_id: instructor.clone(),
                    vehicle_id: vehicle.clone(),
                    classroom_id: classroom.clone(),
                    lesson_type: parse_enum::<LessonType>(lesson_type, "lesson type")?,
                    start_time: *start,
                    end_time: *end,
                    notes: notes.clone(),
                })
                .await?;
            output(&lesson, flags.format)
        }
        LessonCommands::Check {
            student,
            instructor,
            vehicle,
            classroom,
            start,
            end,
        } => {
            let candidate = NewLesson {
                student_id: student.clone(),
                instructor_id: instructor.clone(),
                vehicle_id: vehicle.clone(),
                classroom_id: classroom.clone(),
                start_time: *start,
                end_time: *end,
                ..NewLesson::default()
            };
            let slot = service.check_lesson(&candidate, None).await?;
            output(
                &json!({ "ok": true, "start_time": slot.start, "end_time": slot.end }),
                flags.format,
            )
        }
        LessonCommands::Reschedule {
            id,
            start,
            end,
            instructor,
            vehicle,
            classroom,
        } => {
            let mut update = LessonUpdateBuilder::new();
            if let Some(value) = start {
                update = update.start_time(*value);
            }
            if let Some(value) = end {
                update = update.end_time(*value);
            }
            if instructor.is_some() {
                update = update.instructor_id(instructor.clone());
            }
            if vehicle.is_some() {
                update = update.vehicle_id(vehicle.clone());
            }
            if classroom.is_some() {
                update = update.classroom_id(classroom.clone());
            }
            output(
                &service.reschedule_lesson(id, update.build()).await?,
                flags.format,
            )
        }
        LessonCommands::Get { id } => {
            let lesson = service.get_lesson(id).await?;
            let attendance = match service.get_attendance(id).await {
                Ok(attendance) => Some(attendance),
                Err(gear_db::error::DatabaseError::NoResult) => None,
                Err(error) => return Err(error.into()),
            };
            output(
                &json!({ "lesson": lesson, "attendance": attendance }),
                flags.format,
            )
        }
        LessonCommands::List {
            student,
            instructor,
            status,
            from,
            to,
            limit,
        } => {
            let filter = LessonFilter {
                student_id: student.clone(),
                instructor_id: instructor.clone(),
                status: parse_opt_enum::<LessonStatus>(status.as_deref(), "status")?,
                from: *from,
                to: *to,
                limit: Some(effective_limit(*limit, flags.limit, ctx.default_limit())),
            };
            output(&service.list_lessons(&filter).await?, flags.format)
        }
        LessonCommands::Upcoming { limit } => {
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            output(
                &service.upcoming_lessons(Utc::now(), limit).await?,
                flags.format,
            )
        }
        LessonCommands::Status { id, status } => {
            let status = parse_enum::<LessonStatus>(status, "status")?;
            output(&service.set_lesson_status(id, status).await?, flags.format)
        }
        LessonCommands::Delete { id } => {
            service.delete_lesson(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        LessonCommands::Attend { id, status, notes } => {
            let status = parse_enum::<AttendanceStatus>(status, "attendance status")?;
            output(
                &service
                    .record_attendance(id, status, notes.as_deref())
                    .await?,
                flags.format,
            )
        }
        LessonCommands::DetectConflicts { ids } => {
            let created = service.detect_conflicts(ids).await?;
            tracing::info!(lessons = ids.len(), created, "conflict detection finished");
            output(&json!({ "created": created }), flags.format)
        }
        LessonCommands::Conflicts { all, limit } => {
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            output(&service.list_conflicts(!all, limit).await?, flags.format)
        }
        LessonCommands::ResolveConflict { id, notes } => output(
            &service.resolve_conflict(id, notes.as_deref()).await?,
            flags.format,
        ),
    }
}
