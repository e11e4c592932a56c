//! Lesson repository: booking with double-booking and unpaid-cap checks,
//! rescheduling, status changes and attendance.

use chrono::{DateTime, Utc};

use gear_core::audit_detail::StatusChangedDetail;
use gear_core::entities::{Lesson, LessonAttendance};
use gear_core::enums::{AttendanceStatus, AuditAction, ConflictKind, EntityType, LessonStatus, LessonType};
use gear_core::ids::{PREFIX_ATTENDANCE, PREFIX_LESSON};
use gear_core::time_slot::TimeSlot;

use crate::error::DatabaseError;
use crate::helpers::{collect_rows, get_opt_string, parse_datetime, parse_enum, ts};
use crate::service::GearService;
use crate::updates::SetClauses;
use crate::updates::lesson::LessonUpdate;

/// Lessons a student may book before any enrollment is paid.
pub const UNPAID_LESSON_CAP: i64 = 5;

pub(crate) const LESSON_COLS: &str = "id, student_id, enrollment_id, instructor_id, vehicle_id, \
     classroom_id, lesson_type, start_time, end_time, status, notes, created_at, updated_at";

const ATTENDANCE_COLS: &str = "id, lesson_id, status, notes, recorded_at";

/// A lesson to book. `end_time` defaults to one hour after `start_time`.
#[derive(Debug, Clone, Default)]
pub struct NewLesson {
    pub student_id: String,
    pub enrollment_id: Option<String>,
    pub instructor_id: Option<String>,
    pub vehicle_id: Option<String>,
    pub classroom_id: Option<String>,
    pub lesson_type: LessonType,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl NewLesson {
    fn resource(&self, kind: ConflictKind) -> Option<&str> {
        match kind {
            ConflictKind::Instructor => self.instructor_id.as_deref(),
            ConflictKind::Vehicle => self.vehicle_id.as_deref(),
            ConflictKind::Classroom => self.classroom_id.as_deref(),
        }
    }
}

/// Filter criteria for lesson listings.
#[derive(Debug, Default)]
pub struct LessonFilter {
    pub student_id: Option<String>,
    pub instructor_id: Option<String>,
    pub status: Option<LessonStatus>,
    /// Lessons ending at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Lessons starting before this instant.
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

pub(crate) fn row_to_lesson(row: &libsql::Row) -> Result<Lesson, DatabaseError> {
    Ok(Lesson {
        id: row.get(0)?,
        student_id: row.get(1)?,
        enrollment_id: get_opt_string(row, 2)?,
        instructor_id: get_opt_string(row, 3)?,
        vehicle_id: get_opt_string(row, 4)?,
        classroom_id: get_opt_string(row, 5)?,
        lesson_type: parse_enum(&row.get::<String>(6)?)?,
        start_time: parse_datetime(&row.get::<String>(7)?)?,
        end_time: parse_datetime(&row.get::<String>(8)?)?,
        status: parse_enum(&row.get::<String>(9)?)?,
        notes: get_opt_string(row, 10)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

fn row_to_attendance(row: &libsql::Row) -> Result<LessonAttendance, DatabaseError> {
    Ok(LessonAttendance {
        id: row.get(0)?,
        lesson_id: row.get(1)?,
        status: parse_enum(&row.get::<String>(2)?)?,
        notes: get_opt_string(row, 3)?,
        recorded_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl GearService {
    /// Validate a booking against the time rule, every assigned resource, and
    /// the unpaid-student cap. Returns the normalized slot.
    ///
    /// Checks run in order: slot validity, instructor, vehicle, classroom, cap.
    /// `exclude_id` is the lesson being rescheduled, ignored when looking for
    /// overlaps and when counting the student's lessons.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::Validation` when the end is not after the start.
    /// - `DatabaseError::Conflict` naming the first double-booked resource.
    /// - `DatabaseError::Policy` when an unpaid student already has five lessons.
    pub async fn check_lesson(
        &self,
        candidate: &NewLesson,
        exclude_id: Option<&str>,
    ) -> Result<TimeSlot, DatabaseError> {
        let slot = TimeSlot::with_default_end(candidate.start_time, candidate.end_time)?;
        let exclude = exclude_id.unwrap_or_default();

        for kind in ConflictKind::ALL {
            let Some(resource_id) = candidate.resource(kind) else {
                continue;
            };
            if let Some(lesson_id) = self
                .first_overlap(kind, resource_id, &slot, exclude)
                .await?
            {
                tracing::debug!(%kind, resource_id, lesson_id, "booking rejected");
                return Err(DatabaseError::Conflict { kind, lesson_id });
            }
        }

        if !self.has_paid_enrollment(&candidate.student_id).await? {
            let mut rows = self
                .db()
                .conn()
                .query(
                    "SELECT COUNT(*) FROM lessons WHERE student_id = ?1 AND id != ?2",
                    libsql::params![candidate.student_id.as_str(), exclude],
                )
                .await?;
            let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
            let count = row.get::<i64>(0)?;
            if count >= UNPAID_LESSON_CAP {
                return Err(DatabaseError::Policy(
                    "Student has not paid in full. Maximum 5 lessons allowed.".into(),
                ));
            }
        }

        Ok(slot)
    }

    /// First lesson other than `exclude` holding `resource_id` during `slot`.
    async fn first_overlap(
        &self,
        kind: ConflictKind,
        resource_id: &str,
        slot: &TimeSlot,
        exclude: &str,
    ) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT id FROM lessons
                     WHERE {} = ?1 AND start_time < ?2 AND end_time > ?3 AND id != ?4
                     ORDER BY start_time LIMIT 1",
                    kind.column()
                ),
                libsql::params![resource_id, ts(slot.end), ts(slot.start), exclude],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }

    /// Book a lesson after running [`GearService::check_lesson`].
    pub async fn schedule_lesson(&self, new: NewLesson) -> Result<Lesson, DatabaseError> {
        let slot = self.check_lesson(&new, None).await?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_LESSON).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO lessons ({LESSON_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
                ),
                libsql::params![
                    id.as_str(),
                    new.student_id.as_str(),
                    new.enrollment_id.as_deref(),
                    new.instructor_id.as_deref(),
                    new.vehicle_id.as_deref(),
                    new.classroom_id.as_deref(),
                    new.lesson_type.as_str(),
                    ts(slot.start),
                    ts(slot.end),
                    LessonStatus::Scheduled.as_str(),
                    new.notes.as_deref(),
                    ts(now),
                    ts(now)
                ],
            )
            .await?;

        self.audit(EntityType::Lesson, &id, AuditAction::Created, None, now)
            .await?;
        tracing::info!(lesson = %id, student = %new.student_id, start = %slot.start, "lesson scheduled");

        Ok(Lesson {
            id,
            student_id: new.student_id,
            enrollment_id: new.enrollment_id,
            instructor_id: new.instructor_id,
            vehicle_id: new.vehicle_id,
            classroom_id: new.classroom_id,
            lesson_type: new.lesson_type,
            start_time: slot.start,
            end_time: slot.end,
            status: LessonStatus::Scheduled,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_lesson(&self, id: &str) -> Result<Lesson, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {LESSON_COLS} FROM lessons WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_lesson(&row)
    }

    /// Apply an update, re-checking conflicts when time or resources change.
    ///
    /// A new start without a new end keeps the lesson's length.
    pub async fn reschedule_lesson(
        &self,
        lesson_id: &str,
        update: LessonUpdate,
    ) -> Result<Lesson, DatabaseError> {
        let current = self.get_lesson(lesson_id).await?;

        let start = update.start_time.unwrap_or(current.start_time);
        let end = update
            .end_time
            .unwrap_or_else(|| start + current.slot().duration());

        let mut sets = SetClauses::default();
        if update.touches_schedule() {
            let candidate = NewLesson {
                student_id: current.student_id.clone(),
                enrollment_id: current.enrollment_id.clone(),
                instructor_id: update
                    .instructor_id
                    .clone()
                    .unwrap_or_else(|| current.instructor_id.clone()),
                vehicle_id: update
                    .vehicle_id
                    .clone()
                    .unwrap_or_else(|| current.vehicle_id.clone()),
                classroom_id: update
                    .classroom_id
                    .clone()
                    .unwrap_or_else(|| current.classroom_id.clone()),
                lesson_type: update.lesson_type.unwrap_or(current.lesson_type),
                start_time: start,
                end_time: Some(end),
                notes: None,
            };
            let slot = self.check_lesson(&candidate, Some(lesson_id)).await?;
            sets.push("start_time", ts(slot.start));
            sets.push("end_time", ts(slot.end));
            sets.push_opt("instructor_id", candidate.instructor_id.as_deref());
            sets.push_opt("vehicle_id", candidate.vehicle_id.as_deref());
            sets.push_opt("classroom_id", candidate.classroom_id.as_deref());
        }
        if let Some(lesson_type) = update.lesson_type {
            sets.push("lesson_type", lesson_type.as_str());
        }
        if let Some(ref notes) = update.notes {
            sets.push_opt("notes", notes.as_deref());
        }

        if sets.is_empty() {
            return Ok(current);
        }

        let now = Utc::now();
        sets.push("updated_at", ts(now));
        let (sql, params) = sets.into_update("lessons", lesson_id);
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        let updated = self.get_lesson(lesson_id).await?;
        self.audit(
            EntityType::Lesson,
            lesson_id,
            AuditAction::Updated,
            Some(serde_json::to_value(&update)?),
            now,
        )
        .await?;
        Ok(updated)
    }

    /// Move a scheduled lesson to completed, cancelled or missed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a transition out of a final status.
    pub async fn set_lesson_status(
        &self,
        lesson_id: &str,
        status: LessonStatus,
    ) -> Result<Lesson, DatabaseError> {
        let current = self.get_lesson(lesson_id).await?;
        if !current.status.can_transition_to(status) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot transition lesson {lesson_id} from {} to {status}",
                current.status
            )));
        }

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE lessons SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![status.as_str(), ts(now), lesson_id],
            )
            .await?;

        let detail = StatusChangedDetail {
            from: current.status.as_str().to_string(),
            to: status.as_str().to_string(),
            reason: None,
        };
        self.audit(
            EntityType::Lesson,
            lesson_id,
            AuditAction::StatusChanged,
            Some(serde_json::to_value(&detail)?),
            now,
        )
        .await?;

        Ok(Lesson {
            status,
            updated_at: now,
            ..current
        })
    }

    pub async fn delete_lesson(&self, lesson_id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute("DELETE FROM lessons WHERE id = ?1", [lesson_id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.audit(EntityType::Lesson, lesson_id, AuditAction::Deleted, None, Utc::now())
            .await
    }

    /// Lessons matching the filter, earliest first.
    pub async fn list_lessons(&self, filter: &LessonFilter) -> Result<Vec<Lesson>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref student_id) = filter.student_id {
            params.push(student_id.clone().into());
            conditions.push(format!("student_id = ?{}", params.len()));
        }
        if let Some(ref instructor_id) = filter.instructor_id {
            params.push(instructor_id.clone().into());
            conditions.push(format!("instructor_id = ?{}", params.len()));
        }
        if let Some(status) = filter.status {
            params.push(status.as_str().into());
            conditions.push(format!("status = ?{}", params.len()));
        }
        if let Some(from) = filter.from {
            params.push(ts(from).into());
            conditions.push(format!("end_time >= ?{}", params.len()));
        }
        if let Some(to) = filter.to {
            params.push(ts(to).into());
            conditions.push(format!("start_time < ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = filter.limit.unwrap_or(100);
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {LESSON_COLS} FROM lessons {where_clause}
                     ORDER BY start_time LIMIT {limit}"
                ),
                libsql::params_from_iter(params),
            )
            .await?;
        collect_rows(rows, row_to_lesson).await
    }

    /// Scheduled lessons starting at or after `now`, soonest first.
    pub async fn upcoming_lessons(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Lesson>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {LESSON_COLS} FROM lessons
                     WHERE status = 'scheduled' AND start_time >= ?1
                     ORDER BY start_time LIMIT {limit}"
                ),
                [ts(now)],
            )
            .await?;
        collect_rows(rows, row_to_lesson).await
    }

    /// Record attendance, replacing any earlier record for the lesson.
    pub async fn record_attendance(
        &self,
        lesson_id: &str,
        status: AttendanceStatus,
        notes: Option<&str>,
    ) -> Result<LessonAttendance, DatabaseError> {
        self.get_lesson(lesson_id).await?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_ATTENDANCE).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO lesson_attendance ({ATTENDANCE_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(lesson_id) DO UPDATE SET
                        status = excluded.status,
                        notes = excluded.notes,
                        recorded_at = excluded.recorded_at"
                ),
                libsql::params![id.as_str(), lesson_id, status.as_str(), notes, ts(now)],
            )
            .await?;
        let attendance = self.get_attendance(lesson_id).await?;
        self.audit(
            EntityType::Attendance,
            &attendance.id,
            AuditAction::Updated,
            Some(serde_json::json!({ "lesson_id": lesson_id, "status": status.as_str() })),
            now,
        )
        .await?;
        Ok(attendance)
    }

    pub async fn get_attendance(&self, lesson_id: &str) -> Result<LessonAttendance, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {ATTENDANCE_COLS} FROM lesson_attendance WHERE lesson_id = ?1"),
                [lesson_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_attendance(&row)
    }
}
