//! Enrollment repository: registration into courses, status lifecycle with
//! completion/drop stamps, the paid check behind the lesson cap, and module
//! progress.

use chrono::Utc;

use gear_core::audit_detail::StatusChangedDetail;
use gear_core::entities::{Enrollment, ModuleProgress};
use gear_core::enums::{AuditAction, EnrollmentStatus, EntityType, ProgressStatus};
use gear_core::ids::{PREFIX_ENROLLMENT, PREFIX_MODULE_PROGRESS};

use crate::error::DatabaseError;
use crate::helpers::{
    collect_rows, datetime_param, get_opt_string, parse_datetime, parse_enum,
    parse_optional_datetime, ts,
};
use crate::service::GearService;

pub(crate) const ENROLLMENT_COLS: &str = "id, student_id, course_id, session_id, payment_plan_id, \
     status, balance_cents, enrolled_at, completed_at, dropped_at, updated_at";

const PROGRESS_COLS: &str = "id, enrollment_id, module_id, status, completed_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct NewEnrollment {
    pub student_id: String,
    pub course_id: String,
    pub session_id: Option<String>,
    pub payment_plan_id: Option<String>,
    pub balance_cents: i64,
}

pub(crate) fn row_to_enrollment(row: &libsql::Row) -> Result<Enrollment, DatabaseError> {
    Ok(Enrollment {
        id: row.get(0)?,
        student_id: row.get(1)?,
        course_id: row.get(2)?,
        session_id: get_opt_string(row, 3)?,
        payment_plan_id: get_opt_string(row, 4)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        balance_cents: row.get(6)?,
        enrolled_at: parse_datetime(&row.get::<String>(7)?)?,
        completed_at: parse_optional_datetime(get_opt_string(row, 8)?.as_deref())?,
        dropped_at: parse_optional_datetime(get_opt_string(row, 9)?.as_deref())?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

fn row_to_progress(row: &libsql::Row) -> Result<ModuleProgress, DatabaseError> {
    Ok(ModuleProgress {
        id: row.get(0)?,
        enrollment_id: row.get(1)?,
        module_id: row.get(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        completed_at: parse_optional_datetime(get_opt_string(row, 4)?.as_deref())?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl GearService {
    /// Enroll a student, optionally into a specific session.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Policy` when the session is closed or already
    /// holds `capacity` enrollments that are not dropped. A capacity of zero
    /// means unlimited.
    pub async fn create_enrollment(&self, new: NewEnrollment) -> Result<Enrollment, DatabaseError> {
        self.get_student(&new.student_id).await?;
        self.get_course(&new.course_id).await?;

        if let Some(ref session_id) = new.session_id {
            let mut rows = self
                .db()
                .conn()
                .query(
                    "SELECT s.enrollment_open, s.capacity,
                            (SELECT COUNT(*) FROM enrollments e
                             WHERE e.session_id = s.id AND e.status != 'dropped')
                     FROM course_sessions s WHERE s.id = ?1",
                    [session_id.as_str()],
                )
                .await?;
            let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
            let open = row.get::<i64>(0)? != 0;
            let capacity = row.get::<i64>(1)?;
            let taken = row.get::<i64>(2)?;
            if !open {
                return Err(DatabaseError::Policy(
                    "Session is closed for enrollment.".into(),
                ));
            }
            if capacity > 0 && taken >= capacity {
                return Err(DatabaseError::Policy("Session is full.".into()));
            }
        }

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_ENROLLMENT).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO enrollments ({ENROLLMENT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, NULL, ?9)"
                ),
                libsql::params![
                    id.as_str(),
                    new.student_id.as_str(),
                    new.course_id.as_str(),
                    new.session_id.as_deref(),
                    new.payment_plan_id.as_deref(),
                    EnrollmentStatus::Pending.as_str(),
                    new.balance_cents,
                    ts(now),
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::Enrollment, &id, AuditAction::Created, None, now)
            .await?;

        Ok(Enrollment {
            id,
            student_id: new.student_id,
            course_id: new.course_id,
            session_id: new.session_id,
            payment_plan_id: new.payment_plan_id,
            status: EnrollmentStatus::Pending,
            balance_cents: new.balance_cents,
            enrolled_at: now,
            completed_at: None,
            dropped_at: None,
            updated_at: now,
        })
    }

    pub async fn get_enrollment(&self, id: &str) -> Result<Enrollment, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {ENROLLMENT_COLS} FROM enrollments WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_enrollment(&row)
    }

    /// Newest first, optionally for one student and/or one status.
    pub async fn list_enrollments(
        &self,
        student_id: Option<&str>,
        status: Option<EnrollmentStatus>,
        limit: u32,
    ) -> Result<Vec<Enrollment>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        if let Some(student_id) = student_id {
            params.push(student_id.into());
            conditions.push(format!("student_id = ?{}", params.len()));
        }
        if let Some(status) = status {
            params.push(status.as_str().into());
            conditions.push(format!("status = ?{}", params.len()));
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {ENROLLMENT_COLS} FROM enrollments {where_clause}
                     ORDER BY enrolled_at DESC LIMIT {limit}"
                ),
                libsql::params_from_iter(params),
            )
            .await?;
        collect_rows(rows, row_to_enrollment).await
    }

    /// Move an enrollment along its lifecycle.
    ///
    /// Entering `completed` stamps `completed_at`; entering `dropped` stamps
    /// `dropped_at`.
    pub async fn set_enrollment_status(
        &self,
        enrollment_id: &str,
        status: EnrollmentStatus,
    ) -> Result<Enrollment, DatabaseError> {
        let current = self.get_enrollment(enrollment_id).await?;
        if !current.status.can_transition_to(status) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot transition enrollment {enrollment_id} from {} to {status}",
                current.status
            )));
        }

        let now = Utc::now();
        let completed_at = if status == EnrollmentStatus::Completed {
            Some(now)
        } else {
            current.completed_at
        };
        let dropped_at = if status == EnrollmentStatus::Dropped {
            Some(now)
        } else {
            current.dropped_at
        };

        self.db()
            .conn()
            .execute(
                "UPDATE enrollments SET status = ?1, completed_at = ?2, dropped_at = ?3,
                        updated_at = ?4
                 WHERE id = ?5",
                libsql::params![
                    status.as_str(),
                    datetime_param(completed_at),
                    datetime_param(dropped_at),
                    ts(now),
                    enrollment_id
                ],
            )
            .await?;

        let detail = StatusChangedDetail {
            from: current.status.as_str().to_string(),
            to: status.as_str().to_string(),
            reason: None,
        };
        self.audit(
            EntityType::Enrollment,
            enrollment_id,
            AuditAction::StatusChanged,
            Some(serde_json::to_value(&detail)?),
            now,
        )
        .await?;

        Ok(Enrollment {
            status,
            completed_at,
            dropped_at,
            updated_at: now,
            ..current
        })
    }

    /// Whether any of the student's enrollments is `paid` or `completed`.
    pub async fn has_paid_enrollment(&self, student_id: &str) -> Result<bool, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT 1 FROM enrollments
                 WHERE student_id = ?1 AND status IN ('paid', 'completed') LIMIT 1",
                [student_id],
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }

    // -----------------------------------------------------------------------
    // Module progress
    // -----------------------------------------------------------------------

    /// Record progress on a module; one row per (enrollment, module).
    pub async fn set_module_progress(
        &self,
        enrollment_id: &str,
        module_id: &str,
        status: ProgressStatus,
    ) -> Result<ModuleProgress, DatabaseError> {
        let now = Utc::now();
        let completed_at = (status == ProgressStatus::Completed).then_some(now);
        let id = self.db().generate_id(PREFIX_MODULE_PROGRESS).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO module_progress ({PROGRESS_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(enrollment_id, module_id) DO UPDATE SET
                        status = excluded.status,
                        completed_at = excluded.completed_at,
                        updated_at = excluded.updated_at"
                ),
                libsql::params![
                    id.as_str(),
                    enrollment_id,
                    module_id,
                    status.as_str(),
                    datetime_param(completed_at),
                    ts(now)
                ],
            )
            .await?;

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {PROGRESS_COLS} FROM module_progress
                     WHERE enrollment_id = ?1 AND module_id = ?2"
                ),
                libsql::params![enrollment_id, module_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let progress = row_to_progress(&row)?;
        self.audit(
            EntityType::ModuleProgress,
            &progress.id,
            AuditAction::Updated,
            Some(serde_json::json!({ "status": status.as_str() })),
            now,
        )
        .await?;
        Ok(progress)
    }

    pub async fn list_module_progress(
        &self,
        enrollment_id: &str,
    ) -> Result<Vec<ModuleProgress>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                "SELECT p.id, p.enrollment_id, p.module_id, p.status, p.completed_at, p.updated_at
                 FROM module_progress p
                 JOIN course_modules m ON m.id = p.module_id
                 WHERE p.enrollment_id = ?1 ORDER BY m.sequence",
                [enrollment_id],
            )
            .await?;
        collect_rows(rows, row_to_progress).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::course::{NewCourse, NewCourseSession};
    use crate::test_support::helpers::{at, lesson_at, make_student, test_service};
    use chrono::NaiveDate;
    use gear_core::entities::Course;
    use gear_core::enums::{CourseType, DeliveryMode, ModuleType};

    async fn course(svc: &GearService) -> Course {
        svc.create_course(NewCourse {
            name: "BDE".into(),
            course_type: CourseType::Bde,
            description: None,
            hours: 40,
            price_cents: 89_900,
            display_order: 0,
            active: true,
        })
        .await
        .unwrap()
    }

    async fn enroll(svc: &GearService, student_id: &str, course_id: &str) -> Enrollment {
        svc.create_enrollment(NewEnrollment {
            student_id: student_id.into(),
            course_id: course_id.into(),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn completion_and_drop_are_stamped() {
        let svc = test_service().await;
        let student = make_student(&svc, "Ana").await;
        let course = course(&svc).await;
        let a = enroll(&svc, &student.id, &course.id).await;
        let b = enroll(&svc, &student.id, &course.id).await;

        svc.set_enrollment_status(&a.id, EnrollmentStatus::Paid).await.unwrap();
        let done = svc
            .set_enrollment_status(&a.id, EnrollmentStatus::Completed)
            .await
            .unwrap();
        assert!(done.completed_at.is_some());
        assert_eq!(done.dropped_at, None);

        let dropped = svc
            .set_enrollment_status(&b.id, EnrollmentStatus::Dropped)
            .await
            .unwrap();
        assert!(dropped.dropped_at.is_some());
        assert_eq!(svc.get_enrollment(&b.id).await.unwrap(), dropped);

        assert!(matches!(
            svc.set_enrollment_status(&b.id, EnrollmentStatus::Active).await,
            Err(DatabaseError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn paid_enrollment_lifts_lesson_cap() {
        let svc = test_service().await;
        let student = make_student(&svc, "Ana").await;
        let course = course(&svc).await;
        let enrollment = enroll(&svc, &student.id, &course.id).await;
        assert!(!svc.has_paid_enrollment(&student.id).await.unwrap());

        for day in 1..=5 {
            svc.schedule_lesson(lesson_at(&student.id, at(day, 9)))
                .await
                .unwrap();
        }
        assert!(matches!(
            svc.schedule_lesson(lesson_at(&student.id, at(6, 9))).await,
            Err(DatabaseError::Policy(_))
        ));

        svc.set_enrollment_status(&enrollment.id, EnrollmentStatus::Paid)
            .await
            .unwrap();
        assert!(svc.has_paid_enrollment(&student.id).await.unwrap());
        assert!(svc.schedule_lesson(lesson_at(&student.id, at(6, 9))).await.is_ok());
    }

    #[tokio::test]
    async fn full_session_rejects_enrollment() {
        let svc = test_service().await;
        let course = course(&svc).await;
        let session = svc
            .create_course_session(NewCourseSession {
                course_id: course.id.clone(),
                delivery_mode: DeliveryMode::InClass,
                location: Some("Downtown".into()),
                start_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 5, 3).unwrap(),
                capacity: 1,
            })
            .await
            .unwrap();
        let ana = make_student(&svc, "Ana").await;
        let ben = make_student(&svc, "Ben").await;

        let new = |student_id: &str| NewEnrollment {
            student_id: student_id.into(),
            course_id: course.id.clone(),
            session_id: Some(session.id.clone()),
            ..Default::default()
        };
        svc.create_enrollment(new(&ana.id)).await.unwrap();
        let err = svc.create_enrollment(new(&ben.id)).await.unwrap_err();
        assert_eq!(err.to_string(), "Session is full.");

        svc.set_session_enrollment_open(&session.id, false).await.unwrap();
        let err = svc.create_enrollment(new(&ben.id)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Policy(_)));
        assert_eq!(err.to_string(), "Session is closed for enrollment.");
    }

    #[tokio::test]
    async fn module_progress_upserts() {
        let svc = test_service().await;
        let student = make_student(&svc, "Ana").await;
        let course = course(&svc).await;
        let module = svc
            .add_course_module(&course.id, "Signs", ModuleType::Theory, 1, 2)
            .await
            .unwrap();
        let enrollment = enroll(&svc, &student.id, &course.id).await;

        let started = svc
            .set_module_progress(&enrollment.id, &module.id, ProgressStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(started.completed_at, None);
        let done = svc
            .set_module_progress(&enrollment.id, &module.id, ProgressStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.id, started.id);
        assert!(done.completed_at.is_some());
        assert_eq!(svc.list_module_progress(&enrollment.id).await.unwrap().len(), 1);
    }
}
