//! Course catalog: courses with unique slugs, modules, dated sessions and
//! payment plans with their generated installment schedules.

use chrono::{Days, Months, NaiveDate, Utc};

use gear_core::entities::{Course, CourseModule, CourseSession, PaymentPlan, PaymentSchedule};
use gear_core::enums::{AuditAction, CourseType, DeliveryMode, EntityType, ModuleType, PlanFrequency};
use gear_core::ids::{
    PREFIX_COURSE, PREFIX_COURSE_MODULE, PREFIX_COURSE_SESSION, PREFIX_PAYMENT_PLAN,
    PREFIX_PAYMENT_SCHEDULE,
};
use gear_core::money::split_installments;
use gear_core::slug::{COURSE_SLUG_MAX, course_base_slug, with_suffix};

use crate::error::{DatabaseError, map_unique};
use crate::helpers::{
    collect_rows, get_bool, get_opt_string, get_u32, parse_date, parse_datetime, parse_enum, ts,
};
use crate::service::GearService;
use crate::updates::SetClauses;
use crate::updates::course::CourseUpdate;

const COURSE_COLS: &str = "id, name, slug, course_type, description, hours, price_cents, \
     display_order, active, created_at, updated_at";

const MODULE_COLS: &str = "id, course_id, title, module_type, sequence, hours";

const SESSION_COLS: &str = "id, course_id, delivery_mode, location, start_date, end_date, \
     capacity, enrollment_open, created_at";

const PLAN_COLS: &str = "id, course_id, name, frequency, installments, total_cents, created_at";

const SCHEDULE_COLS: &str = "id, enrollment_id, plan_id, sequence, due_date, amount_cents, paid";

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub name: String,
    pub course_type: CourseType,
    pub description: Option<String>,
    pub hours: u32,
    pub price_cents: i64,
    pub display_order: i64,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct NewCourseSession {
    pub course_id: String,
    pub delivery_mode: DeliveryMode,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub capacity: u32,
}

#[derive(Debug, Clone)]
pub struct NewPaymentPlan {
    pub course_id: Option<String>,
    pub name: String,
    pub frequency: PlanFrequency,
    pub installments: u32,
    pub total_cents: i64,
}

fn row_to_course(row: &libsql::Row) -> Result<Course, DatabaseError> {
    Ok(Course {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        course_type: parse_enum(&row.get::<String>(3)?)?,
        description: get_opt_string(row, 4)?,
        hours: get_u32(row, 5)?,
        price_cents: row.get(6)?,
        display_order: row.get(7)?,
        active: get_bool(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

fn row_to_module(row: &libsql::Row) -> Result<CourseModule, DatabaseError> {
    Ok(CourseModule {
        id: row.get(0)?,
        course_id: row.get(1)?,
        title: row.get(2)?,
        module_type: parse_enum(&row.get::<String>(3)?)?,
        sequence: get_u32(row, 4)?,
        hours: get_u32(row, 5)?,
    })
}

fn row_to_session(row: &libsql::Row) -> Result<CourseSession, DatabaseError> {
    Ok(CourseSession {
        id: row.get(0)?,
        course_id: row.get(1)?,
        delivery_mode: parse_enum(&row.get::<String>(2)?)?,
        location: get_opt_string(row, 3)?,
        start_date: parse_date(&row.get::<String>(4)?)?,
        end_date: parse_date(&row.get::<String>(5)?)?,
        capacity: get_u32(row, 6)?,
        enrollment_open: get_bool(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

fn row_to_plan(row: &libsql::Row) -> Result<PaymentPlan, DatabaseError> {
    Ok(PaymentPlan {
        id: row.get(0)?,
        course_id: get_opt_string(row, 1)?,
        name: row.get(2)?,
        frequency: parse_enum(&row.get::<String>(3)?)?,
        installments: get_u32(row, 4)?,
        total_cents: row.get(5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

fn row_to_schedule(row: &libsql::Row) -> Result<PaymentSchedule, DatabaseError> {
    Ok(PaymentSchedule {
        id: row.get(0)?,
        enrollment_id: row.get(1)?,
        plan_id: row.get(2)?,
        sequence: get_u32(row, 3)?,
        due_date: parse_date(&row.get::<String>(4)?)?,
        amount_cents: row.get(5)?,
        paid: get_bool(row, 6)?,
    })
}

/// Due date of installment `index` (zero-based) counted from `first_due`.
fn installment_due(first_due: NaiveDate, frequency: PlanFrequency, index: u32) -> Option<NaiveDate> {
    match frequency {
        PlanFrequency::Weekly => first_due.checked_add_days(Days::new(7 * u64::from(index))),
        PlanFrequency::Biweekly => first_due.checked_add_days(Days::new(14 * u64::from(index))),
        PlanFrequency::Monthly => first_due.checked_add_months(Months::new(index)),
    }
}

impl GearService {
    async fn course_slug_taken(&self, slug: &str) -> Result<bool, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT 1 FROM courses WHERE slug = ?1", [slug])
            .await?;
        Ok(rows.next().await?.is_some())
    }

    /// First free slug for a course name: the name's slug, then `-2`, `-3`, ...
    ///
    /// Names without usable characters get a random 12-hex slug.
    pub async fn unique_course_slug(&self, name: &str) -> Result<String, DatabaseError> {
        let base = match course_base_slug(name) {
            Some(base) => base,
            None => self.db().random_hex(6).await?,
        };
        let mut candidate = base.clone();
        let mut n = 2;
        while self.course_slug_taken(&candidate).await? {
            candidate = with_suffix(&base, n, COURSE_SLUG_MAX);
            n += 1;
        }
        Ok(candidate)
    }

    pub async fn create_course(&self, new: NewCourse) -> Result<Course, DatabaseError> {
        if new.name.trim().is_empty() {
            return Err(DatabaseError::Validation("course name is required".into()));
        }
        let slug = self.unique_course_slug(&new.name).await?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_COURSE).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO courses ({COURSE_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                ),
                libsql::params![
                    id.as_str(),
                    new.name.as_str(),
                    slug.as_str(),
                    new.course_type.as_str(),
                    new.description.as_deref(),
                    i64::from(new.hours),
                    new.price_cents,
                    new.display_order,
                    i64::from(new.active),
                    ts(now),
                    ts(now)
                ],
            )
            .await
            .map_err(|e| map_unique(e, "slug", &slug))?;

        self.audit(EntityType::Course, &id, AuditAction::Created, None, now)
            .await?;
        tracing::debug!(course = %id, %slug, "course created");

        Ok(Course {
            id,
            name: new.name,
            slug,
            course_type: new.course_type,
            description: new.description,
            hours: new.hours,
            price_cents: new.price_cents,
            display_order: new.display_order,
            active: new.active,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_course(&self, id: &str) -> Result<Course, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {COURSE_COLS} FROM courses WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_course(&row)
    }

    pub async fn get_course_by_slug(&self, slug: &str) -> Result<Course, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {COURSE_COLS} FROM courses WHERE slug = ?1"), [slug])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_course(&row)
    }

    /// Catalog order: `display_order`, then name.
    pub async fn list_courses(&self, include_inactive: bool) -> Result<Vec<Course>, DatabaseError> {
        let filter = if include_inactive { "" } else { "WHERE active = 1" };
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {COURSE_COLS} FROM courses {filter} ORDER BY display_order, name"
                ),
                (),
            )
            .await?;
        collect_rows(rows, row_to_course).await
    }

    /// Update catalog fields. The slug is fixed at creation.
    pub async fn update_course(
        &self,
        course_id: &str,
        update: CourseUpdate,
    ) -> Result<Course, DatabaseError> {
        let mut sets = SetClauses::default();
        if let Some(ref name) = update.name {
            sets.push("name", name.as_str());
        }
        if let Some(ref description) = update.description {
            sets.push_opt("description", description.as_deref());
        }
        if let Some(hours) = update.hours {
            sets.push("hours", i64::from(hours));
        }
        if let Some(price_cents) = update.price_cents {
            sets.push("price_cents", price_cents);
        }
        if let Some(display_order) = update.display_order {
            sets.push("display_order", display_order);
        }
        if let Some(active) = update.active {
            sets.push("active", i64::from(active));
        }

        if sets.is_empty() {
            return self.get_course(course_id).await;
        }

        let now = Utc::now();
        sets.push("updated_at", ts(now));
        let (sql, params) = sets.into_update("courses", course_id);
        let changed = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }

        let updated = self.get_course(course_id).await?;
        self.audit(
            EntityType::Course,
            course_id,
            AuditAction::Updated,
            Some(serde_json::to_value(&update)?),
            now,
        )
        .await?;
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Modules
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `DatabaseError::Duplicate` when the course already has a module
    /// at `sequence`.
    pub async fn add_course_module(
        &self,
        course_id: &str,
        title: &str,
        module_type: ModuleType,
        sequence: u32,
        hours: u32,
    ) -> Result<CourseModule, DatabaseError> {
        let id = self.db().generate_id(PREFIX_COURSE_MODULE).await?;
        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO course_modules ({MODULE_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                libsql::params![
                    id.as_str(),
                    course_id,
                    title,
                    module_type.as_str(),
                    i64::from(sequence),
                    i64::from(hours)
                ],
            )
            .await
            .map_err(|e| map_unique(e, "sequence", &sequence.to_string()))?;
        self.audit(EntityType::CourseModule, &id, AuditAction::Created, None, Utc::now())
            .await?;
        Ok(CourseModule {
            id,
            course_id: course_id.to_string(),
            title: title.to_string(),
            module_type,
            sequence,
            hours,
        })
    }

    pub async fn list_course_modules(
        &self,
        course_id: &str,
    ) -> Result<Vec<CourseModule>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {MODULE_COLS} FROM course_modules WHERE course_id = ?1 ORDER BY sequence"
                ),
                [course_id],
            )
            .await?;
        collect_rows(rows, row_to_module).await
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    pub async fn create_course_session(
        &self,
        new: NewCourseSession,
    ) -> Result<CourseSession, DatabaseError> {
        if new.end_date < new.start_date {
            return Err(DatabaseError::Validation(
                "Session end date must not be before its start date.".into(),
            ));
        }
        self.get_course(&new.course_id).await?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_COURSE_SESSION).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO course_sessions ({SESSION_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)"
                ),
                libsql::params![
                    id.as_str(),
                    new.course_id.as_str(),
                    new.delivery_mode.as_str(),
                    new.location.as_deref(),
                    new.start_date.format("%Y-%m-%d").to_string(),
                    new.end_date.format("%Y-%m-%d").to_string(),
                    i64::from(new.capacity),
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::CourseSession, &id, AuditAction::Created, None, now)
            .await?;
        Ok(CourseSession {
            id,
            course_id: new.course_id,
            delivery_mode: new.delivery_mode,
            location: new.location,
            start_date: new.start_date,
            end_date: new.end_date,
            capacity: new.capacity,
            enrollment_open: true,
            created_at: now,
        })
    }

    /// Sessions of a course by start date.
    pub async fn list_course_sessions(
        &self,
        course_id: &str,
        open_only: bool,
    ) -> Result<Vec<CourseSession>, DatabaseError> {
        let filter = if open_only { "AND enrollment_open = 1" } else { "" };
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SESSION_COLS} FROM course_sessions
                     WHERE course_id = ?1 {filter} ORDER BY start_date"
                ),
                [course_id],
            )
            .await?;
        collect_rows(rows, row_to_session).await
    }

    pub async fn set_session_enrollment_open(
        &self,
        session_id: &str,
        open: bool,
    ) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE course_sessions SET enrollment_open = ?1 WHERE id = ?2",
                libsql::params![i64::from(open), session_id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.audit(
            EntityType::CourseSession,
            session_id,
            AuditAction::Updated,
            Some(serde_json::json!({ "enrollment_open": open })),
            Utc::now(),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Payment plans
    // -----------------------------------------------------------------------

    pub async fn create_payment_plan(
        &self,
        new: NewPaymentPlan,
    ) -> Result<PaymentPlan, DatabaseError> {
        if new.installments == 0 {
            return Err(DatabaseError::Validation(
                "A payment plan needs at least one installment.".into(),
            ));
        }
        if new.total_cents < 0 {
            return Err(DatabaseError::Validation("Plan total must not be negative.".into()));
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_PAYMENT_PLAN).await?;
        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO payment_plans ({PLAN_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                libsql::params![
                    id.as_str(),
                    new.course_id.as_deref(),
                    new.name.as_str(),
                    new.frequency.as_str(),
                    i64::from(new.installments),
                    new.total_cents,
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::PaymentPlan, &id, AuditAction::Created, None, now)
            .await?;
        Ok(PaymentPlan {
            id,
            course_id: new.course_id,
            name: new.name,
            frequency: new.frequency,
            installments: new.installments,
            total_cents: new.total_cents,
            created_at: now,
        })
    }

    pub async fn get_payment_plan(&self, id: &str) -> Result<PaymentPlan, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {PLAN_COLS} FROM payment_plans WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_plan(&row)
    }

    pub async fn list_payment_plans(
        &self,
        course_id: Option<&str>,
    ) -> Result<Vec<PaymentPlan>, DatabaseError> {
        let rows = match course_id {
            Some(course_id) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {PLAN_COLS} FROM payment_plans WHERE course_id = ?1 ORDER BY name"
                        ),
                        [course_id],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(&format!("SELECT {PLAN_COLS} FROM payment_plans ORDER BY name"), ())
                    .await?
            }
        };
        collect_rows(rows, row_to_plan).await
    }

    /// Generate the installment schedule of `plan_id` for an enrollment.
    ///
    /// Installments are spaced by the plan's frequency starting at
    /// `first_due`; the remainder cents land on the last one. Any earlier
    /// schedule for the enrollment is replaced.
    pub async fn apply_payment_plan(
        &self,
        enrollment_id: &str,
        plan_id: &str,
        first_due: NaiveDate,
    ) -> Result<Vec<PaymentSchedule>, DatabaseError> {
        let plan = self.get_payment_plan(plan_id).await?;
        self.get_enrollment(enrollment_id).await?;

        let conn = self.db().conn();
        conn.execute(
            "DELETE FROM payment_schedules WHERE enrollment_id = ?1",
            [enrollment_id],
        )
        .await?;

        let amounts = split_installments(plan.total_cents, plan.installments);
        let mut schedule = Vec::with_capacity(amounts.len());
        for (index, amount_cents) in (0u32..).zip(amounts) {
            let due_date = installment_due(first_due, plan.frequency, index).ok_or_else(|| {
                DatabaseError::Validation(format!("installment {} falls out of range", index + 1))
            })?;
            let id = self.db().generate_id(PREFIX_PAYMENT_SCHEDULE).await?;
            let sequence = index + 1;
            conn.execute(
                &format!(
                    "INSERT INTO payment_schedules ({SCHEDULE_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)"
                ),
                libsql::params![
                    id.as_str(),
                    enrollment_id,
                    plan_id,
                    i64::from(sequence),
                    due_date.format("%Y-%m-%d").to_string(),
                    amount_cents
                ],
            )
            .await?;
            schedule.push(PaymentSchedule {
                id,
                enrollment_id: enrollment_id.to_string(),
                plan_id: plan_id.to_string(),
                sequence,
                due_date,
                amount_cents,
                paid: false,
            });
        }

        conn.execute(
            "UPDATE enrollments SET payment_plan_id = ?1, updated_at = ?2 WHERE id = ?3",
            libsql::params![plan_id, ts(Utc::now()), enrollment_id],
        )
        .await?;
        self.audit(
            EntityType::Enrollment,
            enrollment_id,
            AuditAction::Updated,
            Some(serde_json::json!({
                "payment_plan_id": plan_id,
                "installments": schedule.len(),
            })),
            Utc::now(),
        )
        .await?;
        Ok(schedule)
    }

    pub async fn list_payment_schedule(
        &self,
        enrollment_id: &str,
    ) -> Result<Vec<PaymentSchedule>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SCHEDULE_COLS} FROM payment_schedules
                     WHERE enrollment_id = ?1 ORDER BY sequence"
                ),
                [enrollment_id],
            )
            .await?;
        collect_rows(rows, row_to_schedule).await
    }

    pub async fn mark_installment_paid(&self, schedule_id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute("UPDATE payment_schedules SET paid = 1 WHERE id = ?1", [schedule_id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::enrollment::NewEnrollment;
    use crate::test_support::helpers::{make_student, test_service};
    use crate::updates::course::CourseUpdateBuilder;
    use pretty_assertions::assert_eq;

    fn bde(name: &str) -> NewCourse {
        NewCourse {
            name: name.into(),
            course_type: CourseType::Bde,
            description: None,
            hours: 40,
            price_cents: 89_900,
            display_order: 0,
            active: true,
        }
    }

    #[tokio::test]
    async fn slugs_get_numbered_suffixes() {
        let svc = test_service().await;
        let a = svc.create_course(bde("Full BDE Course")).await.unwrap();
        let b = svc.create_course(bde("Full BDE Course")).await.unwrap();
        let c = svc.create_course(bde("Full BDE course!")).await.unwrap();
        assert_eq!(a.slug, "full-bde-course");
        assert_eq!(b.slug, "full-bde-course-2");
        assert_eq!(c.slug, "full-bde-course-3");
        assert_eq!(svc.get_course_by_slug("full-bde-course-2").await.unwrap().id, b.id);
    }

    #[tokio::test]
    async fn symbol_only_name_gets_random_slug() {
        let svc = test_service().await;
        let course = svc.create_course(bde("***")).await.unwrap();
        assert_eq!(course.slug.len(), 12);
        assert!(course.slug.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn long_names_stay_within_limit() {
        let svc = test_service().await;
        let name = "defensive ".repeat(30);
        let first = svc.create_course(bde(&name)).await.unwrap();
        let second = svc.create_course(bde(&name)).await.unwrap();
        assert!(first.slug.len() <= 170);
        assert!(second.slug.len() <= COURSE_SLUG_MAX);
        assert!(second.slug.ends_with("-2"));
    }

    #[tokio::test]
    async fn list_hides_inactive_and_orders() {
        let svc = test_service().await;
        let mut later = bde("Refresher");
        later.display_order = 2;
        svc.create_course(later).await.unwrap();
        let mut first = bde("Test Prep");
        first.display_order = 1;
        svc.create_course(first).await.unwrap();
        let hidden = svc.create_course(bde("Retired")).await.unwrap();
        svc.update_course(&hidden.id, CourseUpdateBuilder::new().active(false).build())
            .await
            .unwrap();

        let names: Vec<String> = svc
            .list_courses(false)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Test Prep", "Refresher"]);
        assert_eq!(svc.list_courses(true).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn module_sequence_is_unique_per_course() {
        let svc = test_service().await;
        let course = svc.create_course(bde("BDE")).await.unwrap();
        svc.add_course_module(&course.id, "Rules of the road", ModuleType::Theory, 1, 4)
            .await
            .unwrap();
        let err = svc
            .add_course_module(&course.id, "Parking", ModuleType::Driving, 1, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn monthly_plan_puts_remainder_last() {
        let svc = test_service().await;
        let student = make_student(&svc, "Ana").await;
        let course = svc.create_course(bde("BDE")).await.unwrap();
        let enrollment = svc
            .create_enrollment(NewEnrollment {
                student_id: student.id.clone(),
                course_id: course.id.clone(),
                ..Default::default()
            })
            .await
            .unwrap();
        let plan = svc
            .create_payment_plan(NewPaymentPlan {
                course_id: Some(course.id.clone()),
                name: "Three months".into(),
                frequency: PlanFrequency::Monthly,
                installments: 3,
                total_cents: 100_000,
            })
            .await
            .unwrap();

        let first_due = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let schedule = svc
            .apply_payment_plan(&enrollment.id, &plan.id, first_due)
            .await
            .unwrap();
        let dues: Vec<NaiveDate> = schedule.iter().map(|s| s.due_date).collect();
        assert_eq!(
            dues,
            vec![
                first_due,
                NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            ]
        );
        let amounts: Vec<i64> = schedule.iter().map(|s| s.amount_cents).collect();
        assert_eq!(amounts, vec![33_333, 33_333, 33_334]);

        assert_eq!(svc.list_payment_schedule(&enrollment.id).await.unwrap(), schedule);
        assert_eq!(
            svc.get_enrollment(&enrollment.id).await.unwrap().payment_plan_id,
            Some(plan.id)
        );
    }

    #[test]
    fn weekly_and_biweekly_spacing() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(
            installment_due(start, PlanFrequency::Weekly, 2),
            NaiveDate::from_ymd_opt(2026, 3, 16)
        );
        assert_eq!(
            installment_due(start, PlanFrequency::Biweekly, 1),
            NaiveDate::from_ymd_opt(2026, 3, 16)
        );
    }
}
