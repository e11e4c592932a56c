//! Back-office dashboard aggregates.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use gear_core::enums::LessonStatus;
use gear_core::responses::{DashboardKpis, DashboardSummary, DayCount, StatusCount};

use crate::error::DatabaseError;
use crate::helpers::{collect_rows, parse_date, ts};
use crate::repos::billing::{PAYMENT_COLS, row_to_payment};
use crate::service::GearService;

/// Rows in each "recent" and "upcoming" list.
const RECENT_LIMIT: u32 = 5;

/// Days covered by the lesson load chart, today included.
const LOAD_DAYS: i64 = 7;

fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

fn to_u32(n: i64) -> u32 {
    u32::try_from(n).unwrap_or(0)
}

impl GearService {
    async fn scalar(&self, sql: &str, params: impl libsql::params::IntoParams) -> Result<i64, DatabaseError> {
        let mut rows = self.db().conn().query(sql, params).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<Option<i64>>(0)?.unwrap_or(0))
    }

    /// `status -> count` for a table, largest group first.
    async fn status_counts(&self, table: &str) -> Result<Vec<StatusCount>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT status, COUNT(*) FROM {table} GROUP BY status ORDER BY COUNT(*) DESC, status"
                ),
                (),
            )
            .await?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next().await? {
            counts.push(StatusCount {
                status: row.get(0)?,
                count: to_u32(row.get(1)?),
            });
        }
        Ok(counts)
    }

    async fn kpis(&self, now: DateTime<Utc>) -> Result<DashboardKpis, DatabaseError> {
        let month = ts(start_of_month(now));
        Ok(DashboardKpis {
            total_students: to_u32(self.scalar("SELECT COUNT(*) FROM students", ()).await?),
            revenue_this_month_cents: self
                .scalar(
                    "SELECT SUM(amount_cents) FROM payments WHERE status = 'completed' AND paid_at >= ?1",
                    [month.as_str()],
                )
                .await?,
            new_leads_this_month: to_u32(
                self.scalar("SELECT COUNT(*) FROM leads WHERE created_at >= ?1", [month.as_str()])
                    .await?,
            ),
            pending_enrollment_requests: to_u32(
                self.scalar("SELECT COUNT(*) FROM enrollment_requests WHERE status = 'new'", ())
                    .await?,
            ),
        })
    }

    /// Counts for every lesson status, zeros included, in lifecycle order.
    async fn lesson_status_counts(&self) -> Result<Vec<StatusCount>, DatabaseError> {
        let found: HashMap<String, u32> = self
            .status_counts("lessons")
            .await?
            .into_iter()
            .map(|c| (c.status, c.count))
            .collect();
        Ok(LessonStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: status.as_str().to_string(),
                count: found.get(status.as_str()).copied().unwrap_or(0),
            })
            .collect())
    }

    /// Scheduled lessons per UTC day for the coming week.
    async fn lesson_load(&self, now: DateTime<Utc>) -> Result<Vec<DayCount>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT substr(start_time, 1, 10), COUNT(*) FROM lessons
                 WHERE status = 'scheduled' AND start_time >= ?1 AND start_time < ?2
                 GROUP BY substr(start_time, 1, 10)",
                libsql::params![ts(now), ts(now + Duration::days(LOAD_DAYS))],
            )
            .await?;
        let mut by_day = HashMap::new();
        while let Some(row) = rows.next().await? {
            by_day.insert(parse_date(&row.get::<String>(0)?)?, to_u32(row.get(1)?));
        }
        let today = now.date_naive();
        Ok((0..LOAD_DAYS)
            .map(|offset| {
                let date = today + Duration::days(offset);
                DayCount {
                    date,
                    count: by_day.get(&date).copied().unwrap_or(0),
                }
            })
            .collect())
    }

    pub async fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardSummary, DatabaseError> {
        let recent_payments = {
            let rows = self
                .db()
                .conn()
                .query(
                    &format!(
                        "SELECT {PAYMENT_COLS} FROM payments WHERE status = 'completed'
                         ORDER BY COALESCE(paid_at, created_at) DESC, rowid DESC LIMIT {RECENT_LIMIT}"
                    ),
                    (),
                )
                .await?;
            collect_rows(rows, row_to_payment).await?
        };

        Ok(DashboardSummary {
            generated_at: now,
            kpis: self.kpis(now).await?,
            leads_by_status: self.status_counts("leads").await?,
            invoices_by_status: self.status_counts("invoices").await?,
            lessons_by_status: self.lesson_status_counts().await?,
            lessons_next_7_days: self.lesson_load(now).await?,
            recent_leads: self.list_leads(None, RECENT_LIMIT).await?,
            upcoming_lessons: self.upcoming_lessons(now, RECENT_LIMIT).await?,
            recent_payments,
            calendar_embed_url: self.settings().calendar_embed_url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::billing::{NewInvoice, NewPayment};
    use crate::test_support::helpers::{at, lesson_at, make_student, test_service};
    use gear_core::enums::{PaymentMethod, PaymentStatus};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn empty_store_has_zeroed_sections() {
        let svc = test_service().await;
        let summary = svc.dashboard(at(15, 12)).await.unwrap();
        assert_eq!(summary.kpis, DashboardKpis::default());
        assert!(summary.leads_by_status.is_empty());
        assert_eq!(summary.lessons_by_status.len(), 4);
        assert!(summary.lessons_by_status.iter().all(|c| c.count == 0));
        assert_eq!(summary.lessons_next_7_days.len(), 7);
        assert_eq!(summary.lessons_next_7_days[0].date, at(15, 0).date_naive());
    }

    #[tokio::test]
    async fn counts_lessons_and_revenue() {
        let svc = test_service().await;
        let ana = make_student(&svc, "Ana").await;
        let now = Utc::now();
        svc.schedule_lesson(lesson_at(&ana.id, now + Duration::hours(2)))
            .await
            .unwrap();
        svc.schedule_lesson(lesson_at(&ana.id, now + Duration::days(2)))
            .await
            .unwrap();

        let invoice = svc
            .create_invoice(NewInvoice {
                student_id: ana.id.clone(),
                total_cents: 30_000,
                ..Default::default()
            })
            .await
            .unwrap();
        svc.record_payment(NewPayment {
            invoice_id: invoice.id,
            amount_cents: 12_500,
            method: PaymentMethod::Cash,
            status: PaymentStatus::Completed,
            reference: None,
            paid_at: Some(now),
        })
        .await
        .unwrap();

        let summary = svc.dashboard(now).await.unwrap();
        assert_eq!(summary.kpis.total_students, 1);
        assert_eq!(summary.kpis.revenue_this_month_cents, 12_500);
        assert_eq!(summary.upcoming_lessons.len(), 2);
        assert_eq!(summary.recent_payments.len(), 1);
        let scheduled = &summary.lessons_by_status[0];
        assert_eq!((scheduled.status.as_str(), scheduled.count), ("scheduled", 2));
        let week: u32 = summary.lessons_next_7_days.iter().map(|d| d.count).sum();
        assert_eq!(week, 2);
        assert_eq!(
            summary.invoices_by_status,
            vec![StatusCount { status: "draft".into(), count: 1 }]
        );
    }
}
