//! Tokenized iCalendar feeds and stored external calendar accounts.

use chrono::{DateTime, Utc};

use gear_core::entities::{CalendarAccount, CalendarFeed};
use gear_core::enums::{AuditAction, CalendarProvider, EntityType, FeedType};
use gear_core::ids::{PREFIX_CALENDAR_ACCOUNT, PREFIX_CALENDAR_FEED};
use gear_core::render::ics;

use crate::error::DatabaseError;
use crate::helpers::{
    collect_rows, datetime_param, get_bool, get_opt_string, parse_datetime, parse_enum,
    parse_optional_datetime, ts,
};
use crate::repos::lesson::{LESSON_COLS, row_to_lesson};
use crate::service::GearService;

const FEED_COLS: &str =
    "id, token, feed_type, student_id, instructor_id, include_past, active, created_at";

const ACCOUNT_COLS: &str = "id, owner_id, provider, account_email, access_token, refresh_token, \
     token_expires_at, calendar_id, active, created_at, updated_at";

/// Random bytes behind a feed token (32 hex characters).
const FEED_TOKEN_BYTES: u32 = 16;

#[derive(Debug, Clone)]
pub struct NewCalendarFeed {
    pub feed_type: FeedType,
    pub student_id: Option<String>,
    pub instructor_id: Option<String>,
    pub include_past: bool,
}

impl NewCalendarFeed {
    #[must_use]
    pub fn for_student(student_id: impl Into<String>) -> Self {
        Self {
            feed_type: FeedType::Student,
            student_id: Some(student_id.into()),
            instructor_id: None,
            include_past: false,
        }
    }

    #[must_use]
    pub fn for_instructor(instructor_id: impl Into<String>) -> Self {
        Self {
            feed_type: FeedType::Instructor,
            student_id: None,
            instructor_id: Some(instructor_id.into()),
            include_past: false,
        }
    }
}

/// OAuth credentials handed over after a provider's consent flow.
#[derive(Debug, Clone)]
pub struct CalendarCredentials {
    pub owner_id: String,
    pub provider: CalendarProvider,
    pub account_email: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub calendar_id: Option<String>,
}

fn row_to_feed(row: &libsql::Row) -> Result<CalendarFeed, DatabaseError> {
    Ok(CalendarFeed {
        id: row.get(0)?,
        token: row.get(1)?,
        feed_type: parse_enum(&row.get::<String>(2)?)?,
        student_id: get_opt_string(row, 3)?,
        instructor_id: get_opt_string(row, 4)?,
        include_past: get_bool(row, 5)?,
        active: get_bool(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

fn row_to_account(row: &libsql::Row) -> Result<CalendarAccount, DatabaseError> {
    Ok(CalendarAccount {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        provider: parse_enum(&row.get::<String>(2)?)?,
        account_email: get_opt_string(row, 3)?,
        access_token: row.get(4)?,
        refresh_token: get_opt_string(row, 5)?,
        token_expires_at: parse_optional_datetime(get_opt_string(row, 6)?.as_deref())?,
        calendar_id: get_opt_string(row, 7)?,
        active: get_bool(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

impl GearService {
    pub async fn create_calendar_feed(
        &self,
        new: NewCalendarFeed,
    ) -> Result<CalendarFeed, DatabaseError> {
        let owner_missing = match new.feed_type {
            FeedType::Student => new.student_id.is_none(),
            FeedType::Instructor => new.instructor_id.is_none(),
        };
        if owner_missing {
            return Err(DatabaseError::Validation(format!(
                "a {} feed needs a {} id",
                new.feed_type, new.feed_type
            )));
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_CALENDAR_FEED).await?;
        let token = self.db().random_hex(FEED_TOKEN_BYTES).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO calendar_feeds ({FEED_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)"
                ),
                libsql::params![
                    id.as_str(),
                    token.as_str(),
                    new.feed_type.as_str(),
                    new.student_id.as_deref(),
                    new.instructor_id.as_deref(),
                    i64::from(new.include_past),
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::CalendarFeed, &id, AuditAction::Created, None, now)
            .await?;

        Ok(CalendarFeed {
            id,
            token,
            feed_type: new.feed_type,
            student_id: new.student_id,
            instructor_id: new.instructor_id,
            include_past: new.include_past,
            active: true,
            created_at: now,
        })
    }

    pub async fn list_calendar_feeds(&self) -> Result<Vec<CalendarFeed>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {FEED_COLS} FROM calendar_feeds ORDER BY created_at, rowid"),
                (),
            )
            .await?;
        collect_rows(rows, row_to_feed).await
    }

    pub async fn deactivate_calendar_feed(&self, id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute("UPDATE calendar_feeds SET active = 0 WHERE id = ?1", [id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.audit(
            EntityType::CalendarFeed,
            id,
            AuditAction::Updated,
            Some(serde_json::json!({ "active": false })),
            Utc::now(),
        )
        .await
    }

    async fn active_feed_by_token(&self, token: &str) -> Result<CalendarFeed, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {FEED_COLS} FROM calendar_feeds WHERE token = ?1 AND active = 1"),
                [token],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_feed(&row)
    }

    /// iCalendar text for the feed behind `token`.
    ///
    /// Unknown and deactivated tokens are `NoResult`.
    pub async fn render_feed(&self, token: &str, now: DateTime<Utc>) -> Result<String, DatabaseError> {
        let feed = self.active_feed_by_token(token).await?;

        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let owner = match feed.feed_type {
            FeedType::Student => feed.student_id.as_deref().map(|id| ("student_id", id)),
            FeedType::Instructor => feed.instructor_id.as_deref().map(|id| ("instructor_id", id)),
        };
        if let Some((column, id)) = owner {
            params.push(id.into());
            conditions.push(format!("{column} = ?{}", params.len()));
        }
        if !feed.include_past {
            params.push(ts(now).into());
            conditions.push(format!("end_time >= ?{}", params.len()));
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
                &format!("SELECT {LESSON_COLS} FROM lessons {where_clause} ORDER BY start_time"),
                libsql::params_from_iter(params),
            )
            .await?;
        let lessons = collect_rows(rows, row_to_lesson).await?;
        tracing::debug!(feed = %feed.id, lessons = lessons.len(), "calendar feed rendered");
        Ok(ics::render_feed(&lessons, &self.settings().feed_identity, now))
    }

    /// Store credentials for an owner's provider, replacing earlier ones and
    /// reactivating the account.
    pub async fn upsert_calendar_account(
        &self,
        creds: CalendarCredentials,
    ) -> Result<CalendarAccount, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_CALENDAR_ACCOUNT).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO calendar_accounts ({ACCOUNT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?9)
                     ON CONFLICT(owner_id, provider) DO UPDATE SET
                         account_email = excluded.account_email,
                         access_token = excluded.access_token,
                         refresh_token = COALESCE(excluded.refresh_token, refresh_token),
                         token_expires_at = excluded.token_expires_at,
                         calendar_id = COALESCE(excluded.calendar_id, calendar_id),
                         active = 1,
                         updated_at = excluded.updated_at"
                ),
                libsql::params![
                    id.as_str(),
                    creds.owner_id.as_str(),
                    creds.provider.as_str(),
                    creds.account_email.as_deref(),
                    creds.access_token.as_str(),
                    creds.refresh_token.as_deref(),
                    datetime_param(creds.token_expires_at),
                    creds.calendar_id.as_deref(),
                    ts(now)
                ],
            )
            .await?;
        let account = self
            .active_account(&creds.owner_id, creds.provider)
            .await?
            .ok_or(DatabaseError::NoResult)?;
        self.audit(EntityType::CalendarAccount, &account.id, AuditAction::Updated, None, now)
            .await?;
        Ok(account)
    }

    pub async fn list_calendar_accounts(
        &self,
        owner_id: Option<&str>,
    ) -> Result<Vec<CalendarAccount>, DatabaseError> {
        let filter = if owner_id.is_some() { "WHERE owner_id = ?1" } else { "" };
        let params: Vec<libsql::Value> = owner_id.map(libsql::Value::from).into_iter().collect();
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {ACCOUNT_COLS} FROM calendar_accounts {filter}
                     ORDER BY owner_id, provider"
                ),
                libsql::params_from_iter(params),
            )
            .await?;
        collect_rows(rows, row_to_account).await
    }

    pub async fn deactivate_calendar_account(&self, id: &str) -> Result<(), DatabaseError> {
        let now = Utc::now();
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE calendar_accounts SET active = 0, updated_at = ?1 WHERE id = ?2",
                libsql::params![ts(now), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.audit(
            EntityType::CalendarAccount,
            id,
            AuditAction::Updated,
            Some(serde_json::json!({ "active": false })),
            now,
        )
        .await
    }

    /// The owner's active account for a provider, if connected.
    pub async fn active_account(
        &self,
        owner_id: &str,
        provider: CalendarProvider,
    ) -> Result<Option<CalendarAccount>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {ACCOUNT_COLS} FROM calendar_accounts
                     WHERE owner_id = ?1 AND provider = ?2 AND active = 1"
                ),
                libsql::params![owner_id, provider.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_account(&row)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::staff::NewStaffUser;
    use crate::test_support::helpers::{at, lesson_at, make_student, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn feed_lists_future_lessons_of_its_student() {
        let svc = test_service().await;
        let ana = make_student(&svc, "Ana").await;
        let ben = make_student(&svc, "Ben").await;
        svc.schedule_lesson(lesson_at(&ana.id, at(1, 9))).await.unwrap();
        let future = svc.schedule_lesson(lesson_at(&ana.id, at(10, 9))).await.unwrap();
        svc.schedule_lesson(lesson_at(&ben.id, at(10, 11))).await.unwrap();

        let feed = svc
            .create_calendar_feed(NewCalendarFeed::for_student(&ana.id))
            .await
            .unwrap();
        assert_eq!(feed.token.len(), 32);

        let ics = svc.render_feed(&feed.token, at(5, 0)).await.unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains(&format!("UID:lesson-{}@gearbox", future.id)));
        assert!(ics.contains("DTSTART:20260410T090000Z"));
        assert!(ics.contains("PRODID:-//Gearbox//CRM//EN"));
    }

    #[tokio::test]
    async fn include_past_keeps_everything() {
        let svc = test_service().await;
        let ana = make_student(&svc, "Ana").await;
        svc.schedule_lesson(lesson_at(&ana.id, at(1, 9))).await.unwrap();
        let feed = svc
            .create_calendar_feed(NewCalendarFeed {
                include_past: true,
                ..NewCalendarFeed::for_student(&ana.id)
            })
            .await
            .unwrap();
        let ics = svc.render_feed(&feed.token, at(20, 0)).await.unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    }

    #[tokio::test]
    async fn inactive_or_unknown_token_is_not_found() {
        let svc = test_service().await;
        let ana = make_student(&svc, "Ana").await;
        let feed = svc
            .create_calendar_feed(NewCalendarFeed::for_student(&ana.id))
            .await
            .unwrap();
        svc.deactivate_calendar_feed(&feed.id).await.unwrap();
        assert!(matches!(
            svc.render_feed(&feed.token, Utc::now()).await,
            Err(DatabaseError::NoResult)
        ));
        assert!(matches!(
            svc.render_feed("nope", Utc::now()).await,
            Err(DatabaseError::NoResult)
        ));
    }

    #[tokio::test]
    async fn feed_without_owner_is_rejected() {
        let svc = test_service().await;
        let err = svc
            .create_calendar_feed(NewCalendarFeed {
                instructor_id: None,
                ..NewCalendarFeed::for_instructor("ins-1")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn account_upsert_replaces_tokens() {
        let svc = test_service().await;
        let owner = svc
            .create_staff_user(NewStaffUser::staff("ana"))
            .await
            .unwrap();
        let creds = CalendarCredentials {
            owner_id: owner.id.clone(),
            provider: CalendarProvider::Google,
            account_email: Some("ana@example.com".into()),
            access_token: "first".into(),
            refresh_token: Some("refresh".into()),
            token_expires_at: None,
            calendar_id: Some("primary".into()),
        };
        let first = svc.upsert_calendar_account(creds.clone()).await.unwrap();
        svc.deactivate_calendar_account(&first.id).await.unwrap();
        assert!(
            svc.active_account(&owner.id, CalendarProvider::Google)
                .await
                .unwrap()
                .is_none()
        );

        let second = svc
            .upsert_calendar_account(CalendarCredentials {
                access_token: "second".into(),
                refresh_token: None,
                ..creds
            })
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.access_token, "second");
        assert_eq!(second.refresh_token.as_deref(), Some("refresh"));
        assert!(second.active);
        assert_eq!(svc.list_calendar_accounts(Some(&owner.id)).await.unwrap().len(), 1);
    }
}
