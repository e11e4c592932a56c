//! Staff notifications: audience fan-out into per-user receipts and the
//! per-user inbox operations.

use chrono::{DateTime, Utc};

use gear_core::audit_detail::ReceiptsSyncedDetail;
use gear_core::entities::{InboxItem, Notification, NotificationReceipt};
use gear_core::enums::{AuditAction, Audience, EntityType, NotificationLevel};
use gear_core::ids::{PREFIX_NOTIFICATION, PREFIX_RECEIPT};
use gear_core::responses::SyncReport;

use crate::error::DatabaseError;
use crate::helpers::{
    collect_rows, get_bool, get_opt_string, parse_datetime, parse_enum, parse_optional_datetime,
    ts,
};
use crate::service::GearService;

/// Inbox page size when the caller gives none.
pub const DEFAULT_INBOX_LIMIT: u32 = 10;
/// Largest inbox page.
pub const MAX_INBOX_LIMIT: u32 = 50;

const NOTIFICATION_COLS: &str =
    "id, title, body, level, audience, link, active, created_by, created_at";

const RECEIPT_COLS: &str = "id, notification_id, user_id, read_at, dismissed_at, created_at";

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub title: String,
    pub body: String,
    pub level: NotificationLevel,
    pub audience: Audience,
    pub link: Option<String>,
    pub created_by: Option<String>,
    /// Explicit recipients; only read when the audience is `selected`.
    pub recipients: Vec<String>,
}

impl NewNotification {
    /// An info-level notice for every active staff user.
    #[must_use]
    pub fn for_staff(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            level: NotificationLevel::Info,
            audience: Audience::Staff,
            link: None,
            created_by: None,
            recipients: Vec::new(),
        }
    }
}

/// Clamp a requested inbox page size into `1..=50`.
#[must_use]
pub fn clamp_inbox_limit(requested: Option<i64>) -> u32 {
    requested.map_or(DEFAULT_INBOX_LIMIT, |limit| {
        let clamped = limit.clamp(1, i64::from(MAX_INBOX_LIMIT));
        u32::try_from(clamped).unwrap_or(MAX_INBOX_LIMIT)
    })
}

fn row_to_notification(row: &libsql::Row) -> Result<Notification, DatabaseError> {
    Ok(Notification {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        level: parse_enum(&row.get::<String>(3)?)?,
        audience: parse_enum(&row.get::<String>(4)?)?,
        link: get_opt_string(row, 5)?,
        active: get_bool(row, 6)?,
        created_by: get_opt_string(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

fn row_to_receipt(row: &libsql::Row) -> Result<NotificationReceipt, DatabaseError> {
    Ok(NotificationReceipt {
        id: row.get(0)?,
        notification_id: row.get(1)?,
        user_id: row.get(2)?,
        read_at: parse_optional_datetime(get_opt_string(row, 3)?.as_deref())?,
        dismissed_at: parse_optional_datetime(get_opt_string(row, 4)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

fn row_to_inbox_item(row: &libsql::Row) -> Result<InboxItem, DatabaseError> {
    Ok(InboxItem {
        receipt_id: row.get(0)?,
        notification_id: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        level: parse_enum(&row.get::<String>(4)?)?,
        link: get_opt_string(row, 5)?,
        read_at: parse_optional_datetime(get_opt_string(row, 6)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

/// `?{start}, ?{start+1}, ...` for `n` values.
fn placeholders(start: usize, n: usize) -> String {
    (start..start + n)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl GearService {
    /// Store a notification and fan it out to its audience.
    pub async fn create_notification(
        &self,
        new: NewNotification,
    ) -> Result<Notification, DatabaseError> {
        if new.title.trim().is_empty() {
            return Err(DatabaseError::Validation("notification title is required".into()));
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_NOTIFICATION).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO notifications ({NOTIFICATION_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8)"
                ),
                libsql::params![
                    id.as_str(),
                    new.title.as_str(),
                    new.body.as_str(),
                    new.level.as_str(),
                    new.audience.as_str(),
                    new.link.as_deref(),
                    new.created_by.as_deref(),
                    ts(now)
                ],
            )
            .await?;
        self.write_recipients(&id, &new.recipients).await?;
        self.audit(EntityType::Notification, &id, AuditAction::Created, None, now)
            .await?;
        self.sync_receipts(&id).await?;

        Ok(Notification {
            id,
            title: new.title,
            body: new.body,
            level: new.level,
            audience: new.audience,
            link: new.link,
            active: true,
            created_by: new.created_by,
            created_at: now,
        })
    }

    async fn write_recipients(&self, id: &str, recipients: &[String]) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "DELETE FROM notification_recipients WHERE notification_id = ?1",
                [id],
            )
            .await?;
        for user_id in recipients {
            self.db()
                .conn()
                .execute(
                    "INSERT OR IGNORE INTO notification_recipients (notification_id, user_id)
                     VALUES (?1, ?2)",
                    libsql::params![id, user_id.as_str()],
                )
                .await?;
        }
        Ok(())
    }

    pub async fn get_notification(&self, id: &str) -> Result<Notification, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {NOTIFICATION_COLS} FROM notifications WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_notification(&row)
    }

    pub async fn list_notifications(&self, limit: u32) -> Result<Vec<Notification>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {NOTIFICATION_COLS} FROM notifications
                     ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
                ),
                (),
            )
            .await?;
        collect_rows(rows, row_to_notification).await
    }

    async fn notification_recipient_ids(&self, id: &str) -> Result<Vec<String>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT user_id FROM notification_recipients WHERE notification_id = ?1
                 ORDER BY user_id",
                [id],
            )
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        Ok(ids)
    }

    /// Reconcile receipts with the notification's current audience.
    ///
    /// Receipts of users outside the audience are deleted; users in it who
    /// lack one get a fresh unread receipt. Existing receipts keep their
    /// read state.
    pub async fn sync_receipts(&self, notification_id: &str) -> Result<SyncReport, DatabaseError> {
        let notification = self.get_notification(notification_id).await?;
        let targets = match notification.audience {
            Audience::Selected => self.notification_recipient_ids(notification_id).await?,
            Audience::Staff => self.active_staff_ids().await?,
        };

        let removed = if targets.is_empty() {
            self.db()
                .conn()
                .execute(
                    "DELETE FROM notification_receipts WHERE notification_id = ?1",
                    [notification_id],
                )
                .await?
        } else {
            let mut params: Vec<libsql::Value> = vec![notification_id.into()];
            params.extend(targets.iter().map(|t| libsql::Value::from(t.as_str())));
            self.db()
                .conn()
                .execute(
                    &format!(
                        "DELETE FROM notification_receipts
                         WHERE notification_id = ?1 AND user_id NOT IN ({})",
                        placeholders(2, targets.len())
                    ),
                    libsql::params_from_iter(params),
                )
                .await?
        };

        let now = Utc::now();
        let mut added = 0;
        for user_id in &targets {
            let id = self.db().generate_id(PREFIX_RECEIPT).await?;
            added += self
                .db()
                .conn()
                .execute(
                    "INSERT OR IGNORE INTO notification_receipts
                         (id, notification_id, user_id, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    libsql::params![id.as_str(), notification_id, user_id.as_str(), ts(now)],
                )
                .await?;
        }

        let report = SyncReport {
            added: u32::try_from(added).unwrap_or(u32::MAX),
            removed: u32::try_from(removed).unwrap_or(u32::MAX),
        };
        if report != SyncReport::default() {
            self.audit(
                EntityType::Notification,
                notification_id,
                AuditAction::Synced,
                Some(serde_json::to_value(ReceiptsSyncedDetail {
                    added: report.added,
                    removed: report.removed,
                })?),
                now,
            )
            .await?;
        }
        tracing::debug!(notification = notification_id, added = report.added, removed = report.removed, "receipts synced");
        Ok(report)
    }

    /// Replace the explicit recipient list and resync.
    pub async fn set_notification_recipients(
        &self,
        notification_id: &str,
        recipients: &[String],
    ) -> Result<SyncReport, DatabaseError> {
        self.get_notification(notification_id).await?;
        self.write_recipients(notification_id, recipients).await?;
        self.sync_receipts(notification_id).await
    }

    /// Bulk activate or deactivate. Returns how many rows changed.
    pub async fn set_notification_active(
        &self,
        ids: &[String],
        active: bool,
    ) -> Result<u32, DatabaseError> {
        let now = Utc::now();
        let mut changed = 0;
        for id in ids {
            let n = self
                .db()
                .conn()
                .execute(
                    "UPDATE notifications SET active = ?1 WHERE id = ?2 AND active != ?1",
                    libsql::params![i64::from(active), id.as_str()],
                )
                .await?;
            if n > 0 {
                self.audit(
                    EntityType::Notification,
                    id,
                    AuditAction::Updated,
                    Some(serde_json::json!({ "active": active })),
                    now,
                )
                .await?;
                changed += 1;
            }
        }
        Ok(changed)
    }

    pub async fn list_notification_receipts(
        &self,
        notification_id: &str,
    ) -> Result<Vec<NotificationReceipt>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {RECEIPT_COLS} FROM notification_receipts
                     WHERE notification_id = ?1 ORDER BY user_id"
                ),
                [notification_id],
            )
            .await?;
        collect_rows(rows, row_to_receipt).await
    }

    pub async fn get_receipt(&self, receipt_id: &str) -> Result<NotificationReceipt, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {RECEIPT_COLS} FROM notification_receipts WHERE id = ?1"),
                [receipt_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_receipt(&row)
    }

    /// Unread receipts of active notifications.
    pub async fn unread_count(&self, user_id: &str) -> Result<u32, DatabaseError> {
        self.require_active_staff(user_id).await?;
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM notification_receipts r
                 JOIN notifications n ON n.id = r.notification_id
                 WHERE r.user_id = ?1 AND n.active = 1 AND r.read_at IS NULL",
                [user_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(u32::try_from(row.get::<i64>(0)?).unwrap_or(0))
    }

    /// A user's inbox, newest notification first.
    pub async fn list_receipts(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<InboxItem>, DatabaseError> {
        self.require_active_staff(user_id).await?;
        let limit = clamp_inbox_limit(limit);
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT r.id, n.id, n.title, n.body, n.level, n.link, r.read_at, n.created_at
                     FROM notification_receipts r
                     JOIN notifications n ON n.id = r.notification_id
                     WHERE r.user_id = ?1 AND n.active = 1
                     ORDER BY n.created_at DESC, r.rowid DESC LIMIT {limit}"
                ),
                [user_id],
            )
            .await?;
        collect_rows(rows, row_to_inbox_item).await
    }

    /// Mark one of the user's receipts read and return when it was read.
    ///
    /// An already-read receipt keeps its original time. Receipts of other
    /// users are `NoResult`.
    pub async fn mark_read(
        &self,
        receipt_id: &str,
        user_id: &str,
    ) -> Result<DateTime<Utc>, DatabaseError> {
        self.require_active_staff(user_id).await?;
        self.db()
            .conn()
            .execute(
                "UPDATE notification_receipts SET read_at = ?1
                 WHERE id = ?2 AND user_id = ?3 AND read_at IS NULL",
                libsql::params![ts(Utc::now()), receipt_id, user_id],
            )
            .await?;
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT read_at FROM notification_receipts WHERE id = ?1 AND user_id = ?2",
                libsql::params![receipt_id, user_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        parse_optional_datetime(get_opt_string(&row, 0)?.as_deref())?
            .ok_or_else(|| DatabaseError::InvalidState(format!("receipt {receipt_id} has no read time")))
    }

    /// Mark every unread receipt of active notifications read.
    pub async fn mark_all_read(&self, user_id: &str) -> Result<u32, DatabaseError> {
        self.require_active_staff(user_id).await?;
        let updated = self
            .db()
            .conn()
            .execute(
                "UPDATE notification_receipts SET read_at = ?1
                 WHERE user_id = ?2 AND read_at IS NULL
                   AND notification_id IN (SELECT id FROM notifications WHERE active = 1)",
                libsql::params![ts(Utc::now()), user_id],
            )
            .await?;
        Ok(u32::try_from(updated).unwrap_or(u32::MAX))
    }

    async fn set_receipt_field(
        &self,
        receipt_id: &str,
        column: &str,
        value: Option<String>,
    ) -> Result<NotificationReceipt, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                &format!("UPDATE notification_receipts SET {column} = ?1 WHERE id = ?2"),
                libsql::params![value, receipt_id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_receipt(receipt_id).await
    }

    pub async fn mark_unread(&self, receipt_id: &str) -> Result<NotificationReceipt, DatabaseError> {
        self.set_receipt_field(receipt_id, "read_at", None).await
    }

    pub async fn dismiss(&self, receipt_id: &str) -> Result<NotificationReceipt, DatabaseError> {
        self.set_receipt_field(receipt_id, "dismissed_at", Some(ts(Utc::now())))
            .await
    }

    pub async fn clear_dismiss(&self, receipt_id: &str) -> Result<NotificationReceipt, DatabaseError> {
        self.set_receipt_field(receipt_id, "dismissed_at", None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::staff::NewStaffUser;
    use crate::test_support::helpers::test_service;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    async fn staff(svc: &GearService, name: &str) -> String {
        svc.create_staff_user(NewStaffUser::staff(name))
            .await
            .unwrap()
            .id
    }

    #[rstest]
    #[case(None, 10)]
    #[case(Some(0), 1)]
    #[case(Some(7), 7)]
    #[case(Some(500), 50)]
    #[case(Some(-5), 1)]
    #[case(Some(i64::MAX), 50)]
    fn inbox_limit_is_clamped(#[case] requested: Option<i64>, #[case] expected: u32) {
        assert_eq!(clamp_inbox_limit(requested), expected);
    }

    #[tokio::test]
    async fn staff_audience_fans_out_to_active_staff() {
        let svc = test_service().await;
        let ana = staff(&svc, "ana").await;
        let ben = staff(&svc, "ben").await;
        let gone = staff(&svc, "gone").await;
        svc.set_staff_active(&gone, false).await.unwrap();

        let n = svc
            .create_notification(NewNotification::for_staff("Road closed", "Use Elm St"))
            .await
            .unwrap();
        let users: Vec<String> = svc
            .list_notification_receipts(&n.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.user_id)
            .collect();
        let mut expected = vec![ana.clone(), ben];
        expected.sort();
        assert_eq!(users, expected);

        // A second sync is a no-op.
        assert_eq!(svc.sync_receipts(&n.id).await.unwrap(), SyncReport::default());
    }

    #[tokio::test]
    async fn selected_audience_follows_recipient_list() {
        let svc = test_service().await;
        let ana = staff(&svc, "ana").await;
        let ben = staff(&svc, "ben").await;
        let n = svc
            .create_notification(NewNotification {
                audience: Audience::Selected,
                recipients: vec![ana.clone()],
                ..NewNotification::for_staff("Payroll", "")
            })
            .await
            .unwrap();
        assert_eq!(svc.list_notification_receipts(&n.id).await.unwrap().len(), 1);

        let report = svc
            .set_notification_recipients(&n.id, &[ben.clone()])
            .await
            .unwrap();
        assert_eq!(report, SyncReport { added: 1, removed: 1 });
        let receipts = svc.list_notification_receipts(&n.id).await.unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].user_id, ben);
    }

    #[tokio::test]
    async fn inbox_read_flow() {
        let svc = test_service().await;
        let ana = staff(&svc, "ana").await;
        let first = svc
            .create_notification(NewNotification::for_staff("First", "a"))
            .await
            .unwrap();
        svc.create_notification(NewNotification::for_staff("Second", "b"))
            .await
            .unwrap();
        assert_eq!(svc.unread_count(&ana).await.unwrap(), 2);

        let inbox = svc.list_receipts(&ana, None).await.unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].title, "Second");

        let receipt = inbox[1].receipt_id.clone();
        let read_at = svc.mark_read(&receipt, &ana).await.unwrap();
        assert_eq!(svc.mark_read(&receipt, &ana).await.unwrap(), read_at);
        assert_eq!(svc.unread_count(&ana).await.unwrap(), 1);

        svc.set_notification_active(&[first.id.clone()], false)
            .await
            .unwrap();
        assert_eq!(svc.list_receipts(&ana, Some(50)).await.unwrap().len(), 1);
        assert_eq!(svc.mark_all_read(&ana).await.unwrap(), 1);
        assert_eq!(svc.unread_count(&ana).await.unwrap(), 0);

        let unread = svc.mark_unread(&receipt).await.unwrap();
        assert!(unread.read_at.is_none());
        let dismissed = svc.dismiss(&receipt).await.unwrap();
        assert!(dismissed.dismissed_at.is_some());
        assert!(svc.clear_dismiss(&receipt).await.unwrap().dismissed_at.is_none());
    }

    #[tokio::test]
    async fn other_users_receipts_are_not_found() {
        let svc = test_service().await;
        let ana = staff(&svc, "ana").await;
        let ben = staff(&svc, "ben").await;
        svc.create_notification(NewNotification::for_staff("Hi", ""))
            .await
            .unwrap();
        let anas = svc.list_receipts(&ana, None).await.unwrap()[0].receipt_id.clone();
        assert!(matches!(
            svc.mark_read(&anas, &ben).await,
            Err(DatabaseError::NoResult)
        ));
    }

    #[tokio::test]
    async fn inactive_users_are_forbidden() {
        let svc = test_service().await;
        let ana = staff(&svc, "ana").await;
        svc.set_staff_active(&ana, false).await.unwrap();
        assert!(matches!(
            svc.unread_count(&ana).await,
            Err(DatabaseError::Forbidden(_))
        ));
        assert!(matches!(
            svc.mark_all_read(&ana).await,
            Err(DatabaseError::Forbidden(_))
        ));
    }
}
