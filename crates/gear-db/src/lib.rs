//! # gear-db
//!
//! libSQL storage and business operations for Gearbox.
//!
//! Holds all relational state: leads and intake requests, students, the course
//! catalog, enrollments, lessons and their resources, invoices, documents,
//! communications, staff notifications, calendar feeds, marketing content and
//! the audit trail. Business rules that need the store (lesson conflict checks,
//! reminder generation, receipt fan-out, Stripe event application) live on
//! [`service::GearService`] next to the SQL they depend on.

pub mod documents;
pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle.
///
/// Wraps a libSQL database and connection and provides ID generation.
pub struct GearDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl GearDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        if path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }

        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let gear_db = Self { db, conn };
        gear_db.run_migrations().await?;
        Ok(gear_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"led-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        self.random_hex_prefixed(prefix, 4).await
    }

    /// Random lowercase hex of `bytes * 2` characters, e.g. for feed tokens.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn random_hex(&self, bytes: u32) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(&format!("SELECT lower(hex(randomblob({bytes})))"), ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }

    async fn random_hex_prefixed(&self, prefix: &str, bytes: u32) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob({bytes})))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> GearDb {
        GearDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_missing_parent_dirs() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("school/data/gearbox.db");
        let _db = GearDb::open_local(path.to_str().unwrap()).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "leads",
            "enrollment_requests",
            "students",
            "courses",
            "enrollments",
            "lessons",
            "conflict_detections",
            "invoices",
            "payments",
            "certificates",
            "ministry_submissions",
            "communication_logs",
            "scheduled_messages",
            "reminder_logs",
            "staff_users",
            "notifications",
            "notification_receipts",
            "calendar_feeds",
            "calendar_accounts",
            "blog_posts",
            "testimonials",
            "audit_trail",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("led").await.unwrap();
        assert!(id.starts_with("led-"), "ID should start with 'led-': {id}");
        assert_eq!(id.len(), 12, "3 prefix + 1 dash + 8 hex: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in gear_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn random_hex_length() {
        let db = test_db().await;
        let token = db.random_hex(16).await.unwrap();
        assert_eq!(token.len(), 32);
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn lesson_end_must_follow_start() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO students (id, first_name, created_at, updated_at) VALUES ('stu-1', 'Sam', 'x', 'x')",
                (),
            )
            .await
            .unwrap();
        let result = db
            .conn()
            .execute(
                "INSERT INTO lessons (id, student_id, lesson_type, start_time, end_time, created_at, updated_at)
                 VALUES ('lsn-1', 'stu-1', 'driving', '2026-04-01T10:00:00.000000Z', '2026-04-01T09:00:00.000000Z', 'x', 'x')",
                (),
            )
            .await;
        assert!(result.is_err(), "CHECK constraint should reject end <= start");
    }

    #[tokio::test]
    async fn receipt_pair_is_unique() {
        let db = test_db().await;
        db.conn()
            .execute_batch(
                "INSERT INTO staff_users (id, username, created_at) VALUES ('usr-1', 'ana', 'x');
                 INSERT INTO notifications (id, title, created_at) VALUES ('ntf-1', 'Hi', 'x');
                 INSERT INTO notification_receipts (id, notification_id, user_id, created_at) VALUES ('rcp-1', 'ntf-1', 'usr-1', 'x');",
            )
            .await
            .unwrap();
        let dup = db
            .conn()
            .execute(
                "INSERT INTO notification_receipts (id, notification_id, user_id, created_at) VALUES ('rcp-2', 'ntf-1', 'usr-1', 'x')",
                (),
            )
            .await;
        assert!(dup.is_err(), "Duplicate receipt should be rejected");
    }
}
