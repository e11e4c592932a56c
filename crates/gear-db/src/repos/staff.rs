//! Back-office staff accounts.

use chrono::Utc;

use gear_core::entities::StaffUser;
use gear_core::enums::{AuditAction, EntityType, StaffRole};
use gear_core::ids::PREFIX_STAFF_USER;

use crate::error::{DatabaseError, map_unique};
use crate::helpers::{collect_rows, get_bool, get_opt_string, parse_datetime, parse_enum, ts};
use crate::service::GearService;

const STAFF_COLS: &str = "id, username, full_name, email, role, is_staff, active, created_at";

#[derive(Debug, Clone)]
pub struct NewStaffUser {
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: StaffRole,
    pub is_staff: bool,
}

impl NewStaffUser {
    /// A staff-audience user with the default role.
    #[must_use]
    pub fn staff(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            full_name: None,
            email: None,
            role: StaffRole::Staff,
            is_staff: true,
        }
    }
}

fn row_to_staff(row: &libsql::Row) -> Result<StaffUser, DatabaseError> {
    Ok(StaffUser {
        id: row.get(0)?,
        username: row.get(1)?,
        full_name: get_opt_string(row, 2)?,
        email: get_opt_string(row, 3)?,
        role: parse_enum(&row.get::<String>(4)?)?,
        is_staff: get_bool(row, 5)?,
        active: get_bool(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl GearService {
    pub async fn create_staff_user(&self, new: NewStaffUser) -> Result<StaffUser, DatabaseError> {
        let username = new.username.trim().to_string();
        if username.is_empty() {
            return Err(DatabaseError::Validation("username is required".into()));
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_STAFF_USER).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO staff_users ({STAFF_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)"
                ),
                libsql::params![
                    id.as_str(),
                    username.as_str(),
                    new.full_name.as_deref(),
                    new.email.as_deref(),
                    new.role.as_str(),
                    i64::from(new.is_staff),
                    ts(now)
                ],
            )
            .await
            .map_err(|e| map_unique(e, "username", &username))?;
        self.audit(EntityType::StaffUser, &id, AuditAction::Created, None, now)
            .await?;

        Ok(StaffUser {
            id,
            username,
            full_name: new.full_name,
            email: new.email,
            role: new.role,
            is_staff: new.is_staff,
            active: true,
            created_at: now,
        })
    }

    pub async fn get_staff_user(&self, id: &str) -> Result<StaffUser, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {STAFF_COLS} FROM staff_users WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_staff(&row)
    }

    pub async fn list_staff_users(&self) -> Result<Vec<StaffUser>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {STAFF_COLS} FROM staff_users ORDER BY username"),
                (),
            )
            .await?;
        collect_rows(rows, row_to_staff).await
    }

    /// Ids of every active staff-audience user.
    pub(crate) async fn active_staff_ids(&self) -> Result<Vec<String>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id FROM staff_users WHERE active = 1 AND is_staff = 1 ORDER BY id",
                (),
            )
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        Ok(ids)
    }

    /// Enable or disable a login. Receipts are not touched until the next sync.
    pub async fn set_staff_active(&self, id: &str, active: bool) -> Result<StaffUser, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE staff_users SET active = ?1 WHERE id = ?2",
                libsql::params![i64::from(active), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.audit(
            EntityType::StaffUser,
            id,
            AuditAction::Updated,
            Some(serde_json::json!({ "active": active })),
            Utc::now(),
        )
        .await?;
        self.get_staff_user(id).await
    }

    /// The user, if they may use the per-user notification API.
    ///
    /// Unknown, inactive and non-staff users are all `Forbidden`.
    pub async fn require_active_staff(&self, user_id: &str) -> Result<StaffUser, DatabaseError> {
        match self.get_staff_user(user_id).await {
            Ok(user) if user.is_active_staff() => Ok(user),
            Ok(_) | Err(DatabaseError::NoResult) => Err(DatabaseError::Forbidden(format!(
                "user {user_id} is not active staff"
            ))),
            Err(e) => Err(e),
        }
    }
}
