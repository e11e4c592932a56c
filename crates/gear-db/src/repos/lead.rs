//! Lead repository: CRUD, status changes, notes and follow-up tasks.

use chrono::{DateTime, Utc};

use gear_core::audit_detail::StatusChangedDetail;
use gear_core::entities::{Lead, LeadNote, LeadTask};
use gear_core::enums::{AuditAction, EntityType, LeadStatus, LeadTaskStatus};
use gear_core::ids::{PREFIX_LEAD, PREFIX_LEAD_NOTE, PREFIX_LEAD_TASK};

use crate::error::DatabaseError;
use crate::helpers::{
    collect_rows, datetime_param, get_opt_string, parse_datetime, parse_enum,
    parse_optional_datetime, ts,
};
use crate::service::GearService;
use crate::updates::SetClauses;
use crate::updates::lead::LeadUpdate;

const SELECT_COLS: &str =
    "id, first_name, last_name, email, phone, source, interest, status, notes, created_at, updated_at";

const NOTE_COLS: &str = "id, lead_id, body, author, created_at";

const TASK_COLS: &str =
    "id, lead_id, title, due_at, assigned_to, status, created_at, updated_at";

/// Fields for a new lead. Status always starts at `new`.
#[derive(Debug, Clone, Default)]
pub struct NewLead {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub interest: Option<String>,
    pub notes: Option<String>,
}

fn row_to_lead(row: &libsql::Row) -> Result<Lead, DatabaseError> {
    Ok(Lead {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: get_opt_string(row, 3)?,
        phone: get_opt_string(row, 4)?,
        source: get_opt_string(row, 5)?,
        interest: get_opt_string(row, 6)?,
        status: parse_enum(&row.get::<String>(7)?)?,
        notes: get_opt_string(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

fn row_to_note(row: &libsql::Row) -> Result<LeadNote, DatabaseError> {
    Ok(LeadNote {
        id: row.get(0)?,
        lead_id: row.get(1)?,
        body: row.get(2)?,
        author: get_opt_string(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

fn row_to_task(row: &libsql::Row) -> Result<LeadTask, DatabaseError> {
    Ok(LeadTask {
        id: row.get(0)?,
        lead_id: row.get(1)?,
        title: row.get(2)?,
        due_at: parse_optional_datetime(get_opt_string(row, 3)?.as_deref())?,
        assigned_to: get_opt_string(row, 4)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl GearService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` when the first name is blank.
    pub async fn create_lead(&self, new: NewLead) -> Result<Lead, DatabaseError> {
        if new.first_name.trim().is_empty() {
            return Err(DatabaseError::Validation("first name is required".into()));
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_LEAD).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO leads ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                ),
                libsql::params![
                    id.as_str(),
                    new.first_name.as_str(),
                    new.last_name.as_str(),
                    new.email.as_deref(),
                    new.phone.as_deref(),
                    new.source.as_deref(),
                    new.interest.as_deref(),
                    LeadStatus::New.as_str(),
                    new.notes.as_deref(),
                    ts(now),
                    ts(now)
                ],
            )
            .await?;

        self.audit(EntityType::Lead, &id, AuditAction::Created, None, now)
            .await?;

        Ok(Lead {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            source: new.source,
            interest: new.interest,
            status: LeadStatus::New,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_lead(&self, id: &str) -> Result<Lead, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM leads WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_lead(&row)
    }

    /// Newest leads first, optionally only those in one status.
    pub async fn list_leads(
        &self,
        status: Option<LeadStatus>,
        limit: u32,
    ) -> Result<Vec<Lead>, DatabaseError> {
        let rows = match status {
            Some(status) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {SELECT_COLS} FROM leads WHERE status = ?1
                             ORDER BY created_at DESC LIMIT {limit}"
                        ),
                        [status.as_str()],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {SELECT_COLS} FROM leads ORDER BY created_at DESC LIMIT {limit}"
                        ),
                        (),
                    )
                    .await?
            }
        };
        collect_rows(rows, row_to_lead).await
    }

    /// Case-insensitive substring match on name, email and phone.
    pub async fn search_leads(&self, query: &str, limit: u32) -> Result<Vec<Lead>, DatabaseError> {
        let pattern = format!("%{}%", query.trim().to_lowercase());
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM leads
                     WHERE lower(first_name || ' ' || last_name) LIKE ?1
                        OR lower(coalesce(email, '')) LIKE ?1
                        OR coalesce(phone, '') LIKE ?1
                     ORDER BY created_at DESC LIMIT {limit}"
                ),
                [pattern.as_str()],
            )
            .await?;
        collect_rows(rows, row_to_lead).await
    }

    pub async fn update_lead(&self, lead_id: &str, update: LeadUpdate) -> Result<Lead, DatabaseError> {
        let mut sets = SetClauses::default();
        if let Some(ref first_name) = update.first_name {
            sets.push("first_name", first_name.as_str());
        }
        if let Some(ref last_name) = update.last_name {
            sets.push("last_name", last_name.as_str());
        }
        if let Some(ref email) = update.email {
            sets.push_opt("email", email.as_deref());
        }
        if let Some(ref phone) = update.phone {
            sets.push_opt("phone", phone.as_deref());
        }
        if let Some(ref source) = update.source {
            sets.push_opt("source", source.as_deref());
        }
        if let Some(ref interest) = update.interest {
            sets.push_opt("interest", interest.as_deref());
        }
        if let Some(ref notes) = update.notes {
            sets.push_opt("notes", notes.as_deref());
        }

        if sets.is_empty() {
            return self.get_lead(lead_id).await;
        }

        let now = Utc::now();
        sets.push("updated_at", ts(now));
        let (sql, params) = sets.into_update("leads", lead_id);
        let changed = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }

        let updated = self.get_lead(lead_id).await?;
        self.audit(
            EntityType::Lead,
            lead_id,
            AuditAction::Updated,
            Some(serde_json::to_value(&update)?),
            now,
        )
        .await?;
        Ok(updated)
    }

    /// Move a lead to any pipeline stage.
    pub async fn set_lead_status(
        &self,
        lead_id: &str,
        status: LeadStatus,
    ) -> Result<Lead, DatabaseError> {
        let current = self.get_lead(lead_id).await?;
        if current.status == status {
            return Ok(current);
        }

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE leads SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![status.as_str(), ts(now), lead_id],
            )
            .await?;

        let detail = StatusChangedDetail {
            from: current.status.as_str().to_string(),
            to: status.as_str().to_string(),
            reason: None,
        };
        self.audit(
            EntityType::Lead,
            lead_id,
            AuditAction::StatusChanged,
            Some(serde_json::to_value(&detail)?),
            now,
        )
        .await?;

        Ok(Lead {
            status,
            updated_at: now,
            ..current
        })
    }

    pub async fn delete_lead(&self, lead_id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute("DELETE FROM leads WHERE id = ?1", [lead_id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.audit(EntityType::Lead, lead_id, AuditAction::Deleted, None, Utc::now())
            .await
    }

    // -----------------------------------------------------------------------
    // Notes
    // -----------------------------------------------------------------------

    pub async fn add_lead_note(
        &self,
        lead_id: &str,
        body: &str,
        author: Option<&str>,
    ) -> Result<LeadNote, DatabaseError> {
        if body.trim().is_empty() {
            return Err(DatabaseError::Validation("note body is required".into()));
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_LEAD_NOTE).await?;
        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO lead_notes ({NOTE_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![id.as_str(), lead_id, body, author, ts(now)],
            )
            .await?;
        self.audit(EntityType::LeadNote, &id, AuditAction::Created, None, now)
            .await?;
        Ok(LeadNote {
            id,
            lead_id: lead_id.to_string(),
            body: body.to_string(),
            author: author.map(String::from),
            created_at: now,
        })
    }

    pub async fn list_lead_notes(&self, lead_id: &str) -> Result<Vec<LeadNote>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {NOTE_COLS} FROM lead_notes WHERE lead_id = ?1 ORDER BY created_at DESC"
                ),
                [lead_id],
            )
            .await?;
        collect_rows(rows, row_to_note).await
    }

    // -----------------------------------------------------------------------
    // Follow-up tasks
    // -----------------------------------------------------------------------

    pub async fn create_lead_task(
        &self,
        lead_id: &str,
        title: &str,
        due_at: Option<DateTime<Utc>>,
        assigned_to: Option<&str>,
    ) -> Result<LeadTask, DatabaseError> {
        if title.trim().is_empty() {
            return Err(DatabaseError::Validation("task title is required".into()));
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_LEAD_TASK).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO lead_tasks ({TASK_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                libsql::params![
                    id.as_str(),
                    lead_id,
                    title,
                    datetime_param(due_at),
                    assigned_to,
                    LeadTaskStatus::Pending.as_str(),
                    ts(now),
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::LeadTask, &id, AuditAction::Created, None, now)
            .await?;
        Ok(LeadTask {
            id,
            lead_id: lead_id.to_string(),
            title: title.to_string(),
            due_at,
            assigned_to: assigned_to.map(String::from),
            status: LeadTaskStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_lead_task(&self, id: &str) -> Result<LeadTask, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {TASK_COLS} FROM lead_tasks WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_task(&row)
    }

    pub async fn set_lead_task_status(
        &self,
        task_id: &str,
        status: LeadTaskStatus,
    ) -> Result<LeadTask, DatabaseError> {
        let current = self.get_lead_task(task_id).await?;
        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE lead_tasks SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![status.as_str(), ts(now), task_id],
            )
            .await?;
        let detail = StatusChangedDetail {
            from: current.status.as_str().to_string(),
            to: status.as_str().to_string(),
            reason: None,
        };
        self.audit(
            EntityType::LeadTask,
            task_id,
            AuditAction::StatusChanged,
            Some(serde_json::to_value(&detail)?),
            now,
        )
        .await?;
        Ok(LeadTask {
            status,
            updated_at: now,
            ..current
        })
    }

    /// Open tasks first, then by due time.
    pub async fn list_lead_tasks(&self, lead_id: &str) -> Result<Vec<LeadTask>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {TASK_COLS} FROM lead_tasks WHERE lead_id = ?1
                     ORDER BY status = 'completed', due_at IS NULL, due_at, created_at"
                ),
                [lead_id],
            )
            .await?;
        collect_rows(rows, row_to_task).await
    }
}
