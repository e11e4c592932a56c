//! Student repository: registration, lookup, search, updates, lead conversion
//! and uploaded documents.

use chrono::{NaiveDate, Utc};

use gear_core::entities::{Student, StudentDocument};
use gear_core::enums::{AuditAction, DocumentType, EntityType, LeadStatus};
use gear_core::forms::looks_like_email;
use gear_core::ids::{PREFIX_STUDENT, PREFIX_STUDENT_DOCUMENT};

use crate::error::DatabaseError;
use crate::helpers::{
    collect_rows, date_param, get_bool, get_opt_string, parse_datetime, parse_enum,
    parse_optional_date, ts,
};
use crate::service::GearService;
use crate::updates::SetClauses;
use crate::updates::student::StudentUpdate;

pub(crate) const STUDENT_COLS: &str = "id, first_name, last_name, email, phone, address, \
     date_of_birth, license_number, license_issued_on, preferred_location, lead_id, \
     created_at, updated_at";

const DOCUMENT_COLS: &str = "id, student_id, document_type, file_path, verified, uploaded_at";

#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub license_number: Option<String>,
    pub license_issued_on: Option<NaiveDate>,
    pub preferred_location: Option<String>,
    pub lead_id: Option<String>,
}

pub(crate) fn row_to_student(row: &libsql::Row) -> Result<Student, DatabaseError> {
    Ok(Student {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: get_opt_string(row, 3)?,
        phone: get_opt_string(row, 4)?,
        address: get_opt_string(row, 5)?,
        date_of_birth: parse_optional_date(get_opt_string(row, 6)?.as_deref())?,
        license_number: get_opt_string(row, 7)?,
        license_issued_on: parse_optional_date(get_opt_string(row, 8)?.as_deref())?,
        preferred_location: get_opt_string(row, 9)?,
        lead_id: get_opt_string(row, 10)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

fn row_to_document(row: &libsql::Row) -> Result<StudentDocument, DatabaseError> {
    Ok(StudentDocument {
        id: row.get(0)?,
        student_id: row.get(1)?,
        document_type: parse_enum(&row.get::<String>(2)?)?,
        file_path: row.get(3)?,
        verified: get_bool(row, 4)?,
        uploaded_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl GearService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` when the first name is blank or the
    /// email is malformed.
    pub async fn create_student(&self, new: NewStudent) -> Result<Student, DatabaseError> {
        if new.first_name.trim().is_empty() {
            return Err(DatabaseError::Validation("first name is required".into()));
        }
        if let Some(ref email) = new.email
            && !looks_like_email(email)
        {
            return Err(DatabaseError::Validation(format!(
                "'{email}' is not a valid email address"
            )));
        }

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_STUDENT).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO students ({STUDENT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
                ),
                libsql::params![
                    id.as_str(),
                    new.first_name.as_str(),
                    new.last_name.as_str(),
                    new.email.as_deref(),
                    new.phone.as_deref(),
                    new.address.as_deref(),
                    date_param(new.date_of_birth),
                    new.license_number.as_deref(),
                    date_param(new.license_issued_on),
                    new.preferred_location.as_deref(),
                    new.lead_id.as_deref(),
                    ts(now),
                    ts(now)
                ],
            )
            .await?;

        self.audit(EntityType::Student, &id, AuditAction::Created, None, now)
            .await?;

        Ok(Student {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            date_of_birth: new.date_of_birth,
            license_number: new.license_number,
            license_issued_on: new.license_issued_on,
            preferred_location: new.preferred_location,
            lead_id: new.lead_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Self-registration: the local part of the address becomes the first name.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Duplicate` when a student already uses the address.
    pub async fn register_student(&self, email: &str) -> Result<Student, DatabaseError> {
        let email = email.trim().to_lowercase();
        if !looks_like_email(&email) {
            return Err(DatabaseError::Validation(format!(
                "'{email}' is not a valid email address"
            )));
        }
        if self.find_student_by_email(&email).await?.is_some() {
            return Err(DatabaseError::Duplicate {
                field: "email".into(),
                value: email,
            });
        }
        let first_name = email.split('@').next().unwrap_or_default().to_string();
        self.create_student(NewStudent {
            first_name,
            email: Some(email),
            ..Default::default()
        })
        .await
    }

    /// Create a student from a lead and mark the lead converted.
    pub async fn convert_lead(&self, lead_id: &str) -> Result<Student, DatabaseError> {
        let lead = self.get_lead(lead_id).await?;
        let student = self
            .create_student(NewStudent {
                first_name: lead.first_name,
                last_name: lead.last_name,
                email: lead.email,
                phone: lead.phone,
                lead_id: Some(lead.id),
                ..Default::default()
            })
            .await?;
        self.set_lead_status(lead_id, LeadStatus::Converted).await?;
        Ok(student)
    }

    pub async fn get_student(&self, id: &str) -> Result<Student, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {STUDENT_COLS} FROM students WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_student(&row)
    }

    pub async fn find_student_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Student>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {STUDENT_COLS} FROM students WHERE lower(email) = lower(?1) LIMIT 1"
                ),
                [email.trim()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_student(&row)?)),
            None => Ok(None),
        }
    }

    /// Students ordered by last name, then first name.
    pub async fn list_students(&self, limit: u32) -> Result<Vec<Student>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {STUDENT_COLS} FROM students
                     ORDER BY lower(last_name), lower(first_name) LIMIT {limit}"
                ),
                (),
            )
            .await?;
        collect_rows(rows, row_to_student).await
    }

    /// Case-insensitive substring match on name, email and phone.
    pub async fn search_students(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Student>, DatabaseError> {
        let pattern = format!("%{}%", query.trim().to_lowercase());
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {STUDENT_COLS} FROM students
                     WHERE lower(first_name || ' ' || last_name) LIKE ?1
                        OR lower(coalesce(email, '')) LIKE ?1
                        OR coalesce(phone, '') LIKE ?1
                     ORDER BY lower(last_name), lower(first_name) LIMIT {limit}"
                ),
                [pattern.as_str()],
            )
            .await?;
        collect_rows(rows, row_to_student).await
    }

    pub async fn update_student(
        &self,
        student_id: &str,
        update: StudentUpdate,
    ) -> Result<Student, DatabaseError> {
        let mut sets = SetClauses::default();
        if let Some(ref first_name) = update.first_name {
            if first_name.trim().is_empty() {
                return Err(DatabaseError::Validation("first name is required".into()));
            }
            sets.push("first_name", first_name.as_str());
        }
        if let Some(ref last_name) = update.last_name {
            sets.push("last_name", last_name.as_str());
        }
        if let Some(ref email) = update.email {
            if let Some(email) = email
                && !looks_like_email(email)
            {
                return Err(DatabaseError::Validation(format!(
                    "'{email}' is not a valid email address"
                )));
            }
            sets.push_opt("email", email.as_deref());
        }
        if let Some(ref phone) = update.phone {
            sets.push_opt("phone", phone.as_deref());
        }
        if let Some(ref address) = update.address {
            sets.push_opt("address", address.as_deref());
        }
        if let Some(date_of_birth) = update.date_of_birth {
            sets.push_opt("date_of_birth", date_param(date_of_birth).as_deref());
        }
        if let Some(ref license_number) = update.license_number {
            sets.push_opt("license_number", license_number.as_deref());
        }
        if let Some(license_issued_on) = update.license_issued_on {
            sets.push_opt("license_issued_on", date_param(license_issued_on).as_deref());
        }
        if let Some(ref preferred_location) = update.preferred_location {
            sets.push_opt("preferred_location", preferred_location.as_deref());
        }

        if sets.is_empty() {
            return self.get_student(student_id).await;
        }

        let now = Utc::now();
        sets.push("updated_at", ts(now));
        let (sql, params) = sets.into_update("students", student_id);
        let changed = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }

        let updated = self.get_student(student_id).await?;
        self.audit(
            EntityType::Student,
            student_id,
            AuditAction::Updated,
            Some(serde_json::to_value(&update)?),
            now,
        )
        .await?;
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    /// Register an uploaded document. `file_path` is stored as given.
    pub async fn add_student_document(
        &self,
        student_id: &str,
        document_type: DocumentType,
        file_path: &str,
    ) -> Result<StudentDocument, DatabaseError> {
        self.get_student(student_id).await?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_STUDENT_DOCUMENT).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO student_documents ({DOCUMENT_COLS}) VALUES (?1, ?2, ?3, ?4, 0, ?5)"
                ),
                libsql::params![
                    id.as_str(),
                    student_id,
                    document_type.as_str(),
                    file_path,
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::StudentDocument, &id, AuditAction::Created, None, now)
            .await?;
        Ok(StudentDocument {
            id,
            student_id: student_id.to_string(),
            document_type,
            file_path: file_path.to_string(),
            verified: false,
            uploaded_at: now,
        })
    }

    pub async fn verify_student_document(
        &self,
        document_id: &str,
    ) -> Result<StudentDocument, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE student_documents SET verified = 1 WHERE id = ?1",
                [document_id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.audit(
            EntityType::StudentDocument,
            document_id,
            AuditAction::Updated,
            Some(serde_json::json!({ "verified": true })),
            Utc::now(),
        )
        .await?;

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {DOCUMENT_COLS} FROM student_documents WHERE id = ?1"),
                [document_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_document(&row)
    }

    pub async fn list_student_documents(
        &self,
        student_id: &str,
    ) -> Result<Vec<StudentDocument>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {DOCUMENT_COLS} FROM student_documents
                     WHERE student_id = ?1 ORDER BY uploaded_at DESC"
                ),
                [student_id],
            )
            .await?;
        collect_rows(rows, row_to_document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::lead::NewLead;
    use crate::test_support::helpers::{make_student, test_service};
    use crate::updates::student::StudentUpdateBuilder;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_and_get() {
        let svc = test_service().await;
        let student = make_student(&svc, "Ana").await;
        assert!(student.id.starts_with("stu-"));
        assert_eq!(svc.get_student(&student.id).await.unwrap(), student);
        assert_eq!(student.full_name(), "Ana Tester");
    }

    #[tokio::test]
    async fn malformed_email_rejected() {
        let svc = test_service().await;
        let err = svc
            .create_student(NewStudent {
                first_name: "Ana".into(),
                email: Some("ana-at-example".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn register_uses_local_part() {
        let svc = test_service().await;
        let student = svc.register_student(" Jo.Driver@Example.com ").await.unwrap();
        assert_eq!(student.first_name, "jo.driver");
        assert_eq!(student.email.as_deref(), Some("jo.driver@example.com"));

        let err = svc.register_student("jo.driver@example.com").await.unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn search_matches_name_email_phone() {
        let svc = test_service().await;
        make_student(&svc, "Ana").await;
        make_student(&svc, "Ben").await;
        assert_eq!(svc.search_students("ana", 10).await.unwrap().len(), 1);
        assert_eq!(svc.search_students("BEN@", 10).await.unwrap().len(), 1);
        assert_eq!(svc.search_students("5550100", 10).await.unwrap().len(), 2);
        assert!(svc.search_students("zed", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let svc = test_service().await;
        let student = make_student(&svc, "Ana").await;
        let updated = svc
            .update_student(
                &student.id,
                StudentUpdateBuilder::new()
                    .phone(None)
                    .license_number(Some("G1-1234".into()))
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(updated.phone, None);
        assert_eq!(updated.license_number.as_deref(), Some("G1-1234"));
        assert_eq!(updated.email, student.email);
    }

    #[tokio::test]
    async fn convert_lead_links_and_marks_converted() {
        let svc = test_service().await;
        let lead = svc
            .create_lead(NewLead {
                first_name: "Lee".into(),
                last_name: "Park".into(),
                email: Some("lee@example.com".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let student = svc.convert_lead(&lead.id).await.unwrap();
        assert_eq!(student.lead_id.as_deref(), Some(lead.id.as_str()));
        assert_eq!(
            svc.get_lead(&lead.id).await.unwrap().status,
            LeadStatus::Converted
        );
    }

    #[tokio::test]
    async fn documents_start_unverified() {
        let svc = test_service().await;
        let student = make_student(&svc, "Ana").await;
        let doc = svc
            .add_student_document(&student.id, DocumentType::License, "uploads/ana-g1.pdf")
            .await
            .unwrap();
        assert!(!doc.verified);
        let verified = svc.verify_student_document(&doc.id).await.unwrap();
        assert!(verified.verified);
        assert_eq!(svc.list_student_documents(&student.id).await.unwrap().len(), 1);
        assert!(matches!(
            svc.verify_student_document("sdc-missing").await,
            Err(DatabaseError::NoResult)
        ));
    }
}
