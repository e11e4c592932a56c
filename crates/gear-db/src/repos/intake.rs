//! Website intake: contact-form leads, enrollment requests and lesson
//! requests, each raising a staff alert when a notification inbox is set.

use chrono::{DateTime, Utc};

use gear_core::entities::{EnrollmentRequest, Lead, LessonRequest};
use gear_core::enums::{AuditAction, EntityType, LessonRequestStatus, RequestStatus};
use gear_core::forms::{
    CONTACT_FORM_SOURCE, ContactForm, EnrollmentRequestForm, LessonRequestForm, non_blank,
    split_name,
};
use gear_core::ids::{PREFIX_ENROLLMENT_REQUEST, PREFIX_LESSON_REQUEST};

use crate::error::DatabaseError;
use crate::helpers::{
    collect_rows, date_param, get_opt_string, parse_datetime, parse_enum, parse_optional_date, ts,
};
use crate::repos::comms::NewScheduledMessage;
use crate::repos::lead::NewLead;
use crate::service::GearService;

/// Lead source for pricing-page "Apply now" submissions.
pub const ENROLLMENT_REQUEST_SOURCE: &str = "Website Enrollment Request";
/// Lead source for lesson request submissions.
pub const LESSON_REQUEST_SOURCE: &str = "Website Lesson Request";

const ENROLLMENT_REQUEST_COLS: &str = "id, name, email, phone, package, preferred_location, \
     preferred_schedule, notes, lead_id, status, created_at";

const LESSON_REQUEST_COLS: &str =
    "id, name, email, phone, preferred_date, preferred_time, notes, lead_id, status, created_at";

fn row_to_enrollment_request(row: &libsql::Row) -> Result<EnrollmentRequest, DatabaseError> {
    Ok(EnrollmentRequest {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: get_opt_string(row, 3)?,
        package: get_opt_string(row, 4)?,
        preferred_location: get_opt_string(row, 5)?,
        preferred_schedule: get_opt_string(row, 6)?,
        notes: get_opt_string(row, 7)?,
        lead_id: get_opt_string(row, 8)?,
        status: parse_enum(&row.get::<String>(9)?)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

fn row_to_lesson_request(row: &libsql::Row) -> Result<LessonRequest, DatabaseError> {
    Ok(LessonRequest {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: get_opt_string(row, 3)?,
        preferred_date: parse_optional_date(get_opt_string(row, 4)?.as_deref())?,
        preferred_time: get_opt_string(row, 5)?,
        notes: get_opt_string(row, 6)?,
        lead_id: get_opt_string(row, 7)?,
        status: parse_enum(&row.get::<String>(8)?)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

impl GearService {
    /// Queue an alert to the staff inbox, due immediately. No-op when no
    /// inbox is configured.
    async fn alert_staff(
        &self,
        subject: &str,
        body: String,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let Some(inbox) = self.settings().notification_email.clone() else {
            return Ok(());
        };
        self.schedule_message(NewScheduledMessage::email(inbox, subject, body, now))
            .await?;
        tracing::debug!(subject, "staff alert queued");
        Ok(())
    }

    /// Turn a contact-form submission into a lead.
    ///
    /// The message is kept both as the lead's notes and as its first note.
    pub async fn capture_website_lead(&self, form: ContactForm) -> Result<Lead, DatabaseError> {
        form.validate()?;
        let now = Utc::now();
        let (first_name, last_name) = split_name(&form.name);
        let message = non_blank(form.message.clone());

        let lead = self
            .create_lead(NewLead {
                first_name,
                last_name,
                email: Some(form.email.trim().to_string()),
                phone: non_blank(form.phone.clone()),
                source: Some(CONTACT_FORM_SOURCE.to_string()),
                interest: non_blank(form.subject.clone()),
                notes: message.clone(),
            })
            .await?;

        if let Some(ref message) = message {
            self.add_lead_note(&lead.id, message, None).await?;
        }
        self.alert_staff("New Website Lead", form.summary(), now)
            .await?;
        tracing::info!(lead = %lead.id, "website lead captured");
        Ok(lead)
    }

    /// Record a pricing-page "Apply now" request and its lead.
    ///
    /// Blank fields get defaults, so this never rejects a submission unless a
    /// supplied email is malformed.
    pub async fn submit_enrollment_request(
        &self,
        form: EnrollmentRequestForm,
    ) -> Result<EnrollmentRequest, DatabaseError> {
        form.validate()?;
        let now = Utc::now();
        let form = form.normalized(now);
        let name = form.name.clone().unwrap_or_default();
        let email = form.email.clone().unwrap_or_default();
        let (first_name, last_name) = split_name(&name);

        let lead = self
            .create_lead(NewLead {
                first_name,
                last_name,
                email: Some(email.clone()),
                phone: form.phone.clone(),
                source: Some(ENROLLMENT_REQUEST_SOURCE.to_string()),
                interest: form.package.clone(),
                notes: form.notes.clone(),
            })
            .await?;

        let id = self.db().generate_id(PREFIX_ENROLLMENT_REQUEST).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO enrollment_requests ({ENROLLMENT_REQUEST_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                ),
                libsql::params![
                    id.as_str(),
                    name.as_str(),
                    email.as_str(),
                    form.phone.as_deref(),
                    form.package.as_deref(),
                    form.preferred_location.as_deref(),
                    form.preferred_schedule.as_deref(),
                    form.notes.as_deref(),
                    lead.id.as_str(),
                    RequestStatus::New.as_str(),
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::EnrollmentRequest, &id, AuditAction::Created, None, now)
            .await?;

        let body = format!(
            "{name} requested {} {}",
            form.package.as_deref().unwrap_or_default(),
            form.preferred_location.as_deref().unwrap_or_default()
        );
        self.alert_staff("New Enrollment Request", body.trim_end().to_string(), now)
            .await?;
        tracing::info!(request = %id, lead = %lead.id, "enrollment request received");

        Ok(EnrollmentRequest {
            id,
            name,
            email,
            phone: form.phone,
            package: form.package,
            preferred_location: form.preferred_location,
            preferred_schedule: form.preferred_schedule,
            notes: form.notes,
            lead_id: Some(lead.id),
            status: RequestStatus::New,
            created_at: now,
        })
    }

    pub async fn submit_lesson_request(
        &self,
        form: LessonRequestForm,
    ) -> Result<LessonRequest, DatabaseError> {
        form.validate()?;
        let now = Utc::now();
        let name = form.name.trim().to_string();
        let email = form.email.trim().to_string();
        let phone = non_blank(form.phone);
        let preferred_time = non_blank(form.preferred_time);
        let notes = non_blank(form.notes);
        let (first_name, last_name) = split_name(&name);

        let lead = self
            .create_lead(NewLead {
                first_name,
                last_name,
                email: Some(email.clone()),
                phone: phone.clone(),
                source: Some(LESSON_REQUEST_SOURCE.to_string()),
                interest: None,
                notes: notes.clone(),
            })
            .await?;

        let id = self.db().generate_id(PREFIX_LESSON_REQUEST).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO lesson_requests ({LESSON_REQUEST_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    name.as_str(),
                    email.as_str(),
                    phone.as_deref(),
                    date_param(form.preferred_date),
                    preferred_time.as_deref(),
                    notes.as_deref(),
                    lead.id.as_str(),
                    LessonRequestStatus::New.as_str(),
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::LessonRequest, &id, AuditAction::Created, None, now)
            .await?;

        let body = format!(
            "{name} requested a lesson on {} {}",
            date_param(form.preferred_date).unwrap_or_default(),
            preferred_time.as_deref().unwrap_or_default()
        );
        self.alert_staff("New Lesson Request", body.trim_end().to_string(), now)
            .await?;
        tracing::info!(request = %id, lead = %lead.id, "lesson request received");

        Ok(LessonRequest {
            id,
            name,
            email,
            phone,
            preferred_date: form.preferred_date,
            preferred_time,
            notes,
            lead_id: Some(lead.id),
            status: LessonRequestStatus::New,
            created_at: now,
        })
    }

    pub async fn get_enrollment_request(
        &self,
        id: &str,
    ) -> Result<EnrollmentRequest, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {ENROLLMENT_REQUEST_COLS} FROM enrollment_requests WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_enrollment_request(&row)
    }

    /// Newest first, optionally one status.
    pub async fn list_enrollment_requests(
        &self,
        status: Option<RequestStatus>,
        limit: u32,
    ) -> Result<Vec<EnrollmentRequest>, DatabaseError> {
        let filter = if status.is_some() { "WHERE status = ?1" } else { "" };
        let params: Vec<libsql::Value> = status.map(|s| s.as_str().into()).into_iter().collect();
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {ENROLLMENT_REQUEST_COLS} FROM enrollment_requests {filter}
                     ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
                ),
                libsql::params_from_iter(params),
            )
            .await?;
        collect_rows(rows, row_to_enrollment_request).await
    }

    pub async fn set_enrollment_request_status(
        &self,
        id: &str,
        status: RequestStatus,
    ) -> Result<EnrollmentRequest, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE enrollment_requests SET status = ?1 WHERE id = ?2",
                libsql::params![status.as_str(), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.audit(
            EntityType::EnrollmentRequest,
            id,
            AuditAction::StatusChanged,
            Some(serde_json::json!({ "to": status.as_str() })),
            Utc::now(),
        )
        .await?;
        self.get_enrollment_request(id).await
    }

    pub async fn get_lesson_request(&self, id: &str) -> Result<LessonRequest, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {LESSON_REQUEST_COLS} FROM lesson_requests WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_lesson_request(&row)
    }

    pub async fn list_lesson_requests(
        &self,
        status: Option<LessonRequestStatus>,
        limit: u32,
    ) -> Result<Vec<LessonRequest>, DatabaseError> {
        let filter = if status.is_some() { "WHERE status = ?1" } else { "" };
        let params: Vec<libsql::Value> = status.map(|s| s.as_str().into()).into_iter().collect();
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {LESSON_REQUEST_COLS} FROM lesson_requests {filter}
                     ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
                ),
                libsql::params_from_iter(params),
            )
            .await?;
        collect_rows(rows, row_to_lesson_request).await
    }

    pub async fn set_lesson_request_status(
        &self,
        id: &str,
        status: LessonRequestStatus,
    ) -> Result<LessonRequest, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE lesson_requests SET status = ?1 WHERE id = ?2",
                libsql::params![status.as_str(), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.audit(
            EntityType::LessonRequest,
            id,
            AuditAction::StatusChanged,
            Some(serde_json::json!({ "to": status.as_str() })),
            Utc::now(),
        )
        .await?;
        self.get_lesson_request(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceSettings;
    use crate::test_support::helpers::test_service;
    use chrono::NaiveDate;
    use gear_core::enums::{Channel, ScheduleStatus};
    use pretty_assertions::assert_eq;

    async fn service_with_inbox() -> GearService {
        test_service().await.with_settings(ServiceSettings {
            notification_email: Some("office@example.com".into()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn contact_form_creates_lead_note_and_alert() {
        let svc = service_with_inbox().await;
        let lead = svc
            .capture_website_lead(ContactForm {
                name: "Jo Van Driver".into(),
                email: "jo@example.com".into(),
                phone: Some("555-0101".into()),
                subject: Some("G2 lessons".into()),
                message: Some("Weekends please".into()),
            })
            .await
            .unwrap();
        assert_eq!(lead.first_name, "Jo");
        assert_eq!(lead.last_name, "Van Driver");
        assert_eq!(lead.source.as_deref(), Some(CONTACT_FORM_SOURCE));
        assert_eq!(lead.interest.as_deref(), Some("G2 lessons"));
        assert_eq!(svc.list_lead_notes(&lead.id).await.unwrap().len(), 1);

        let alerts = svc
            .list_scheduled_messages(Some(ScheduleStatus::Scheduled), 10)
            .await
            .unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].channel, Channel::Email);
        assert_eq!(alerts[0].subject.as_deref(), Some("New Website Lead"));
        assert_eq!(alerts[0].recipient_email.as_deref(), Some("office@example.com"));
        assert!(alerts[0].body.contains("Name: Jo Van Driver"));
    }

    #[tokio::test]
    async fn no_inbox_means_no_alert() {
        let svc = test_service().await;
        svc.capture_website_lead(ContactForm {
            name: "Jo".into(),
            email: "jo@example.com".into(),
            ..Default::default()
        })
        .await
        .unwrap();
        assert!(svc.list_scheduled_messages(None, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_contact_form_is_rejected() {
        let svc = test_service().await;
        let err = svc
            .capture_website_lead(ContactForm {
                name: "Jo".into(),
                email: "not-an-email".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn blank_enrollment_request_gets_defaults_and_lead() {
        let svc = service_with_inbox().await;
        let request = svc
            .submit_enrollment_request(EnrollmentRequestForm {
                package: Some("Premium".into()),
                preferred_location: Some("Downtown".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(request.name, "Website Visitor");
        assert!(request.email.starts_with("visitor+"));
        assert_eq!(request.notes.as_deref(), Some("Auto-captured from pricing Apply Now."));

        let lead = svc.get_lead(request.lead_id.as_deref().unwrap()).await.unwrap();
        assert_eq!(lead.first_name, "Website");
        assert_eq!(lead.interest.as_deref(), Some("Premium"));

        let alert = &svc.list_scheduled_messages(None, 10).await.unwrap()[0];
        assert_eq!(alert.subject.as_deref(), Some("New Enrollment Request"));
        assert_eq!(alert.body, "Website Visitor requested Premium Downtown");

        let pending = svc
            .list_enrollment_requests(Some(RequestStatus::New), 10)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, request.id);
        let contacted = svc
            .set_enrollment_request_status(&request.id, RequestStatus::Contacted)
            .await
            .unwrap();
        assert_eq!(contacted.status, RequestStatus::Contacted);
    }

    #[tokio::test]
    async fn lesson_request_alert_mentions_date() {
        let svc = service_with_inbox().await;
        let request = svc
            .submit_lesson_request(LessonRequestForm {
                name: "Sam Lee".into(),
                email: "sam@example.com".into(),
                preferred_date: NaiveDate::from_ymd_opt(2026, 5, 2),
                preferred_time: Some("afternoon".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(request.status, LessonRequestStatus::New);
        assert!(request.lead_id.is_some());

        let alert = &svc.list_scheduled_messages(None, 10).await.unwrap()[0];
        assert_eq!(alert.subject.as_deref(), Some("New Lesson Request"));
        assert_eq!(alert.body, "Sam Lee requested a lesson on 2026-05-02 afternoon");

        let stored = svc.get_lesson_request(&request.id).await.unwrap();
        assert_eq!(stored.preferred_date, request.preferred_date);
        assert_eq!(stored.lead_id, request.lead_id);
        let missing = svc
            .submit_lesson_request(LessonRequestForm {
                name: " ".into(),
                email: "sam@example.com".into(),
                ..Default::default()
            })
            .await;
        assert!(matches!(missing, Err(DatabaseError::Validation(_))));
    }
}
