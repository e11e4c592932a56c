//! Communications store: templates, the queued-communication log, scheduled
//! messages and lesson reminder generation.
//!
//! Delivery itself happens in `gear-comms`; this module only reads and
//! records state.

use chrono::{DateTime, Duration, Utc};

use gear_core::audit_detail::{DeliveryFailedDetail, StatusChangedDetail};
use gear_core::entities::{CommunicationLog, CommunicationTemplate, ScheduledMessage};
use gear_core::enums::{
    AuditAction, Channel, DeliveryStatus, EntityType, LessonStatus, ReminderType, ScheduleStatus,
};
use gear_core::ids::{
    PREFIX_COMMUNICATION_LOG, PREFIX_REMINDER_LOG, PREFIX_SCHEDULED_MESSAGE, PREFIX_TEMPLATE,
};

use crate::error::DatabaseError;
use crate::helpers::{
    collect_rows, datetime_param, get_opt_string, get_u32, parse_datetime, parse_enum,
    parse_optional_datetime, ts,
};
use crate::repos::lesson::{LESSON_COLS, row_to_lesson};
use crate::service::GearService;

const TEMPLATE_COLS: &str = "id, name, channel, subject, body, created_at, updated_at";

const LOG_COLS: &str = "id, channel, template_id, lead_id, student_id, recipient_email, \
     recipient_phone, status, error_message, sent_at, created_at";

const MESSAGE_COLS: &str = "id, channel, template_id, lead_id, student_id, recipient_email, \
     recipient_phone, subject, body, scheduled_for, status, attempts, last_error, sent_at, \
     created_at";

/// Timestamp layout used in reminder text, e.g. `2026-04-01 15:00:00+00:00`.
const REMINDER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub name: String,
    pub channel: Channel,
    pub subject: Option<String>,
    pub body: String,
}

/// A one-off communication to queue for the dispatcher.
#[derive(Debug, Clone)]
pub struct NewCommunication {
    pub channel: Channel,
    pub template_id: Option<String>,
    pub lead_id: Option<String>,
    pub student_id: Option<String>,
    pub recipient_email: Option<String>,
    pub recipient_phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewScheduledMessage {
    pub channel: Channel,
    pub template_id: Option<String>,
    pub lead_id: Option<String>,
    pub student_id: Option<String>,
    pub recipient_email: Option<String>,
    pub recipient_phone: Option<String>,
    pub subject: Option<String>,
    pub body: String,
    pub scheduled_for: DateTime<Utc>,
}

impl NewScheduledMessage {
    /// An email to a fixed address.
    #[must_use]
    pub fn email(
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        scheduled_for: DateTime<Utc>,
    ) -> Self {
        Self {
            channel: Channel::Email,
            template_id: None,
            lead_id: None,
            student_id: None,
            recipient_email: Some(to.into()),
            recipient_phone: None,
            subject: Some(subject.into()),
            body: body.into(),
            scheduled_for,
        }
    }

    /// An SMS to a fixed number.
    #[must_use]
    pub fn sms(to: impl Into<String>, body: impl Into<String>, scheduled_for: DateTime<Utc>) -> Self {
        Self {
            channel: Channel::Sms,
            template_id: None,
            lead_id: None,
            student_id: None,
            recipient_email: None,
            recipient_phone: Some(to.into()),
            subject: None,
            body: body.into(),
            scheduled_for,
        }
    }
}

fn row_to_template(row: &libsql::Row) -> Result<CommunicationTemplate, DatabaseError> {
    Ok(CommunicationTemplate {
        id: row.get(0)?,
        name: row.get(1)?,
        channel: parse_enum(&row.get::<String>(2)?)?,
        subject: get_opt_string(row, 3)?,
        body: row.get(4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

fn row_to_log(row: &libsql::Row) -> Result<CommunicationLog, DatabaseError> {
    Ok(CommunicationLog {
        id: row.get(0)?,
        channel: parse_enum(&row.get::<String>(1)?)?,
        template_id: get_opt_string(row, 2)?,
        lead_id: get_opt_string(row, 3)?,
        student_id: get_opt_string(row, 4)?,
        recipient_email: get_opt_string(row, 5)?,
        recipient_phone: get_opt_string(row, 6)?,
        status: parse_enum(&row.get::<String>(7)?)?,
        error_message: get_opt_string(row, 8)?,
        sent_at: parse_optional_datetime(get_opt_string(row, 9)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

fn row_to_message(row: &libsql::Row) -> Result<ScheduledMessage, DatabaseError> {
    Ok(ScheduledMessage {
        id: row.get(0)?,
        channel: parse_enum(&row.get::<String>(1)?)?,
        template_id: get_opt_string(row, 2)?,
        lead_id: get_opt_string(row, 3)?,
        student_id: get_opt_string(row, 4)?,
        recipient_email: get_opt_string(row, 5)?,
        recipient_phone: get_opt_string(row, 6)?,
        subject: get_opt_string(row, 7)?,
        body: row.get(8)?,
        scheduled_for: parse_datetime(&row.get::<String>(9)?)?,
        status: parse_enum(&row.get::<String>(10)?)?,
        attempts: get_u32(row, 11)?,
        last_error: get_opt_string(row, 12)?,
        sent_at: parse_optional_datetime(get_opt_string(row, 13)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(14)?)?,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl GearService {
    // -----------------------------------------------------------------------
    // Templates
    // -----------------------------------------------------------------------

    pub async fn create_template(
        &self,
        new: NewTemplate,
    ) -> Result<CommunicationTemplate, DatabaseError> {
        if new.name.trim().is_empty() {
            return Err(DatabaseError::Validation("template name is required".into()));
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_TEMPLATE).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO communication_templates ({TEMPLATE_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ),
                libsql::params![
                    id.as_str(),
                    new.name.as_str(),
                    new.channel.as_str(),
                    new.subject.as_deref(),
                    new.body.as_str(),
                    ts(now),
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::Template, &id, AuditAction::Created, None, now)
            .await?;
        Ok(CommunicationTemplate {
            id,
            name: new.name,
            channel: new.channel,
            subject: new.subject,
            body: new.body,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_template(&self, id: &str) -> Result<CommunicationTemplate, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {TEMPLATE_COLS} FROM communication_templates WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_template(&row)
    }

    pub async fn list_templates(
        &self,
        channel: Option<Channel>,
    ) -> Result<Vec<CommunicationTemplate>, DatabaseError> {
        let rows = match channel {
            Some(channel) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {TEMPLATE_COLS} FROM communication_templates
                             WHERE channel = ?1 ORDER BY name"
                        ),
                        [channel.as_str()],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!("SELECT {TEMPLATE_COLS} FROM communication_templates ORDER BY name"),
                        (),
                    )
                    .await?
            }
        };
        collect_rows(rows, row_to_template).await
    }

    /// Replace a template's subject and body.
    pub async fn update_template(
        &self,
        id: &str,
        subject: Option<&str>,
        body: &str,
    ) -> Result<CommunicationTemplate, DatabaseError> {
        let now = Utc::now();
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE communication_templates SET subject = ?1, body = ?2, updated_at = ?3
                 WHERE id = ?4",
                libsql::params![subject, body, ts(now), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.audit(EntityType::Template, id, AuditAction::Updated, None, now)
            .await?;
        self.get_template(id).await
    }

    pub async fn delete_template(&self, id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute("DELETE FROM communication_templates WHERE id = ?1", [id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.audit(EntityType::Template, id, AuditAction::Deleted, None, Utc::now())
            .await
    }

    // -----------------------------------------------------------------------
    // Queued communications
    // -----------------------------------------------------------------------

    /// Queue a communication for the next dispatch run.
    ///
    /// When the template exists its channel wins over `new.channel`.
    pub async fn queue_communication(
        &self,
        mut new: NewCommunication,
    ) -> Result<CommunicationLog, DatabaseError> {
        if let Some(template_id) = new.template_id.as_deref() {
            match self.get_template(template_id).await {
                Ok(template) if template.channel != new.channel => {
                    tracing::debug!(
                        template = %template.id,
                        requested = new.channel.as_str(),
                        channel = template.channel.as_str(),
                        "queued channel follows template"
                    );
                    new.channel = template.channel;
                }
                Ok(_) | Err(DatabaseError::NoResult) => {}
                Err(err) => return Err(err),
            }
        }
        self.insert_log(&new, DeliveryStatus::Queued, None, Utc::now())
            .await
    }

    async fn insert_log(
        &self,
        new: &NewCommunication,
        status: DeliveryStatus,
        sent_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<CommunicationLog, DatabaseError> {
        let id = self.db().generate_id(PREFIX_COMMUNICATION_LOG).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO communication_logs ({LOG_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    new.channel.as_str(),
                    new.template_id.as_deref(),
                    new.lead_id.as_deref(),
                    new.student_id.as_deref(),
                    new.recipient_email.as_deref(),
                    new.recipient_phone.as_deref(),
                    status.as_str(),
                    datetime_param(sent_at),
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::CommunicationLog, &id, AuditAction::Created, None, now)
            .await?;
        Ok(CommunicationLog {
            id,
            channel: new.channel,
            template_id: new.template_id.clone(),
            lead_id: new.lead_id.clone(),
            student_id: new.student_id.clone(),
            recipient_email: new.recipient_email.clone(),
            recipient_phone: new.recipient_phone.clone(),
            status,
            error_message: None,
            sent_at,
            created_at: now,
        })
    }

    pub async fn get_communication(&self, id: &str) -> Result<CommunicationLog, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {LOG_COLS} FROM communication_logs WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_log(&row)
    }

    /// Newest first, optionally one status.
    pub async fn list_communications(
        &self,
        status: Option<DeliveryStatus>,
        limit: u32,
    ) -> Result<Vec<CommunicationLog>, DatabaseError> {
        let rows = match status {
            Some(status) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {LOG_COLS} FROM communication_logs WHERE status = ?1
                             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
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
                            "SELECT {LOG_COLS} FROM communication_logs
                             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
                        ),
                        (),
                    )
                    .await?
            }
        };
        collect_rows(rows, row_to_log).await
    }

    /// Every `queued` communication, oldest first.
    pub async fn queued_communications(&self) -> Result<Vec<CommunicationLog>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {LOG_COLS} FROM communication_logs WHERE status = 'queued'
                     ORDER BY created_at, rowid"
                ),
                (),
            )
            .await?;
        collect_rows(rows, row_to_log).await
    }

    pub async fn mark_communication_sent(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "UPDATE communication_logs SET status = 'sent', sent_at = ?1, error_message = NULL
                 WHERE id = ?2",
                libsql::params![ts(at), id],
            )
            .await?;
        self.audit(EntityType::CommunicationLog, id, AuditAction::Sent, None, at)
            .await
    }

    pub async fn mark_communication_failed(
        &self,
        id: &str,
        channel: Channel,
        error: &str,
    ) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "UPDATE communication_logs SET status = 'failed', error_message = ?1 WHERE id = ?2",
                libsql::params![error, id],
            )
            .await?;
        let detail = DeliveryFailedDetail {
            channel: channel.as_str().to_string(),
            error: error.to_string(),
        };
        self.audit(
            EntityType::CommunicationLog,
            id,
            AuditAction::Failed,
            Some(serde_json::to_value(&detail)?),
            Utc::now(),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Recipients
    // -----------------------------------------------------------------------

    /// Pick the delivery address: the explicit one, else the lead's, else the
    /// student's. `None` when nobody has one for the channel.
    pub async fn resolve_recipient(
        &self,
        channel: Channel,
        explicit: Option<&str>,
        lead_id: Option<&str>,
        student_id: Option<&str>,
    ) -> Result<Option<String>, DatabaseError> {
        if let Some(explicit) = explicit.filter(|v| !v.trim().is_empty()) {
            return Ok(Some(explicit.trim().to_string()));
        }
        let column = match channel {
            Channel::Email => "email",
            Channel::Sms => "phone",
        };
        for (table, id) in [("leads", lead_id), ("students", student_id)] {
            let Some(id) = id else { continue };
            let mut rows = self
                .db()
                .conn()
                .query(&format!("SELECT {column} FROM {table} WHERE id = ?1"), [id])
                .await?;
            if let Some(row) = rows.next().await?
                && let Some(value) = non_empty(get_opt_string(&row, 0)?)
            {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    // -----------------------------------------------------------------------
    // Scheduled messages
    // -----------------------------------------------------------------------

    pub async fn schedule_message(
        &self,
        new: NewScheduledMessage,
    ) -> Result<ScheduledMessage, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_SCHEDULED_MESSAGE).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO scheduled_messages ({MESSAGE_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0, NULL, NULL, ?12)"
                ),
                libsql::params![
                    id.as_str(),
                    new.channel.as_str(),
                    new.template_id.as_deref(),
                    new.lead_id.as_deref(),
                    new.student_id.as_deref(),
                    new.recipient_email.as_deref(),
                    new.recipient_phone.as_deref(),
                    new.subject.as_deref(),
                    new.body.as_str(),
                    ts(new.scheduled_for),
                    ScheduleStatus::Scheduled.as_str(),
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::ScheduledMessage, &id, AuditAction::Created, None, now)
            .await?;
        Ok(ScheduledMessage {
            id,
            channel: new.channel,
            template_id: new.template_id,
            lead_id: new.lead_id,
            student_id: new.student_id,
            recipient_email: new.recipient_email,
            recipient_phone: new.recipient_phone,
            subject: new.subject,
            body: new.body,
            scheduled_for: new.scheduled_for,
            status: ScheduleStatus::Scheduled,
            attempts: 0,
            last_error: None,
            sent_at: None,
            created_at: now,
        })
    }

    pub async fn get_scheduled_message(&self, id: &str) -> Result<ScheduledMessage, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {MESSAGE_COLS} FROM scheduled_messages WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_message(&row)
    }

    /// Soonest due first, optionally one status.
    pub async fn list_scheduled_messages(
        &self,
        status: Option<ScheduleStatus>,
        limit: u32,
    ) -> Result<Vec<ScheduledMessage>, DatabaseError> {
        let rows = match status {
            Some(status) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {MESSAGE_COLS} FROM scheduled_messages WHERE status = ?1
                             ORDER BY scheduled_for LIMIT {limit}"
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
                            "SELECT {MESSAGE_COLS} FROM scheduled_messages
                             ORDER BY scheduled_for LIMIT {limit}"
                        ),
                        (),
                    )
                    .await?
            }
        };
        collect_rows(rows, row_to_message).await
    }

    /// Messages still `scheduled` whose due time is at or before `now`.
    pub async fn due_scheduled_messages(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduledMessage>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {MESSAGE_COLS} FROM scheduled_messages
                     WHERE status = 'scheduled' AND scheduled_for <= ?1
                     ORDER BY scheduled_for, rowid"
                ),
                [ts(now)],
            )
            .await?;
        collect_rows(rows, row_to_message).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` unless the message is still `scheduled`.
    pub async fn cancel_scheduled_message(
        &self,
        id: &str,
    ) -> Result<ScheduledMessage, DatabaseError> {
        let current = self.get_scheduled_message(id).await?;
        if !current.status.can_transition_to(ScheduleStatus::Cancelled) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot cancel scheduled message {id} in status {}",
                current.status
            )));
        }
        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE scheduled_messages SET status = 'cancelled' WHERE id = ?1",
                [id],
            )
            .await?;
        let detail = StatusChangedDetail {
            from: current.status.as_str().to_string(),
            to: ScheduleStatus::Cancelled.as_str().to_string(),
            reason: None,
        };
        self.audit(
            EntityType::ScheduledMessage,
            id,
            AuditAction::StatusChanged,
            Some(serde_json::to_value(&detail)?),
            now,
        )
        .await?;
        Ok(ScheduledMessage {
            status: ScheduleStatus::Cancelled,
            ..current
        })
    }

    /// Record a successful delivery attempt and write the matching `sent`
    /// communication log row.
    pub async fn mark_scheduled_sent(
        &self,
        message: &ScheduledMessage,
        recipient: &str,
        at: DateTime<Utc>,
    ) -> Result<CommunicationLog, DatabaseError> {
        self.db()
            .conn()
            .execute(
                "UPDATE scheduled_messages
                 SET status = 'sent', attempts = attempts + 1, sent_at = ?1, last_error = NULL
                 WHERE id = ?2",
                libsql::params![ts(at), message.id.as_str()],
            )
            .await?;
        self.audit(EntityType::ScheduledMessage, &message.id, AuditAction::Sent, None, at)
            .await?;

        let (recipient_email, recipient_phone) = match message.channel {
            Channel::Email => (Some(recipient.to_string()), None),
            Channel::Sms => (None, Some(recipient.to_string())),
        };
        let log = NewCommunication {
            channel: message.channel,
            template_id: message.template_id.clone(),
            lead_id: message.lead_id.clone(),
            student_id: message.student_id.clone(),
            recipient_email,
            recipient_phone,
        };
        self.insert_log(&log, DeliveryStatus::Sent, Some(at), at).await
    }

    pub async fn mark_scheduled_failed(
        &self,
        message: &ScheduledMessage,
        error: &str,
    ) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "UPDATE scheduled_messages
                 SET status = 'failed', attempts = attempts + 1, last_error = ?1
                 WHERE id = ?2",
                libsql::params![error, message.id.as_str()],
            )
            .await?;
        let detail = DeliveryFailedDetail {
            channel: message.channel.as_str().to_string(),
            error: error.to_string(),
        };
        self.audit(
            EntityType::ScheduledMessage,
            &message.id,
            AuditAction::Failed,
            Some(serde_json::to_value(&detail)?),
            Utc::now(),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Lesson reminders
    // -----------------------------------------------------------------------

    /// Queue reminders for scheduled lessons starting within the reminder
    /// window after `now`.
    ///
    /// Each lesson gets at most one `lesson_24h` reminder log. Its messages
    /// are due 24 hours before the start, or immediately when that is already
    /// past: an email when the student has an address and an SMS when the
    /// student has a phone. Returns the number of messages queued.
    pub async fn generate_lesson_reminders(&self, now: DateTime<Utc>) -> Result<u32, DatabaseError> {
        let window_end = now + Duration::hours(self.settings().reminder_window_hours);
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {LESSON_COLS} FROM lessons
                     WHERE status = ?1 AND start_time >= ?2 AND start_time <= ?3
                     ORDER BY start_time"
                ),
                libsql::params![LessonStatus::Scheduled.as_str(), ts(now), ts(window_end)],
            )
            .await?;
        let lessons = collect_rows(rows, row_to_lesson).await?;

        let mut enqueued = 0;
        for lesson in lessons {
            let reminder_time = (lesson.start_time - Duration::hours(24)).max(now);
            let log_id = self.db().generate_id(PREFIX_REMINDER_LOG).await?;
            let inserted = self
                .db()
                .conn()
                .execute(
                    "INSERT OR IGNORE INTO reminder_logs
                        (id, lesson_id, reminder_type, scheduled_for, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    libsql::params![
                        log_id.as_str(),
                        lesson.id.as_str(),
                        ReminderType::Lesson24h.as_str(),
                        ts(reminder_time),
                        ts(now)
                    ],
                )
                .await?;
            if inserted == 0 {
                continue;
            }

            let student = self.get_student(&lesson.student_id).await?;
            let start = lesson.start_time.format(REMINDER_TIME_FORMAT).to_string();

            if let Some(email) = non_empty(student.email.clone()) {
                let mut message = NewScheduledMessage::email(
                    email,
                    "Lesson reminder",
                    format!("Your lesson is scheduled for {start}."),
                    reminder_time,
                );
                message.student_id = Some(student.id.clone());
                self.schedule_message(message).await?;
                enqueued += 1;
            }
            if let Some(phone) = non_empty(student.phone.clone()) {
                let mut message =
                    NewScheduledMessage::sms(phone, format!("Lesson reminder: {start}"), reminder_time);
                message.student_id = Some(student.id.clone());
                message.subject = Some(String::new());
                self.schedule_message(message).await?;
                enqueued += 1;
            }
            tracing::debug!(lesson = %lesson.id, due = %reminder_time, "lesson reminder queued");
        }
        Ok(enqueued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::lead::NewLead;
    use crate::repos::student::NewStudent;
    use crate::test_support::helpers::{at, lesson_at, make_student, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn template_crud() {
        let svc = test_service().await;
        let tpl = svc
            .create_template(NewTemplate {
                name: "Welcome".into(),
                channel: Channel::Email,
                subject: Some("Welcome aboard".into()),
                body: "See you on the road.".into(),
            })
            .await
            .unwrap();
        let updated = svc
            .update_template(&tpl.id, Some("Welcome!"), "See you soon.")
            .await
            .unwrap();
        assert_eq!(updated.subject.as_deref(), Some("Welcome!"));
        assert_eq!(svc.list_templates(Some(Channel::Sms)).await.unwrap().len(), 0);
        assert_eq!(svc.list_templates(None).await.unwrap().len(), 1);
        svc.delete_template(&tpl.id).await.unwrap();
        assert!(matches!(svc.get_template(&tpl.id).await, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn queued_channel_follows_template() {
        let svc = test_service().await;
        let tpl = svc
            .create_template(NewTemplate {
                name: "Reminder text".into(),
                channel: Channel::Sms,
                subject: None,
                body: "See you tomorrow.".into(),
            })
            .await
            .unwrap();
        let log = svc
            .queue_communication(NewCommunication {
                channel: Channel::Email,
                template_id: Some(tpl.id.clone()),
                lead_id: None,
                student_id: None,
                recipient_email: Some("jo@example.com".into()),
                recipient_phone: Some("+15550100".into()),
            })
            .await
            .unwrap();
        assert_eq!(log.channel, Channel::Sms);
        assert_eq!(svc.get_communication(&log.id).await.unwrap().channel, Channel::Sms);
    }

    #[tokio::test]
    async fn recipient_falls_back_lead_then_student() {
        let svc = test_service().await;
        let lead = svc
            .create_lead(NewLead {
                first_name: "Lee".into(),
                email: Some("lee@example.com".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let student = make_student(&svc, "Ana").await;

        let explicit = svc
            .resolve_recipient(Channel::Email, Some("x@example.com"), Some(&lead.id), Some(&student.id))
            .await
            .unwrap();
        assert_eq!(explicit.as_deref(), Some("x@example.com"));

        let from_lead = svc
            .resolve_recipient(Channel::Email, None, Some(&lead.id), Some(&student.id))
            .await
            .unwrap();
        assert_eq!(from_lead.as_deref(), Some("lee@example.com"));

        let phone = svc
            .resolve_recipient(Channel::Sms, Some(""), Some(&lead.id), Some(&student.id))
            .await
            .unwrap();
        assert_eq!(phone.as_deref(), Some("+15550100"));

        assert_eq!(
            svc.resolve_recipient(Channel::Sms, None, Some(&lead.id), None)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn cancel_only_from_scheduled() {
        let svc = test_service().await;
        let msg = svc
            .schedule_message(NewScheduledMessage::sms("+1555", "hi", at(1, 9)))
            .await
            .unwrap();
        let cancelled = svc.cancel_scheduled_message(&msg.id).await.unwrap();
        assert_eq!(cancelled.status, ScheduleStatus::Cancelled);
        assert!(matches!(
            svc.cancel_scheduled_message(&msg.id).await,
            Err(DatabaseError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn due_messages_respect_time_and_status() {
        let svc = test_service().await;
        let early = svc
            .schedule_message(NewScheduledMessage::sms("+1", "a", at(1, 9)))
            .await
            .unwrap();
        svc.schedule_message(NewScheduledMessage::sms("+1", "b", at(3, 9)))
            .await
            .unwrap();
        let due = svc.due_scheduled_messages(at(2, 0)).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, early.id);

        svc.mark_scheduled_failed(&due[0], "boom").await.unwrap();
        let failed = svc.get_scheduled_message(&early.id).await.unwrap();
        assert_eq!(failed.status, ScheduleStatus::Failed);
        assert_eq!(failed.attempts, 1);
        assert_eq!(failed.last_error.as_deref(), Some("boom"));
        assert!(svc.due_scheduled_messages(at(2, 0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sent_writes_log_row() {
        let svc = test_service().await;
        let msg = svc
            .schedule_message(NewScheduledMessage::email("a@example.com", "s", "b", at(1, 9)))
            .await
            .unwrap();
        let log = svc
            .mark_scheduled_sent(&msg, "a@example.com", at(1, 10))
            .await
            .unwrap();
        assert_eq!(log.status, DeliveryStatus::Sent);
        assert_eq!(log.recipient_email.as_deref(), Some("a@example.com"));
        assert_eq!(log.sent_at, Some(at(1, 10)));

        let stored = svc.get_scheduled_message(&msg.id).await.unwrap();
        assert_eq!(stored.status, ScheduleStatus::Sent);
        assert_eq!(stored.attempts, 1);
        assert_eq!(stored.sent_at, Some(at(1, 10)));
    }

    #[tokio::test]
    async fn reminders_are_generated_once_per_lesson() {
        let svc = test_service().await;
        let student = make_student(&svc, "Ana").await;
        svc.schedule_lesson(lesson_at(&student.id, at(2, 15)))
            .await
            .unwrap();
        // Outside the window.
        svc.schedule_lesson(lesson_at(&student.id, at(5, 15)))
            .await
            .unwrap();

        let now = at(1, 18);
        assert_eq!(svc.generate_lesson_reminders(now).await.unwrap(), 2);
        assert_eq!(svc.generate_lesson_reminders(now).await.unwrap(), 0);

        let queued = svc
            .list_scheduled_messages(Some(ScheduleStatus::Scheduled), 10)
            .await
            .unwrap();
        assert_eq!(queued.len(), 2);
        let email = queued.iter().find(|m| m.channel == Channel::Email).unwrap();
        assert_eq!(email.subject.as_deref(), Some("Lesson reminder"));
        assert_eq!(
            email.body,
            "Your lesson is scheduled for 2026-04-02 15:00:00+00:00."
        );
        // Start minus 24h is already past, so due immediately.
        assert_eq!(email.scheduled_for, now);
        let sms = queued.iter().find(|m| m.channel == Channel::Sms).unwrap();
        assert_eq!(sms.body, "Lesson reminder: 2026-04-02 15:00:00+00:00");
    }

    #[tokio::test]
    async fn reminder_skips_missing_contact() {
        let svc = test_service().await;
        let student = svc
            .create_student(NewStudent {
                first_name: "Nocontact".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        svc.schedule_lesson(lesson_at(&student.id, at(2, 15)))
            .await
            .unwrap();
        assert_eq!(svc.generate_lesson_reminders(at(2, 9)).await.unwrap(), 0);
    }
}
