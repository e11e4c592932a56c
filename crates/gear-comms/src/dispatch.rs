//! Delivery of queued communications.

use std::sync::Arc;

use chrono::Utc;
use gear_config::GearConfig;
use gear_core::entities::CommunicationTemplate;
use gear_core::enums::Channel;
use gear_core::responses::DispatchReport;
use gear_db::error::DatabaseError;
use gear_db::service::GearService;

use crate::error::CommsError;
use crate::mail::SmtpMailer;
use crate::sms::WebhookSms;
use crate::transport::{Mailer, OutgoingEmail, OutgoingSms, SmsGateway};

pub(crate) const MISSING_TEMPLATE: &str = "Missing template";

pub(crate) const fn missing_recipient(channel: Channel) -> &'static str {
    match channel {
        Channel::Email => "Missing recipient email",
        Channel::Sms => "Missing recipient phone",
    }
}

/// Sends stored communications through a mailer and an SMS gateway and
/// records the outcome of every attempt.
///
/// Transport failures never abort a batch: they are written to the record
/// and counted. Only store failures are returned as errors.
pub struct Dispatcher {
    service: Arc<GearService>,
    mailer: Arc<dyn Mailer>,
    sms: Arc<dyn SmsGateway>,
}

impl Dispatcher {
    pub fn new(
        service: Arc<GearService>,
        mailer: Arc<dyn Mailer>,
        sms: Arc<dyn SmsGateway>,
    ) -> Self {
        Self {
            service,
            mailer,
            sms,
        }
    }

    /// Build the SMTP and webhook transports named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns `CommsError` if either transport cannot be constructed.
    pub fn from_config(service: Arc<GearService>, config: &GearConfig) -> Result<Self, CommsError> {
        let mailer = SmtpMailer::from_config(&config.smtp)?;
        let sms = WebhookSms::from_config(&config.sms)?;
        if !mailer.is_configured() {
            tracing::warn!("SMTP is not configured; email deliveries will fail");
        }
        Ok(Self::new(service, Arc::new(mailer), Arc::new(sms)))
    }

    #[must_use]
    pub fn service(&self) -> &GearService {
        &self.service
    }

    pub(crate) async fn deliver(
        &self,
        channel: Channel,
        to: String,
        subject: String,
        body: String,
    ) -> Result<(), CommsError> {
        match channel {
            Channel::Email => self.mailer.send(&OutgoingEmail { to, subject, body }).await,
            Channel::Sms => self.sms.send(&OutgoingSms { to, body }).await,
        }
    }

    /// The template with `id`, or `None` when no id is set or it was deleted.
    pub(crate) async fn template_for(
        &self,
        id: Option<&str>,
    ) -> Result<Option<CommunicationTemplate>, CommsError> {
        let Some(id) = id else { return Ok(None) };
        match self.service.get_template(id).await {
            Ok(template) => Ok(Some(template)),
            Err(DatabaseError::NoResult) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Deliver every `queued` communication once, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `CommsError::Db` if delivery state cannot be read or recorded.
    pub async fn send_queued_communications(&self) -> Result<DispatchReport, CommsError> {
        let mut report = DispatchReport::default();

        for log in self.service.queued_communications().await? {
            let Some(template) = self.template_for(log.template_id.as_deref()).await? else {
                self.service
                    .mark_communication_failed(&log.id, log.channel, MISSING_TEMPLATE)
                    .await?;
                tracing::warn!(communication = %log.id, "{MISSING_TEMPLATE}");
                report.failed += 1;
                continue;
            };

            let channel = template.channel;
            let explicit = match channel {
                Channel::Email => log.recipient_email.as_deref(),
                Channel::Sms => log.recipient_phone.as_deref(),
            };
            let recipient = self
                .service
                .resolve_recipient(
                    channel,
                    explicit,
                    log.lead_id.as_deref(),
                    log.student_id.as_deref(),
                )
                .await?;
            let Some(to) = recipient else {
                let error = missing_recipient(channel);
                self.service
                    .mark_communication_failed(&log.id, channel, error)
                    .await?;
                tracing::warn!(communication = %log.id, "{error}");
                report.failed += 1;
                continue;
            };

            let subject = template.subject.unwrap_or_default();
            match self.deliver(channel, to, subject, template.body).await {
                Ok(()) => {
                    self.service
                        .mark_communication_sent(&log.id, Utc::now())
                        .await?;
                    report.sent += 1;
                }
                Err(err) => {
                    let error = err.to_string();
                    self.service
                        .mark_communication_failed(&log.id, channel, &error)
                        .await?;
                    tracing::warn!(communication = %log.id, %error, "delivery failed");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(sent = report.sent, failed = report.failed, "queued communications processed");
        Ok(report)
    }
}
