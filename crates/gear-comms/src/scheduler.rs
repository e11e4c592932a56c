//! Reminder scheduler: one pass generates lesson reminders and delivers every
//! due scheduled message. [`Dispatcher::run_scheduler_loop`] repeats the pass
//! on an interval until shut down.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gear_core::entities::{CommunicationTemplate, ScheduledMessage};
use gear_core::enums::Channel;
use gear_core::responses::SchedulerReport;
use tokio::time::MissedTickBehavior;

use crate::dispatch::{Dispatcher, missing_recipient};
use crate::error::CommsError;

/// Subject and body to send. Non-empty template fields win over the
/// message's own.
fn compose(message: &ScheduledMessage, template: Option<&CommunicationTemplate>) -> (String, String) {
    let subject = template
        .and_then(|t| t.subject.clone())
        .filter(|s| !s.is_empty())
        .or_else(|| message.subject.clone())
        .unwrap_or_default();
    let body = template
        .map(|t| t.body.clone())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| message.body.clone());
    (subject, body)
}

impl Dispatcher {
    /// Run one scheduler pass at `now`.
    ///
    /// # Errors
    ///
    /// Returns `CommsError::Db` if scheduling state cannot be read or recorded.
    pub async fn run_scheduler(&self, now: DateTime<Utc>) -> Result<SchedulerReport, CommsError> {
        let reminders_enqueued = self.service().generate_lesson_reminders(now).await?;
        let mut report = SchedulerReport {
            reminders_enqueued,
            ..SchedulerReport::default()
        };

        for message in self.service().due_scheduled_messages(now).await? {
            let template = self.template_for(message.template_id.as_deref()).await?;
            let (subject, body) = compose(&message, template.as_ref());

            let explicit = match message.channel {
                Channel::Email => message.recipient_email.as_deref(),
                Channel::Sms => message.recipient_phone.as_deref(),
            };
            let recipient = self
                .service()
                .resolve_recipient(
                    message.channel,
                    explicit,
                    message.lead_id.as_deref(),
                    message.student_id.as_deref(),
                )
                .await?;
            let Some(to) = recipient else {
                let error = missing_recipient(message.channel);
                self.service().mark_scheduled_failed(&message, error).await?;
                tracing::warn!(message = %message.id, "{error}");
                report.failed += 1;
                continue;
            };

            match self.deliver(message.channel, to.clone(), subject, body).await {
                Ok(()) => {
                    self.service()
                        .mark_scheduled_sent(&message, &to, Utc::now())
                        .await?;
                    report.sent += 1;
                }
                Err(err) => {
                    let error = err.to_string();
                    self.service().mark_scheduled_failed(&message, &error).await?;
                    tracing::warn!(message = %message.id, %error, "scheduled delivery failed");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            reminders = report.reminders_enqueued,
            sent = report.sent,
            failed = report.failed,
            "scheduler pass complete"
        );
        Ok(report)
    }

    /// Run [`Dispatcher::run_scheduler`] every `every` until `shutdown`
    /// resolves.
    ///
    /// Passes run one at a time; a pass that overruns the interval delays the
    /// next tick instead of bursting. Errors are logged and the loop carries on.
    pub async fn run_scheduler_loop<F>(&self, every: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.run_scheduler(Utc::now()).await {
                        tracing::warn!(error = %err, "scheduler pass failed");
                    }
                }
            }
        }
    }
}
