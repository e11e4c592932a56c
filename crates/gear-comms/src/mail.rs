//! SMTP mailer built on lettre.

use async_trait::async_trait;
use gear_config::SmtpConfig;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::CommsError;
use crate::transport::{Mailer, OutgoingEmail};

/// Sends mail through the configured SMTP relay.
///
/// Built from an unconfigured [`SmtpConfig`] it still constructs, but every
/// send fails with [`CommsError::NotConfigured`].
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl SmtpMailer {
    /// # Errors
    ///
    /// Returns `CommsError::Smtp` if the relay cannot be set up for TLS, or
    /// `CommsError::Address` if `from_email` is not a valid address.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, CommsError> {
        if !config.is_configured() {
            return Ok(Self {
                transport: None,
                from: None,
            });
        }

        let builder = if config.use_ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        let builder = builder.port(config.port);
        let builder = if config.has_credentials() {
            builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
        } else {
            builder
        };

        tracing::debug!(host = %config.host, port = config.port, ssl = config.use_ssl, tls = config.use_tls, "SMTP transport ready");
        Ok(Self {
            transport: Some(builder.build()),
            from: Some(config.from_email.parse()?),
        })
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.transport.is_some()
    }
}

/// Assemble a plain-text message.
fn build_message(from: Mailbox, email: &OutgoingEmail) -> Result<Message, CommsError> {
    Ok(Message::builder()
        .from(from)
        .to(email.to.parse()?)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())?)
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), CommsError> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            return Err(CommsError::NotConfigured("SMTP is not configured".into()));
        };
        let message = build_message(from.clone(), email)?;
        transport.send(message).await?;
        tracing::debug!(to = %email.to, "email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            to: to.into(),
            subject: "Lesson reminder".into(),
            body: "See you tomorrow.".into(),
        }
    }

    #[tokio::test]
    async fn unconfigured_mailer_refuses_to_send() {
        let mailer = SmtpMailer::from_config(&SmtpConfig::default()).unwrap();
        assert!(!mailer.is_configured());
        let err = mailer.send(&email("jo@example.com")).await.unwrap_err();
        assert_eq!(err.to_string(), "SMTP is not configured");
    }

    #[tokio::test]
    async fn plaintext_relay_builds_without_network() {
        let config = SmtpConfig {
            host: "localhost".into(),
            port: 2525,
            use_ssl: false,
            from_email: "office@example.com".into(),
            ..Default::default()
        };
        assert!(SmtpMailer::from_config(&config).unwrap().is_configured());
    }

    #[tokio::test]
    async fn bad_sender_is_an_address_error() {
        let config = SmtpConfig {
            host: "localhost".into(),
            use_ssl: false,
            from_email: "not an address".into(),
            ..Default::default()
        };
        assert!(matches!(
            SmtpMailer::from_config(&config),
            Err(CommsError::Address(_))
        ));
    }

    #[test]
    fn message_carries_subject_and_recipient() {
        let from: Mailbox = "office@example.com".parse().unwrap();
        let message = build_message(from, &email("jo@example.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: jo@example.com"));
        assert!(raw.contains("Subject: Lesson reminder"));
    }

    #[test]
    fn bad_recipient_is_rejected() {
        let from: Mailbox = "office@example.com".parse().unwrap();
        assert!(matches!(
            build_message(from, &email("nobody")),
            Err(CommsError::Address(_))
        ));
    }
}
