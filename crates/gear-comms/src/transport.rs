//! Delivery transport traits.
//!
//! The dispatcher only talks to [`Mailer`] and [`SmsGateway`], so tests and
//! the CLI can swap in other implementations without touching the delivery
//! rules.

use async_trait::async_trait;

use crate::error::CommsError;

/// A single outgoing email. The sender is chosen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingSms {
    pub to: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), CommsError>;
}

#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, sms: &OutgoingSms) -> Result<(), CommsError>;
}
