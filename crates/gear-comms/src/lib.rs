//! # gear-comms
//!
//! Outbound email and SMS for Gearbox.
//!
//! - [`mail::SmtpMailer`] sends through an SMTP relay with lettre.
//! - [`sms::WebhookSms`] posts JSON to an SMS provider webhook with reqwest.
//! - [`dispatch::Dispatcher`] delivers queued communications and runs the
//!   lesson reminder scheduler, recording every outcome through
//!   `gear_db::service::GearService`.

pub mod dispatch;
pub mod error;
pub mod http;
pub mod mail;
pub mod scheduler;
pub mod sms;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use dispatch::Dispatcher;
pub use error::CommsError;
pub use transport::{Mailer, OutgoingEmail, OutgoingSms, SmsGateway};
