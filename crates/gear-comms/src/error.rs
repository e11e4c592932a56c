//! Delivery error types.

use gear_db::error::DatabaseError;
use thiserror::Error;

/// Errors raised while delivering email or SMS.
#[derive(Debug, Error)]
pub enum CommsError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The SMS webhook returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the webhook.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The transport has no configuration to send with.
    #[error("{0}")]
    NotConfigured(String),

    /// SMTP session or relay failure.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// A sender or recipient address could not be parsed.
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The email message could not be assembled.
    #[error("invalid message: {0}")]
    Message(#[from] lettre::error::Error),

    /// Reading or recording delivery state failed.
    #[error(transparent)]
    Db(#[from] DatabaseError),
}
