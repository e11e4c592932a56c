//! Cross-cutting error types for Gearbox.
//!
//! Domain-specific errors (`DatabaseError`, `CommsError`, `ApiError`) live in
//! their respective crates. Everything converges into `anyhow` in `gear-cli`.

use thiserror::Error;

/// Errors that can be raised by any Gearbox crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// Data failed validation (form fields, time ranges, ratings).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
