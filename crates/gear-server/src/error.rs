//! API error type and its JSON rendering.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gear_db::error::DatabaseError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No `X-Staff-User` header on a staff route.
    #[error("authentication required")]
    Unauthorized,

    /// A webhook body failed signature checks or could not be parsed.
    #[error("invalid webhook")]
    InvalidWebhook,

    #[error(transparent)]
    Db(#[from] DatabaseError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidWebhook => StatusCode::BAD_REQUEST,
            Self::Db(err) => match err {
                DatabaseError::Forbidden(_) => StatusCode::FORBIDDEN,
                DatabaseError::NoResult => StatusCode::NOT_FOUND,
                DatabaseError::Validation(_) | DatabaseError::Policy(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                DatabaseError::Duplicate { .. }
                | DatabaseError::Conflict { .. }
                | DatabaseError::InvalidState(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::InvalidWebhook => json!({"status": "invalid"}),
            Self::Db(DatabaseError::Forbidden(_)) => json!({"detail": "forbidden"}),
            Self::Db(DatabaseError::NoResult) => json!({"detail": "not found"}),
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %self, "request failed");
                json!({"detail": "internal error"})
            }
            _ => json!({"detail": self.to_string()}),
        };
        (status, Json(body)).into_response()
    }
}
