//! Staff identification for the notification API.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

pub const STAFF_HEADER: &str = "x-staff-user";

/// The staff user id sent in `X-Staff-User`.
///
/// Only presence is checked here; whether the user is active staff is decided
/// by the store on each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffUserId(pub String);

impl<S> FromRequestParts<S> for StaffUserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(STAFF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Self(v.to_string()))
            .ok_or(ApiError::Unauthorized)
    }
}
