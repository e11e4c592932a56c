//! Staff notification inbox.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::StaffUserId;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Kept as text so a non-numeric value falls back to the default.
    limit: Option<String>,
}

pub async fn unread_count(
    State(state): State<AppState>,
    StaffUserId(user): StaffUserId,
) -> Result<Json<Value>, ApiError> {
    let count = state.service.unread_count(&user).await?;
    Ok(Json(json!({"unread_count": count})))
}

pub async fn list(
    State(state): State<AppState>,
    StaffUserId(user): StaffUserId,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    let limit = params.limit.as_deref().and_then(parse_limit);
    let items = state.service.list_receipts(&user, limit).await?;
    Ok(Json(json!({"items": items})))
}

/// Parse a page size. Integers outside the `i64` range saturate so they still
/// clamp; anything that is not an integer yields `None`.
fn parse_limit(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(limit) = raw.parse::<i64>() {
        return Some(limit);
    }
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

pub async fn mark_read(
    State(state): State<AppState>,
    StaffUserId(user): StaffUserId,
    Path(receipt_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let read_at = state.service.mark_read(&receipt_id, &user).await?;
    Ok(Json(json!({"ok": true, "read_at": read_at})))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    StaffUserId(user): StaffUserId,
) -> Result<Json<Value>, ApiError> {
    let updated = state.service.mark_all_read(&user).await?;
    Ok(Json(json!({"ok": true, "updated": updated})))
}

#[cfg(test)]
mod tests {
    use super::parse_limit;

    #[test]
    fn limits_parse_as_signed_integers() {
        assert_eq!(parse_limit(" 7 "), Some(7));
        assert_eq!(parse_limit("-5"), Some(-5));
        assert_eq!(parse_limit("99999999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_limit("-99999999999999999999999"), Some(i64::MIN));
        assert_eq!(parse_limit("abc"), None);
        assert_eq!(parse_limit("-"), None);
        assert_eq!(parse_limit("1.5"), None);
    }
}
