use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use chrono::Utc;

use crate::error::ApiError;
use crate::state::AppState;

pub const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// iCalendar subscription feed for a token.
pub async fn feed(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let body = state.service.render_feed(&token, Utc::now()).await?;
    Ok(([(CONTENT_TYPE, CALENDAR_CONTENT_TYPE)], body))
}
