//! Public website forms.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use gear_core::entities::{EnrollmentRequest, Lead, LessonRequest};
use gear_core::forms::{ContactForm, EnrollmentRequestForm, LessonRequestForm};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn lead_capture(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<Lead>), ApiError> {
    let lead = state.service.capture_website_lead(form).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

pub async fn enroll_request(
    State(state): State<AppState>,
    Json(form): Json<EnrollmentRequestForm>,
) -> Result<(StatusCode, Json<EnrollmentRequest>), ApiError> {
    let request = state.service.submit_enrollment_request(form).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn lesson_request(
    State(state): State<AppState>,
    Json(form): Json<LessonRequestForm>,
) -> Result<(StatusCode, Json<LessonRequest>), ApiError> {
    let request = state.service.submit_lesson_request(form).await?;
    Ok((StatusCode::CREATED, Json(request)))
}
