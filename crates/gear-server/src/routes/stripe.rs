use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;
use gear_db::repos::billing::{StripeEvent, StripeOutcome};
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::AppState;
use crate::stripe::SIGNATURE_HEADER;

/// Verify, parse and apply a Stripe event.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if let Err(err) = state.stripe.verify(&body, header, Utc::now().timestamp()) {
        tracing::warn!(error = %err, "stripe webhook rejected");
        return Err(ApiError::InvalidWebhook);
    }
    let event: StripeEvent = serde_json::from_slice(&body).map_err(|err| {
        tracing::warn!(error = %err, "stripe webhook body is not an event");
        ApiError::InvalidWebhook
    })?;

    match state.service.apply_stripe_event(&event).await? {
        StripeOutcome::InvoicePaid {
            invoice_id,
            payment_recorded,
        } => tracing::info!(invoice = %invoice_id, payment_recorded, "invoice paid via stripe"),
        StripeOutcome::Ignored(reason) => tracing::debug!(%reason, "stripe event ignored"),
    }
    Ok(Json(json!({"status": "ok"})))
}
