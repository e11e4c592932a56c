//! # gear-server
//!
//! The Gearbox HTTP surface, built on axum.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /crm/lead`, `/crm/enroll`, `/crm/lesson/request` | website intake forms |
//! | `/crm/notifications/...` | staff inbox, identified by `X-Staff-User` |
//! | `GET /crm/calendar/{token}` | iCalendar subscription feed |
//! | `POST /crm/stripe/webhook` | signed Stripe events |
//! | `/blog`, `/testimonials` | published marketing content |

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;
pub mod stripe;

use std::future::Future;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/crm/lead", post(routes::intake::lead_capture))
        .route("/crm/enroll", post(routes::intake::enroll_request))
        .route("/crm/lesson/request", post(routes::intake::lesson_request))
        .route(
            "/crm/notifications/unread-count",
            get(routes::notifications::unread_count),
        )
        .route("/crm/notifications/list", get(routes::notifications::list))
        .route(
            "/crm/notifications/mark-all-read",
            post(routes::notifications::mark_all_read),
        )
        .route(
            "/crm/notifications/{receipt_id}/mark-read",
            post(routes::notifications::mark_read),
        )
        .route("/crm/calendar/{token}", get(routes::calendar::feed))
        .route("/crm/stripe/webhook", post(routes::stripe::webhook))
        .route("/blog", get(routes::marketing::list_posts))
        .route("/blog/{slug}", get(routes::marketing::post_detail))
        .route("/blog/{slug}/comments", post(routes::marketing::add_comment))
        .route("/testimonials", get(routes::marketing::testimonials))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves.
///
/// # Errors
///
/// Returns the I/O error if the address cannot be bound or the server fails.
pub async fn serve<F>(state: AppState, address: &str, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(address).await?;
    tracing::info!(%address, "HTTP server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("HTTP server stopped");
    Ok(())
}
