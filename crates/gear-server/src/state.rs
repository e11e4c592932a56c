use std::sync::Arc;

use gear_db::service::GearService;

use crate::stripe::WebhookVerifier;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GearService>,
    pub stripe: WebhookVerifier,
}

impl AppState {
    pub const fn new(service: Arc<GearService>, stripe: WebhookVerifier) -> Self {
        Self { service, stripe }
    }
}
