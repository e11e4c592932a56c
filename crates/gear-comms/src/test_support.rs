//! Recording transports for gear-comms unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gear_db::service::{GearService, ServiceSettings};

use crate::dispatch::Dispatcher;
use crate::error::CommsError;
use crate::transport::{Mailer, OutgoingEmail, OutgoingSms, SmsGateway};

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), CommsError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSms {
    sent: Mutex<Vec<OutgoingSms>>,
}

impl RecordingSms {
    pub fn sent(&self) -> Vec<OutgoingSms> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsGateway for RecordingSms {
    async fn send(&self, sms: &OutgoingSms) -> Result<(), CommsError> {
        self.sent.lock().unwrap().push(sms.clone());
        Ok(())
    }
}

/// Behaves like an unconfigured webhook.
pub struct FailingSms;

#[async_trait]
impl SmsGateway for FailingSms {
    async fn send(&self, _sms: &OutgoingSms) -> Result<(), CommsError> {
        Err(CommsError::NotConfigured("SMS webhook is not configured".into()))
    }
}

pub async fn service() -> GearService {
    GearService::new_local(":memory:", None, ServiceSettings::default())
        .await
        .unwrap()
}

pub fn dispatcher(
    svc: GearService,
    mailer: Arc<dyn Mailer>,
    sms: Arc<dyn SmsGateway>,
) -> Dispatcher {
    Dispatcher::new(Arc::new(svc), mailer, sms)
}
