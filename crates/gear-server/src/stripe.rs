//! Stripe webhook signature verification.
//!
//! The `Stripe-Signature` header looks like `t=1700000000,v1=<hex>,v1=<hex>`.
//! A `v1` value is the hex HMAC-SHA256 of `"{t}.{payload}"` keyed with the
//! endpoint secret. Any matching `v1` is accepted; the timestamp must be no
//! older than the tolerance.

use gear_config::StripeConfig;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("webhook secret is not configured")]
    NotConfigured,
    #[error("signature header is malformed")]
    Malformed,
    #[error("no signature matches the payload")]
    Mismatch,
    #[error("signature timestamp is outside the tolerance")]
    Expired,
}

#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>, tolerance_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs,
        }
    }

    #[must_use]
    pub fn from_config(config: &StripeConfig) -> Self {
        Self::new(config.webhook_secret.clone(), config.tolerance_secs)
    }

    fn mac(&self, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| SignatureError::NotConfigured)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }

    /// Header value signing `payload` at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns `SignatureError::NotConfigured` without a secret.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> Result<String, SignatureError> {
        if self.secret.is_empty() {
            return Err(SignatureError::NotConfigured);
        }
        let digest = self.mac(timestamp, payload)?.finalize().into_bytes();
        Ok(format!("t={timestamp},v1={}", hex::encode(digest)))
    }

    /// Check `header` against `payload` at unix time `now`.
    ///
    /// # Errors
    ///
    /// Returns the first [`SignatureError`] that applies.
    pub fn verify(&self, payload: &[u8], header: &str, now: i64) -> Result<(), SignatureError> {
        if self.secret.is_empty() {
            return Err(SignatureError::NotConfigured);
        }

        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => {
                    timestamp = Some(value.parse::<i64>().map_err(|_| SignatureError::Malformed)?);
                }
                Some(("v1", value)) => signatures.push(value),
                _ => {}
            }
        }
        let Some(timestamp) = timestamp else {
            return Err(SignatureError::Malformed);
        };
        if signatures.is_empty() {
            return Err(SignatureError::Malformed);
        }

        let mac = self.mac(timestamp, payload)?;
        let matched = signatures.iter().any(|sig| {
            hex::decode(sig).is_ok_and(|bytes| mac.clone().verify_slice(&bytes).is_ok())
        });
        if !matched {
            return Err(SignatureError::Mismatch);
        }
        if self.tolerance_secs > 0 && timestamp < now - self.tolerance_secs {
            return Err(SignatureError::Expired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_775_000_000;
    const BODY: &[u8] = br#"{"type":"payment_intent.succeeded"}"#;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new("whsec_test", 300)
    }

    #[test]
    fn accepts_own_signature() {
        let v = verifier();
        let header = v.sign(BODY, NOW).unwrap();
        assert_eq!(v.verify(BODY, &header, NOW + 10), Ok(()));
    }

    #[test]
    fn any_v1_may_match() {
        let v = verifier();
        let good = v.sign(BODY, NOW).unwrap();
        let sig = good.split_once("v1=").unwrap().1;
        let header = format!("t={NOW},v1=deadbeef,v1={sig}");
        assert_eq!(v.verify(BODY, &header, NOW), Ok(()));
    }

    #[test]
    fn rejects_tampered_payload() {
        let v = verifier();
        let header = v.sign(BODY, NOW).unwrap();
        assert_eq!(
            v.verify(b"{}", &header, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_old_timestamp() {
        let v = verifier();
        let header = v.sign(BODY, NOW).unwrap();
        assert_eq!(
            v.verify(BODY, &header, NOW + 301),
            Err(SignatureError::Expired)
        );
    }

    #[test]
    fn rejects_malformed_header() {
        let v = verifier();
        assert_eq!(v.verify(BODY, "v1=abc", NOW), Err(SignatureError::Malformed));
        assert_eq!(v.verify(BODY, "t=abc,v1=00", NOW), Err(SignatureError::Malformed));
        assert_eq!(v.verify(BODY, &format!("t={NOW}"), NOW), Err(SignatureError::Malformed));
    }

    #[test]
    fn missing_secret_rejects_everything() {
        let v = WebhookVerifier::new("", 300);
        assert_eq!(v.verify(BODY, "t=1,v1=00", 1), Err(SignatureError::NotConfigured));
        assert!(v.sign(BODY, NOW).is_err());
    }
}
