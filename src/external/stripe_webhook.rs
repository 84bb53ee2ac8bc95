//! Stripe webhook authentication and the subset of event payloads we read.
//!
//! The `Stripe-Signature` header looks like `t=1492774577,v1=5257a8...,v0=...`.
//! The expected `v1` value is the hex HMAC-SHA256 of `"{t}.{raw body}"` keyed
//! with the endpoint's signing secret.

use crate::config::StripeConfig;
use crate::error::{AppError, AppResult};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

/// `data.object` of a `checkout.session.completed` event
#[derive(Debug, Deserialize)]
pub struct CompletedCheckoutSession {
    pub id: String,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub customer_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

impl CompletedCheckoutSession {
    /// Payer email, preferring what the customer typed on the checkout page
    pub fn payer_email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
            .or(self.customer_email.as_deref())
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

impl WebhookEvent {
    pub fn checkout_session(&self) -> AppResult<CompletedCheckoutSession> {
        serde_json::from_value(self.data.object.clone()).map_err(|e| {
            AppError::ValidationError(format!("Event does not contain a checkout session: {e}"))
        })
    }
}

#[derive(Clone)]
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

    pub fn from_config(config: &StripeConfig) -> Self {
        Self::new(config.webhook_secret.clone(), config.webhook_tolerance_secs)
    }

    /// Verifies the signature and only then parses the event
    pub fn construct_event(&self, payload: &[u8], signature: &str) -> AppResult<WebhookEvent> {
        self.verify_at(payload, signature, Utc::now().timestamp())?;
        serde_json::from_slice(payload)
            .map_err(|e| AppError::ValidationError(format!("Malformed webhook payload: {e}")))
    }

    pub fn verify_at(&self, payload: &[u8], signature: &str, now: i64) -> AppResult<()> {
        if self.secret.is_empty() {
            return Err(AppError::ConfigError("Webhook secret is not configured".into()));
        }

        let mut timestamp: Option<i64> = None;
        let mut candidates: Vec<Vec<u8>> = Vec::new();
        for part in signature.split(',') {
            match part.trim().split_once('=') {
                Some(("t", v)) => timestamp = v.parse().ok(),
                Some(("v1", v)) => {
                    if let Ok(bytes) = hex::decode(v) {
                        candidates.push(bytes);
                    }
                }
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| AppError::SignatureError("Missing timestamp in signature".into()))?;
        if candidates.is_empty() {
            return Err(AppError::SignatureError("No v1 signature present".into()));
        }
        // t= 未经认证，可能是任意 i64
        if self.tolerance_secs > 0
            && now.abs_diff(timestamp) > self.tolerance_secs.unsigned_abs()
        {
            return Err(AppError::SignatureError(
                "Timestamp outside the tolerance zone".into(),
            ));
        }

        let matched = candidates.iter().any(|candidate| {
            let Ok(mut mac) = HmacSha256::new_from_slice(self.secret.as_bytes()) else {
                return false;
            };
            mac.update(timestamp.to_string().as_bytes());
            mac.update(b".");
            mac.update(payload);
            mac.verify_slice(candidate).is_ok()
        });

        if matched {
            Ok(())
        } else {
            Err(AppError::SignatureError("Signature mismatch".into()))
        }
    }
}
