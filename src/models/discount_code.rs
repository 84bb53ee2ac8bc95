use crate::entities::discount_code_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiscountCode {
    pub code: String,
    pub percent_off: u8,
    pub active: bool,
    pub expires_at: DateTime<Utc>,
    /// Coupon id on the Stripe side
    pub stripe_coupon_id: String,
    pub created_at: DateTime<Utc>,
}

impl DiscountCode {
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.active && now < self.expires_at
    }
}

impl From<discount_code_entity::Model> for DiscountCode {
    fn from(m: discount_code_entity::Model) -> Self {
        Self {
            code: m.code,
            percent_off: m.percent_off.clamp(0, 100) as u8,
            active: m.active,
            expires_at: m.expires_at,
            stripe_coupon_id: m.stripe_coupon_id,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewDiscountCode {
    pub code: String,
    pub percent_off: u8,
    pub expires_at: DateTime<Utc>,
    pub stripe_coupon_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateDiscountRequest {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateDiscountResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_off: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidateDiscountResponse {
    pub fn valid(percent_off: u8) -> Self {
        Self {
            valid: true,
            percent_off: Some(percent_off),
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            percent_off: None,
            message: Some(message.into()),
        }
    }
}

/// Every field is optional; omitted ones fall back to the standard promotion
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiscountRequest {
    pub code: Option<String>,
    pub percent_off: Option<u8>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponSummary {
    pub id: String,
    pub percent_off: u8,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateDiscountResponse {
    pub success: bool,
    pub message: String,
    pub coupon: CouponSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn code(active: bool, expires_in: Duration) -> DiscountCode {
        let now = Utc::now();
        DiscountCode {
            code: "FREE100".into(),
            percent_off: 100,
            active,
            expires_at: now + expires_in,
            stripe_coupon_id: "FREE100".into(),
            created_at: now,
        }
    }

    #[test]
    fn test_is_redeemable() {
        let now = Utc::now();
        assert!(code(true, Duration::days(1)).is_redeemable(now));
        assert!(!code(false, Duration::days(1)).is_redeemable(now));
        assert!(!code(true, Duration::days(-1)).is_redeemable(now));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let c = code(true, Duration::zero());
        assert!(!c.is_redeemable(c.expires_at));
    }

    #[test]
    fn test_invalid_response_shape() {
        let body = serde_json::to_value(ValidateDiscountResponse::invalid("nope")).unwrap();
        assert_eq!(body, serde_json::json!({"valid": false, "message": "nope"}));
        let body = serde_json::to_value(ValidateDiscountResponse::valid(20)).unwrap();
        assert_eq!(body, serde_json::json!({"valid": true, "percentOff": 20}));
    }
}
