use crate::database::DiscountStore;
use crate::error::{AppError, AppResult};
use crate::external::{NewCoupon, PaymentGateway};
use crate::models::*;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use std::sync::Arc;

pub const DEFAULT_PROMO_CODE: &str = "FREE100";
pub const DEFAULT_PROMO_PERCENT: u8 = 100;

const INVALID_CODE_MESSAGE: &str = "Código de desconto inválido ou expirado";

#[derive(Clone)]
pub struct DiscountCodeService {
    store: Arc<dyn DiscountStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl DiscountCodeService {
    pub fn new(store: Arc<dyn DiscountStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { store, gateway }
    }

    /// Active and unexpired code, `None` for anything else
    pub async fn find_redeemable(&self, code: &str) -> AppResult<Option<DiscountCode>> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }
        let now = Utc::now();
        Ok(self
            .store
            .find_by_code(code)
            .await?
            .filter(|c| c.is_redeemable(now)))
    }

    pub async fn validate(&self, request: ValidateDiscountRequest) -> AppResult<ValidateDiscountResponse> {
        match self.find_redeemable(&request.code).await? {
            Some(code) => Ok(ValidateDiscountResponse::valid(code.percent_off)),
            None => Ok(ValidateDiscountResponse::invalid(INVALID_CODE_MESSAGE)),
        }
    }

    /// 先在 Stripe 创建 coupon，再写库；写库失败则删除 coupon
    pub async fn create_discount(
        &self,
        request: CreateDiscountRequest,
    ) -> AppResult<CreateDiscountResponse> {
        let now = Utc::now();
        let code = request
            .code
            .as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_PROMO_CODE)
            .to_string();
        let percent_off = request.percent_off.unwrap_or(DEFAULT_PROMO_PERCENT);
        let expires_at = request.expires_at.unwrap_or_else(|| end_of_year(now));

        if code.is_empty() || code.len() > 64 {
            return Err(AppError::ValidationError(
                "Discount code must be between 1 and 64 characters".to_string(),
            ));
        }
        if !(1..=100).contains(&percent_off) {
            return Err(AppError::ValidationError(
                "percentOff must be between 1 and 100".to_string(),
            ));
        }
        if expires_at <= now {
            return Err(AppError::ValidationError(
                "expiresAt must be in the future".to_string(),
            ));
        }
        if self.store.find_by_code(&code).await?.is_some() {
            return Err(AppError::ValidationError(format!(
                "Discount code {code} already exists"
            )));
        }

        let coupon_id = self
            .gateway
            .create_coupon(NewCoupon {
                id: code.clone(),
                percent_off,
                redeem_by: expires_at,
            })
            .await?;

        let inserted = match self
            .store
            .insert(NewDiscountCode {
                code: code.clone(),
                percent_off,
                expires_at,
                stripe_coupon_id: coupon_id.clone(),
            })
            .await
        {
            Ok(inserted) => inserted,
            Err(e) => {
                log::error!("Failed to store discount code {code}, rolling back coupon {coupon_id}: {e}");
                if let Err(delete_err) = self.gateway.delete_coupon(&coupon_id).await {
                    log::error!("Failed to delete Stripe coupon {coupon_id}: {delete_err}");
                }
                return Err(e);
            }
        };

        log::info!(
            "Discount code {} created ({}% off, expires {})",
            inserted.code,
            inserted.percent_off,
            inserted.expires_at
        );

        Ok(CreateDiscountResponse {
            success: true,
            message: "Discount code created successfully".to_string(),
            coupon: CouponSummary {
                id: coupon_id,
                percent_off: inserted.percent_off,
                expires_at: inserted.expires_at,
            },
        })
    }
}

/// Last second of the UTC year containing `now`
pub fn end_of_year(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), 12, 31, 23, 59, 59)
        .single()
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_of_year() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();
        assert_eq!(
            end_of_year(now),
            Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap()
        );
    }
}
