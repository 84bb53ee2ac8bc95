use crate::config::StripeConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stripe::{
    CheckoutSession, CheckoutSessionMode, Client, Coupon, CouponDuration, CouponId,
    CreateCheckoutSession, CreateCheckoutSessionDiscounts, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionLineItemsPriceData, CreateCheckoutSessionLineItemsPriceDataProductData,
    CreateCheckoutSessionPaymentMethodTypes, CreateCoupon, Currency,
};

/// One-off payment for a single line item
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionRequest {
    pub product_name: String,
    pub unit_amount: i64,
    pub success_url: String,
    pub cancel_url: String,
    /// Stripe coupon to apply; when absent the hosted page offers promotion code entry
    pub coupon_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedCheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub id: String,
    pub percent_off: u8,
    pub redeem_by: DateTime<Utc>,
}

/// The parts of the payment processor the service depends on
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> AppResult<CreatedCheckoutSession>;

    /// Returns the coupon id assigned by the processor
    async fn create_coupon(&self, coupon: NewCoupon) -> AppResult<String>;

    async fn delete_coupon(&self, coupon_id: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct StripeService {
    client: Client,
}

impl StripeService {
    pub fn new(config: &StripeConfig) -> AppResult<Self> {
        if !config.secret_key.starts_with("sk_") && !config.secret_key.starts_with("rk_") {
            return Err(AppError::ConfigError(
                "Stripe secret key must start with sk_ or rk_".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(config.secret_key.clone()),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeService {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> AppResult<CreatedCheckoutSession> {
        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);
        params.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            quantity: Some(1),
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency: Currency::EUR,
                unit_amount: Some(request.unit_amount),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: request.product_name.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);

        // Stripe rejects `discounts` together with `allow_promotion_codes`
        match &request.coupon_id {
            Some(coupon) => {
                params.discounts = Some(vec![CreateCheckoutSessionDiscounts {
                    coupon: Some(coupon.clone()),
                    ..Default::default()
                }]);
            }
            None => params.allow_promotion_codes = Some(true),
        }

        let session = CheckoutSession::create(&self.client, params).await?;

        let url = session.url.ok_or_else(|| {
            AppError::ExternalApiError("Stripe returned a checkout session without URL".into())
        })?;

        Ok(CreatedCheckoutSession {
            id: session.id.to_string(),
            url,
        })
    }

    async fn create_coupon(&self, coupon: NewCoupon) -> AppResult<String> {
        let mut params = CreateCoupon::new();
        params.id = Some(&coupon.id);
        params.name = Some(&coupon.id);
        params.percent_off = Some(f64::from(coupon.percent_off));
        params.duration = Some(CouponDuration::Once);
        params.redeem_by = Some(coupon.redeem_by.timestamp());

        let created = Coupon::create(&self.client, params).await?;
        Ok(created.id.to_string())
    }

    async fn delete_coupon(&self, coupon_id: &str) -> AppResult<()> {
        let id = coupon_id
            .parse::<CouponId>()
            .map_err(|e| AppError::ValidationError(format!("Invalid coupon id: {e}")))?;
        Coupon::delete(&self.client, &id).await?;
        Ok(())
    }
}
