use crate::database::PageStore;
use crate::error::{AppError, AppResult};
use crate::external::{CheckoutSessionRequest, PaymentGateway};
use crate::models::*;
use crate::services::discount_code_service::DiscountCodeService;
use crate::services::page_service::normalize_page;
use std::sync::Arc;

#[derive(Clone)]
pub struct CheckoutService {
    pages: Arc<dyn PageStore>,
    gateway: Arc<dyn PaymentGateway>,
    discounts: DiscountCodeService,
    base_url: String,
}

impl CheckoutService {
    pub fn new(
        pages: Arc<dyn PageStore>,
        gateway: Arc<dyn PaymentGateway>,
        discounts: DiscountCodeService,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            pages,
            gateway,
            discounts,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates the hosted checkout session and stores the draft under its id
    pub async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> AppResult<CreateCheckoutResponse> {
        let plan = request.plan;
        let page = request
            .page_data
            .ok_or_else(|| AppError::ValidationError("Dados da página ausentes ou inválidos.".to_string()))?;
        check_plan_limits(plan, &page)?;
        let page = normalize_page(page);

        // 无效优惠码不报错，按原价结算
        let coupon_id = match request.discount_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => match self.discounts.find_redeemable(code).await? {
                Some(discount) => {
                    log::info!("Applying discount code {} ({}% off)", discount.code, discount.percent_off);
                    Some(discount.stripe_coupon_id)
                }
                None => {
                    log::warn!("Ignoring invalid or expired discount code {code}");
                    None
                }
            },
            _ => None,
        };

        let session = self
            .gateway
            .create_checkout_session(CheckoutSessionRequest {
                product_name: plan.product_name().to_string(),
                unit_amount: plan.price_cents(),
                success_url: format!("{}/success.html", self.base_url),
                cancel_url: format!("{}/cancel.html", self.base_url),
                coupon_id,
            })
            .await?;

        self.pages.upsert(&session.id, &page).await?;
        log::info!("Checkout session {} created for plan {plan}", session.id);

        Ok(CreateCheckoutResponse {
            id: session.id,
            url: session.url,
        })
    }
}

/// Content limits per plan; checked before anything external is touched
pub fn check_plan_limits(plan: Plan, page: &PageData) -> AppResult<()> {
    if page.couple_names().is_none() {
        return Err(AppError::ValidationError(
            "Dados da página ausentes ou inválidos.".to_string(),
        ));
    }
    if page.images.len() > plan.max_images() {
        return Err(AppError::ValidationError(format!(
            "Plan {plan} allows at most {} photos",
            plan.max_images()
        )));
    }
    let has_video = page
        .video_url
        .as_deref()
        .is_some_and(|v| !v.trim().is_empty());
    if has_video && !plan.allows_video() {
        return Err(AppError::ValidationError(format!(
            "Plan {plan} does not include a video"
        )));
    }
    Ok(())
}
