use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::Theme;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Admin-Key"))),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::checkout::create_checkout_session,
        handlers::page::save_page_data,
        handlers::page::show_page,
        handlers::discount_code::validate_discount,
        handlers::admin::create_discount,
        handlers::webhook::stripe_webhook,
    ),
    components(
        schemas(
            Plan,
            Theme,
            PageData,
            CreateCheckoutRequest,
            CreateCheckoutResponse,
            SavePageDataRequest,
            ValidateDiscountRequest,
            ValidateDiscountResponse,
            CreateDiscountRequest,
            CreateDiscountResponse,
            CouponSummary,
            SuccessResponse,
            WebhookAck,
            ErrorResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "checkout", description = "Hosted checkout API"),
        (name = "page", description = "Page drafts and rendered pages"),
        (name = "discount", description = "Discount code API"),
        (name = "admin", description = "Administrative API"),
        (name = "webhook", description = "Stripe webhook"),
    ),
    info(
        title = "Love Page Backend API",
        version = "1.0.0",
        description = "Personalized anniversary pages: checkout, drafts, fulfillment and rendering"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
