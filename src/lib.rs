pub mod config;
pub mod database;
pub mod entities;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod swagger;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};

use actix_web::web;
use external::WebhookVerifier;
use services::{CheckoutService, DiscountCodeService, FulfillmentService, PageService};

/// Every service handed to the HTTP layer
#[derive(Clone)]
pub struct AppServices {
    pub checkout: CheckoutService,
    pub pages: PageService,
    pub discounts: DiscountCodeService,
    pub fulfillment: FulfillmentService,
    pub webhook_verifier: WebhookVerifier,
}

/// Registers services and routes; shared by `main` and the integration tests
pub fn configure_app(
    services: AppServices,
    json_limit_bytes: usize,
    admin_api_key: String,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(handlers::json_config(json_limit_bytes))
            .app_data(web::Data::new(services.checkout))
            .app_data(web::Data::new(services.pages))
            .app_data(web::Data::new(services.discounts))
            .app_data(web::Data::new(services.fulfillment))
            .app_data(web::Data::new(services.webhook_verifier))
            .configure(swagger::swagger_config)
            .configure(handlers::webhook_config)
            .configure(handlers::checkout_config)
            .configure(handlers::page_config)
            .configure(handlers::discount_code_config)
            .configure(handlers::admin_config(admin_api_key));
    }
}
