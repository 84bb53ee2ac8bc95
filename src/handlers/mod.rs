pub mod admin;
pub mod checkout;
pub mod discount_code;
pub mod page;
pub mod webhook;

pub use admin::admin_config;
pub use checkout::checkout_config;
pub use discount_code::discount_code_config;
pub use page::page_config;
pub use webhook::webhook_config;

use crate::error::AppError;
use actix_web::{ResponseError, web};

/// JSON extractor settings shared by every JSON endpoint; body errors become `VALIDATION_ERROR`
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let app_error = AppError::ValidationError(format!("Invalid JSON body: {err}"));
            let response = app_error.error_response();
            actix_web::error::InternalError::from_response(err, response).into()
        })
}
