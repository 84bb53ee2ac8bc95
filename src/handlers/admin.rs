use crate::error::AppError;
use crate::middlewares::AdminKeyMiddleware;
use crate::models::*;
use crate::services::DiscountCodeService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/admin/create-discount",
    tag = "admin",
    request_body(content = CreateDiscountRequest, description = "Overrides; an empty body creates FREE100 (100% off, until the end of the year)"),
    security(
        ("admin_key" = [])
    ),
    responses(
        (status = 200, description = "Coupon created in Stripe and stored", body = CreateDiscountResponse),
        (status = 400, description = "Invalid overrides or duplicate code", body = ErrorResponse),
        (status = 401, description = "Missing or wrong admin key", body = ErrorResponse),
        (status = 502, description = "Stripe error", body = ErrorResponse)
    )
)]
pub async fn create_discount(
    discount_service: web::Data<DiscountCodeService>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    // 空请求体使用默认优惠
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateDiscountRequest::default()
    } else {
        match serde_json::from_slice::<CreateDiscountRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                return Ok(AppError::ValidationError(format!("Invalid request body: {e}"))
                    .error_response());
            }
        }
    };

    match discount_service.create_discount(request).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

/// Admin routes, all behind the `X-Admin-Key` check
pub fn admin_config(api_key: String) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.service(
            web::scope("/admin")
                .wrap(AdminKeyMiddleware::new(api_key))
                .route("/create-discount", web::post().to(create_discount)),
        );
    }
}
