use crate::models::*;
use crate::services::CheckoutService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/create-checkout-session",
    tag = "checkout",
    request_body = CreateCheckoutRequest,
    responses(
        (status = 200, description = "Checkout session created", body = CreateCheckoutResponse),
        (status = 400, description = "Invalid plan or page data", body = ErrorResponse),
        (status = 502, description = "Payment processor error", body = ErrorResponse)
    )
)]
pub async fn create_checkout_session(
    checkout_service: web::Data<CheckoutService>,
    request: web::Json<CreateCheckoutRequest>,
) -> Result<HttpResponse> {
    match checkout_service
        .create_checkout_session(request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn checkout_config(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/create-checkout-session",
        web::post().to(create_checkout_session),
    );
}
