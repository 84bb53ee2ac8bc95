use crate::models::*;
use crate::services::DiscountCodeService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/validate-discount",
    tag = "discount",
    request_body = ValidateDiscountRequest,
    responses(
        (status = 200, description = "Validation result; unknown or expired codes are `valid: false`", body = ValidateDiscountResponse)
    )
)]
pub async fn validate_discount(
    discount_service: web::Data<DiscountCodeService>,
    request: web::Json<ValidateDiscountRequest>,
) -> Result<HttpResponse> {
    match discount_service.validate(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn discount_code_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/validate-discount", web::post().to(validate_discount));
}
