use crate::error::AppError;
use crate::external::WebhookVerifier;
use crate::external::stripe_webhook::SIGNATURE_HEADER;
use crate::models::{ErrorResponse, WebhookAck};
use crate::services::FulfillmentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use log::{error, info, warn};

/// Stripe webhook处理器
///
/// 签名校验通过后才会读取草稿或发送邮件。处理失败时返回非 2xx，让 Stripe 重新投递。
#[utoipa::path(
    post,
    path = "/webhook",
    tag = "webhook",
    request_body(content = String, description = "Raw Stripe event payload", content_type = "application/json"),
    params(
        ("Stripe-Signature" = String, Header, description = "Stripe signature header")
    ),
    responses(
        (status = 200, description = "Event accepted", body = WebhookAck),
        (status = 400, description = "Bad signature, malformed event or no customer email", body = ErrorResponse),
        (status = 404, description = "No draft for the session yet", body = ErrorResponse),
        (status = 502, description = "Email delivery failed", body = ErrorResponse)
    )
)]
pub async fn stripe_webhook(
    req: HttpRequest,
    body: web::Bytes,
    verifier: web::Data<WebhookVerifier>,
    fulfillment_service: web::Data<FulfillmentService>,
) -> Result<HttpResponse> {
    let Some(signature) = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        warn!("Missing Stripe-Signature header");
        return Ok(
            AppError::SignatureError("Missing Stripe-Signature header".to_string())
                .error_response(),
        );
    };

    let event = match verifier.construct_event(&body, signature) {
        Ok(event) => event,
        Err(e) => return Ok(e.error_response()),
    };

    info!("Received Stripe webhook event: {} ({})", event.event_type, event.id);

    match fulfillment_service.handle_event(&event).await {
        Ok(()) => Ok(HttpResponse::Ok().json(WebhookAck { received: true })),
        Err(e) => {
            error!("Failed to process webhook event {}: {e}", event.id);
            Ok(e.error_response())
        }
    }
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/webhook", web::post().to(stripe_webhook));
}
