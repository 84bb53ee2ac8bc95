use crate::error::AppError;
use crate::models::*;
use crate::services::PageService;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/save-page-data",
    tag = "page",
    request_body = SavePageDataRequest,
    responses(
        (status = 200, description = "Draft saved", body = SuccessResponse),
        (status = 400, description = "Missing session id or page data", body = ErrorResponse)
    )
)]
pub async fn save_page_data(
    page_service: web::Data<PageService>,
    request: web::Json<SavePageDataRequest>,
) -> Result<HttpResponse> {
    match page_service.save_draft(request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(SuccessResponse::ok())),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/pagina-criada/{session_id}",
    tag = "page",
    params(
        ("session_id" = String, Path, description = "Checkout session id")
    ),
    responses(
        (status = 200, description = "Rendered page", body = String, content_type = "text/html"),
        (status = 404, description = "Unknown session"),
        (status = 500, description = "Stored page is incomplete")
    )
)]
pub async fn show_page(
    page_service: web::Data<PageService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let session_id = path.into_inner();

    // 页面路由返回纯文本错误，而不是 JSON
    match page_service.render(&session_id).await {
        Ok(html) => Ok(HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(html)),
        Err(AppError::NotFound(_)) => Ok(HttpResponse::NotFound()
            .content_type(ContentType::plaintext())
            .body("Página não encontrada")),
        Err(AppError::IncompleteData(msg)) => {
            log::error!("Cannot render page {session_id}: {msg}");
            Ok(HttpResponse::InternalServerError()
                .content_type(ContentType::plaintext())
                .body("incomplete page data"))
        }
        Err(e) => {
            log::error!("Failed to render page {session_id}: {e}");
            Ok(HttpResponse::InternalServerError()
                .content_type(ContentType::plaintext())
                .body("Erro ao carregar a página"))
        }
    }
}

pub fn page_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/save-page-data", web::post().to(save_page_data))
        .route("/pagina-criada/{session_id}", web::get().to(show_page));
}
