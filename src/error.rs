use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Webhook signature error: {0}")]
    SignatureError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Incomplete data: {0}")]
    IncompleteData(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Stripe error: {0}")]
    StripeError(#[from] stripe::StripeError),

    #[error("Email error: {0}")]
    EmailError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Template error: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl From<lettre::transport::smtp::Error> for AppError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        AppError::EmailError(err.to_string())
    }
}

impl From<lettre::error::Error> for AppError {
    fn from(err: lettre::error::Error) -> Self {
        AppError::EmailError(err.to_string())
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::SignatureError(_) => "INVALID_SIGNATURE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::IncompleteData(_) => "INCOMPLETE_DATA",
            AppError::ExternalApiError(_) | AppError::StripeError(_) => "EXTERNAL_API_ERROR",
            AppError::EmailError(_) => "EMAIL_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            AppError::ValidationError(_) | AppError::SignatureError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExternalApiError(_) | AppError::StripeError(_) | AppError::EmailError(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                msg.clone()
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                msg.clone()
            }
            AppError::SignatureError(msg) => {
                log::warn!("Webhook signature rejected: {msg}");
                "Invalid signature".to_string()
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::IncompleteData(msg) => {
                log::error!("Incomplete data: {msg}");
                msg.clone()
            }
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                "External service error".to_string()
            }
            AppError::StripeError(err) => {
                log::error!("Stripe error: {err}");
                "Payment processor error".to_string()
            }
            AppError::EmailError(err) => {
                log::error!("Email error: {err}");
                "Email delivery failed".to_string()
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            _ => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::SignatureError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::IncompleteData("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::EmailError("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_incomplete_and_not_found_are_distinct() {
        assert_ne!(
            AppError::IncompleteData("x".into()).code(),
            AppError::NotFound("x".into()).code()
        );
    }
}
