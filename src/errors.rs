use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// Every failure leaves the API as `500 { "error": <message> }`; the storefront
/// checkout is the only client and shows the message as-is.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database Error: {0}")]
    Database(String),

    #[error("Payment provider error: {0}")]
    PaymentProvider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidInput(msg) => AppError::BadRequest(msg),
            DomainError::CatalogQueryFailed(msg) => AppError::Database(msg),
            DomainError::PaymentProvider(msg) => AppError::PaymentProvider(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}
