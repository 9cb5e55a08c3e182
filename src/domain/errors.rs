use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database Error: {0}")]
    CatalogQueryFailed(String),
    #[error("Payment provider error: {0}")]
    PaymentProvider(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
