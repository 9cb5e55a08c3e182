use async_trait::async_trait;
use uuid::Uuid;

use super::cart::CatalogPrice;
use super::catalog::{CategoryRecord, ProductRecord};
use super::errors::DomainError;
use super::payment::{PaymentIntent, PaymentIntentRequest};

/// Read-only access to the product catalog. Implementations may block.
#[cfg_attr(test, mockall::automock)]
pub trait ProductCatalog: Send + Sync + 'static {
    fn find_prices(&self, ids: &[Uuid]) -> Result<Vec<CatalogPrice>, DomainError>;
    fn sample_products(&self, limit: i64) -> Result<Vec<ProductRecord>, DomainError>;
    fn sample_categories(&self, limit: i64) -> Result<Vec<CategoryRecord>, DomainError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, DomainError>;
}
