use std::sync::Arc;

use crate::domain::catalog::{CategoryRecord, ProductRecord};
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductCatalog;

/// Raw view of the catalog tables. Each side keeps its own error so one
/// failing table does not hide the other.
#[derive(Debug)]
pub struct CatalogSnapshot {
    pub products: Result<Vec<ProductRecord>, DomainError>,
    pub categories: Result<Vec<CategoryRecord>, DomainError>,
}

pub struct DiagnosticsService {
    catalog: Arc<dyn ProductCatalog>,
}

impl DiagnosticsService {
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn snapshot(&self, limit: i64) -> Result<CatalogSnapshot, DomainError> {
        let products_catalog = Arc::clone(&self.catalog);
        let categories_catalog = Arc::clone(&self.catalog);

        let (products, categories) = tokio::join!(
            tokio::task::spawn_blocking(move || products_catalog.sample_products(limit)),
            tokio::task::spawn_blocking(move || categories_catalog.sample_categories(limit)),
        );

        Ok(CatalogSnapshot {
            products: products.map_err(|e| DomainError::Internal(e.to_string()))?,
            categories: categories.map_err(|e| DomainError::Internal(e.to_string()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::domain::ports::MockProductCatalog;

    fn category() -> CategoryRecord {
        CategoryRecord {
            id: Uuid::new_v4(),
            name: "Cakes".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn reads_both_tables_with_limit() {
        let mut catalog = MockProductCatalog::new();
        catalog
            .expect_sample_products()
            .once()
            .withf(|limit| *limit == 10)
            .returning(|_| Ok(vec![]));
        catalog
            .expect_sample_categories()
            .once()
            .withf(|limit| *limit == 10)
            .returning(|_| Ok(vec![category()]));

        let snapshot = DiagnosticsService::new(Arc::new(catalog))
            .snapshot(10)
            .await
            .expect("snapshot should succeed");

        assert!(snapshot.products.expect("products").is_empty());
        assert_eq!(snapshot.categories.expect("categories").len(), 1);
    }

    #[tokio::test]
    async fn one_table_failing_keeps_the_other() {
        let mut catalog = MockProductCatalog::new();
        catalog
            .expect_sample_products()
            .returning(|_| Err(DomainError::CatalogQueryFailed("relation does not exist".into())));
        catalog
            .expect_sample_categories()
            .returning(|_| Ok(vec![category()]));

        let snapshot = DiagnosticsService::new(Arc::new(catalog))
            .snapshot(10)
            .await
            .expect("snapshot should succeed");

        assert!(snapshot.products.is_err());
        assert!(snapshot.categories.is_ok());
    }
}
