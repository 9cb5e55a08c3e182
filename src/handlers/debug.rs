use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::diagnostics_service::{CatalogSnapshot, DiagnosticsService};
use crate::domain::catalog::{CategoryRecord, ProductRecord};

const SAMPLE_ROWS: i64 = 10;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Decimal price as a string, e.g. "12.50"
    pub base_price: String,
    pub category_id: Option<Uuid>,
    pub created_at: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(p: ProductRecord) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            base_price: p.base_price.to_string(),
            category_id: p.category_id,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: String,
}

impl From<CategoryRecord> for CategoryResponse {
    fn from(c: CategoryRecord) -> Self {
        CategoryResponse {
            id: c.id,
            name: c.name,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebugDbResponse {
    pub success: bool,
    pub products: Option<Vec<ProductResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_error: Option<String>,
    pub categories: Option<Vec<CategoryResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories_error: Option<String>,
}

impl From<CatalogSnapshot> for DebugDbResponse {
    fn from(snapshot: CatalogSnapshot) -> Self {
        let (products, products_error) = match snapshot.products {
            Ok(rows) => (Some(rows.into_iter().map(Into::into).collect()), None),
            Err(e) => (None, Some(e.to_string())),
        };
        let (categories, categories_error) = match snapshot.categories {
            Ok(rows) => (Some(rows.into_iter().map(Into::into).collect()), None),
            Err(e) => (None, Some(e.to_string())),
        };

        DebugDbResponse {
            success: true,
            products,
            products_error,
            categories,
            categories_error,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DebugDbFailure {
    pub success: bool,
    pub error: String,
}

/// GET /api/debug-db
///
/// Returns up to ten rows from `products` and `categories`. Query errors are
/// reported inside the body; this endpoint never answers with an error status.
#[utoipa::path(
    get,
    path = "/api/debug-db",
    responses(
        (status = 200, description = "Sample catalog rows and any per-table errors", body = DebugDbResponse),
    ),
    tag = "debug"
)]
pub async fn debug_db(diagnostics: web::Data<DiagnosticsService>) -> HttpResponse {
    match diagnostics.snapshot(SAMPLE_ROWS).await {
        Ok(snapshot) => HttpResponse::Ok().json(DebugDbResponse::from(snapshot)),
        Err(e) => {
            log::error!("Catalog snapshot failed: {}", e);
            HttpResponse::Ok().json(DebugDbFailure {
                success: false,
                error: e.to_string(),
            })
        }
    }
}
