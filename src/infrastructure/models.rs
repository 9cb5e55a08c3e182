use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::cart::CatalogPrice;
use crate::domain::catalog::{CategoryRecord, ProductRecord};
use crate::schema::{categories, products};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductPriceRow {
    pub id: Uuid,
    pub base_price: BigDecimal,
    pub name: String,
}

impl From<ProductPriceRow> for CatalogPrice {
    fn from(row: ProductPriceRow) -> Self {
        CatalogPrice {
            id: row.id,
            name: row.name,
            base_price: row.base_price,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub base_price: BigDecimal,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        ProductRecord {
            id: row.id,
            name: row.name,
            description: row.description,
            base_price: row.base_price,
            category_id: row.category_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub base_price: BigDecimal,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<CategoryRow> for CategoryRecord {
    fn from(row: CategoryRow) -> Self {
        CategoryRecord {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = categories)]
pub struct NewCategoryRow {
    pub id: Uuid,
    pub name: String,
}
