use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub base_price: BigDecimal,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
