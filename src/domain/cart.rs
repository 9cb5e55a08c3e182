use bigdecimal::BigDecimal;
use uuid::Uuid;

/// A cart line as submitted by the storefront. `price` is whatever the
/// client claims and is only trusted when the item is not in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    pub id: String,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: u32,
}

/// Authoritative price row returned by the catalog lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPrice {
    pub id: Uuid,
    pub name: String,
    pub base_price: BigDecimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Catalog,
    ClientDeclared,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub item_id: String,
    pub product_id: Option<Uuid>,
    pub unit_price: BigDecimal,
    pub quantity: u32,
    pub source: PriceSource,
}

impl PricedLine {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub total: BigDecimal,
}

impl PricedCart {
    pub fn fallback_lines(&self) -> impl Iterator<Item = &PricedLine> {
        self.lines
            .iter()
            .filter(|l| l.source == PriceSource::ClientDeclared)
    }
}
