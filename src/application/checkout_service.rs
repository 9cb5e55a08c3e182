use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::cart::{CartLineItem, CatalogPrice, PricedCart};
use crate::domain::errors::DomainError;
use crate::domain::payment::{PaymentIntent, PaymentIntentRequest, ITEM_IDS_METADATA_KEY};
use crate::domain::ports::{PaymentGateway, ProductCatalog};
use crate::domain::pricing;

pub struct CheckoutService {
    catalog: Arc<dyn ProductCatalog>,
    payments: Arc<dyn PaymentGateway>,
    currency: String,
}

impl CheckoutService {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        payments: Arc<dyn PaymentGateway>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            payments,
            currency: currency.into(),
        }
    }

    /// Re-price the cart against the catalog and open a payment intent for
    /// the trusted amount.
    pub async fn create_payment_intent(
        &self,
        items: Vec<CartLineItem>,
    ) -> Result<PaymentIntent, DomainError> {
        if let Some(bad) = items.iter().find(|i| i.quantity == 0) {
            return Err(DomainError::InvalidInput(format!(
                "quantity for item '{}' must be at least 1",
                bad.id
            )));
        }

        let priced = self.reprice(&items).await?;
        for line in priced.fallback_lines() {
            match line.product_id {
                Some(product_id) => log::warn!(
                    "Item '{}' names unknown product {}, charging client price {}",
                    line.item_id,
                    product_id,
                    line.unit_price
                ),
                None => log::warn!(
                    "Custom item '{}' charged at client price {}",
                    line.item_id,
                    line.unit_price
                ),
            }
        }

        let amount = pricing::to_minor_units(&priced.total).ok_or_else(|| {
            DomainError::InvalidInput(format!("cart total {} is out of range", priced.total))
        })?;
        if amount < 0 {
            return Err(DomainError::InvalidInput(format!(
                "cart total {} must not be negative",
                priced.total
            )));
        }

        let item_ids = items
            .iter()
            .map(|i| i.id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let request = PaymentIntentRequest {
            amount,
            currency: self.currency.clone(),
            automatic_payment_methods: true,
            metadata: BTreeMap::from([(ITEM_IDS_METADATA_KEY.to_string(), item_ids)]),
        };

        let intent = self
            .payments
            .create_payment_intent(request)
            .await
            .inspect_err(|e| log::error!("Payment intent creation failed: {}", e))?;

        log::info!(
            "Created payment intent {} for {} {} ({} items)",
            intent.id,
            amount,
            self.currency,
            items.len()
        );
        Ok(intent)
    }

    async fn reprice(&self, items: &[CartLineItem]) -> Result<PricedCart, DomainError> {
        let ids = pricing::lookup_ids(items);
        let catalog_prices: Vec<CatalogPrice> = if ids.is_empty() {
            Vec::new()
        } else {
            let catalog = Arc::clone(&self.catalog);
            tokio::task::spawn_blocking(move || catalog.find_prices(&ids))
                .await
                .map_err(|e| DomainError::Internal(e.to_string()))?
                .inspect_err(|e| log::error!("Catalog price lookup failed: {}", e))?
        };

        Ok(pricing::price_cart(items, &catalog_prices))
    }
}
