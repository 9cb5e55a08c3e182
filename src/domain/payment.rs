use std::collections::BTreeMap;

/// Metadata key carrying the comma-joined cart item ids for reconciliation.
pub const ITEM_IDS_METADATA_KEY: &str = "item_ids";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    /// Amount in minor currency units (cents).
    pub amount: i64,
    pub currency: String,
    pub automatic_payment_methods: bool,
    pub metadata: BTreeMap<String, String>,
}

impl PaymentIntentRequest {
    pub fn item_ids(&self) -> Option<&str> {
        self.metadata.get(ITEM_IDS_METADATA_KEY).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}
