use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::checkout_service::CheckoutService;
use crate::domain::cart::CartLineItem;
use crate::domain::pricing;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartLineItemRequest {
    /// `<productUUID>`, `<productUUID>-<option>` or a free-form id for custom items
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Client-declared unit price; only used when the item is not in the catalog
    #[serde(deserialize_with = "decimal_from_number_or_string")]
    #[schema(value_type = f64, example = 25.0)]
    pub price: BigDecimal,
    pub quantity: u32,
}

impl From<CartLineItemRequest> for CartLineItem {
    fn from(item: CartLineItemRequest) -> Self {
        CartLineItem {
            id: item.id,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentIntentRequest {
    #[serde(default)]
    pub items: Vec<CartLineItemRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Parse prices through their decimal text so `19.99` stays `19.99`.
fn decimal_from_number_or_string<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => {
            pricing::parse_price(&n.to_string()).map_err(de::Error::custom)
        }
        serde_json::Value::String(s) => pricing::parse_price(&s).map_err(de::Error::custom),
        other => Err(de::Error::custom(format!(
            "expected a numeric price, got {other}"
        ))),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/payment
///
/// Re-prices the cart against the catalog and creates a payment intent for
/// the trusted total. Items whose id does not resolve to a catalog product are
/// charged at the client-declared price.
#[utoipa::path(
    post,
    path = "/api/payment",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 200, description = "Payment intent created", body = CreatePaymentIntentResponse),
        (status = 500, description = "Configuration, catalog or payment provider failure", body = ErrorResponse),
    ),
    tag = "payment"
)]
pub async fn create_payment_intent(
    checkout: web::Data<CheckoutService>,
    body: web::Json<CreatePaymentIntentRequest>,
) -> Result<HttpResponse, AppError> {
    let items: Vec<CartLineItem> = body
        .into_inner()
        .items
        .into_iter()
        .map(CartLineItem::from)
        .collect();

    let intent = checkout.create_payment_intent(items).await?;

    Ok(HttpResponse::Ok().json(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}
