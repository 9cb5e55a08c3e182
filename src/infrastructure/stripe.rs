//! Payment intents over the Stripe REST API.
//!
//! Stripe takes form-encoded bodies with bracketed keys for nested fields,
//! e.g. `automatic_payment_methods[enabled]=true`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::ConfigError;
use crate::domain::errors::DomainError;
use crate::domain::payment::{PaymentIntent, PaymentIntentRequest};
use crate::domain::ports::PaymentGateway;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
    code: Option<String>,
}

pub struct StripeGateway {
    http: Client,
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(secret_key: &str, api_base: &str) -> Result<Self, ConfigError> {
        if secret_key.trim().is_empty() {
            return Err(ConfigError::Missing("STRIPE_SECRET_KEY"));
        }
        Ok(Self {
            http: Client::new(),
            secret_key: secret_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn form_fields(request: &PaymentIntentRequest) -> Vec<(String, String)> {
        let mut fields = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.clone()),
            (
                "automatic_payment_methods[enabled]".to_string(),
                request.automatic_payment_methods.to_string(),
            ),
        ];
        fields.extend(
            request
                .metadata
                .iter()
                .map(|(k, v)| (format!("metadata[{k}]"), v.clone())),
        );
        fields
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, DomainError> {
        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&Self::form_fields(&request))
            .send()
            .await
            .map_err(|e| DomainError::PaymentProvider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<StripeErrorEnvelope>().await {
                Ok(StripeErrorEnvelope {
                    error: StripeErrorBody {
                        message: Some(message),
                        ..
                    },
                }) => message,
                Ok(StripeErrorEnvelope {
                    error: StripeErrorBody {
                        code: Some(code), ..
                    },
                }) => code,
                _ => format!("payment intent request failed with status {status}"),
            };
            return Err(DomainError::PaymentProvider(message));
        }

        let intent: StripePaymentIntent = response
            .json()
            .await
            .map_err(|e| DomainError::PaymentProvider(e.to_string()))?;
        let client_secret = intent.client_secret.ok_or_else(|| {
            DomainError::PaymentProvider(format!(
                "payment intent {} has no client secret",
                intent.id
            ))
        })?;

        Ok(PaymentIntent {
            id: intent.id,
            client_secret,
        })
    }
}
