use std::env;

use thiserror::Error;

use crate::infrastructure::stripe::DEFAULT_API_BASE;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0} must be set")]
    Missing(&'static str),
    #[error("Invalid configuration: {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
    pub currency: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                key: "PORT",
                reason: format!("'{raw}' is not a valid port: {e}"),
            })?,
            None => 8080,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_api_base: get("STRIPE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            currency: get("PAYMENT_CURRENCY")
                .unwrap_or_else(|| "usd".to_string())
                .to_lowercase(),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
        })
    }
}
