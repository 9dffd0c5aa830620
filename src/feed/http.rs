//! HTTP quote endpoint source
//!
//! Polls a JSON market-data endpoint and pulls the quoted price out of the
//! response body with a JSON pointer.

use super::{HistoryRange, PriceObservation, PriceSource, SourceError};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Configuration for the HTTP source
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Quote URL; `{symbol}` is replaced with the requested symbol
    pub url: String,
    /// JSON pointer to the price inside the response body
    pub price_pointer: String,
    /// Bearer token sent with every request
    pub token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            price_pointer: "/output/stck_prpr".to_string(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Market-data source over a JSON quote endpoint
pub struct HttpPriceSource {
    config: HttpSourceConfig,
    client: Client,
}

impl HttpPriceSource {
    /// Create a new HTTP source
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Request(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// URL for a symbol
    pub fn quote_url(&self, symbol: &str) -> String {
        self.config.url.replace("{symbol}", symbol)
    }
}

/// Extract the price text at `pointer` from a JSON body
///
/// String and number values are both accepted; numbers keep their JSON text.
pub fn extract_price(body: &Value, pointer: &str) -> Result<String, SourceError> {
    match body.pointer(pointer) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(other) => Err(SourceError::Response(format!(
            "price at {} is not a string or number: {}",
            pointer, other
        ))),
        None => Err(SourceError::Response(format!("no price at {}", pointer))),
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch_price(&self, symbol: &str) -> Result<PriceObservation, SourceError> {
        let url = self.quote_url(symbol);
        tracing::debug!(url = %url, "Fetching quote");

        let mut request = self.client.get(&url);
        if let Some(ref token) = self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Request(format!("HTTP {} from {}", status, url)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SourceError::Response(e.to_string()))?;

        let price = extract_price(&body, &self.config.price_pointer)?;
        Ok(PriceObservation::new(symbol, price, Utc::now()))
    }

    async fn fetch_history(
        &self,
        _symbol: &str,
        _range: HistoryRange,
    ) -> Result<Vec<PriceObservation>, SourceError> {
        Err(SourceError::Unsupported("history"))
    }
}
