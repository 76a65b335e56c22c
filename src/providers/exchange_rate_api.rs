use crate::core::currency::{Currency, ExchangeRateTable, RateSource};
use crate::core::error::RateFetchError;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Live rates from an exchangerate-api.com compatible endpoint.
pub struct ExchangeRateApiProvider {
    base_url: String,
    timeout: Duration,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn classify(&self, err: reqwest::Error) -> RateFetchError {
        if err.is_timeout() {
            RateFetchError::Timeout(self.timeout)
        } else {
            RateFetchError::from(err)
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl RateSource for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<ExchangeRateTable, RateFetchError> {
        let url = format!("{}/v4/latest/{}", self.base_url, Currency::BASE.code());
        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("xpense/1.0")
            .timeout(self.timeout)
            .build()
            .map_err(|e| RateFetchError::Network(e.to_string()))?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(RateFetchError::Status(response.status().as_u16()));
        }

        let text = response.text().await.map_err(|e| self.classify(e))?;
        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| RateFetchError::Malformed(format!("Failed to parse JSON response: {e}")))?;

        ExchangeRateTable::from_quotes(&data.rates)
    }
}
