use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::QuoteError;

/// Where the poll loop gets current prices from.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// `Ok(None)` means the endpoint answered but had no price for `symbol`.
    async fn current_price(&self, symbol: &str) -> Result<Option<f64>, QuoteError>;
}

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct YahooQuoteClient {
    http: Client,
    base_url: String,
}

impl YahooQuoteClient {
    pub fn new(base_url: String) -> Self {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl QuoteSource for YahooQuoteClient {
    async fn current_price(&self, symbol: &str) -> Result<Option<f64>, QuoteError> {
        let url = format!("{}/v7/finance/quote", self.base_url);
        let res = self
            .http
            .get(url)
            .query(&[("symbols", symbol)])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(QuoteError::Status { status, body });
        }

        let body = res.text().await?;
        let parsed = serde_json::from_str::<QuoteEnvelope>(&body)?;
        Ok(parsed.first_price())
    }
}

#[derive(Debug, Deserialize)]
pub struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    pub quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
pub struct QuoteResponse {
    #[serde(default)]
    pub result: Vec<QuoteItem>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteItem {
    pub symbol: Option<String>,

    #[serde(rename = "regularMarketPrice")]
    pub regular_market_price: Option<f64>,
}

impl QuoteEnvelope {
    pub fn first_price(&self) -> Option<f64> {
        self.quote_response
            .result
            .first()
            .and_then(|q| q.regular_market_price)
            .filter(|p| p.is_finite())
    }
}
