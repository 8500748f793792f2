use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price_feed::{FeedError, PriceFeed};

const BASE_URL: &str = "https://finnhub.io/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct FinnhubClient {
    http: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl FinnhubClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Upper bound for one quote request, connect to last body byte.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub async fn quote(&self, symbol: &str) -> Result<QuoteResponse, String> {
        if !self.has_key() {
            return Err("FINNHUB_API_KEY is missing in .env".to_string());
        }

        let url = format!("{}/quote", self.base_url);
        let res = self
            .http
            .get(url)
            .query(&[("symbol", symbol), ("token", &self.api_key)])
            .timeout(self.timeout)
            .send()
            .await
            // the url carries the api token
            .map_err(|e| e.without_url().to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("Finnhub quote failed: {status} {body}"));
        }

        res.json::<QuoteResponse>()
            .await
            .map_err(|e| e.without_url().to_string())
    }
}

#[async_trait]
impl PriceFeed for FinnhubClient {
    async fn fetch_latest(&self, symbol: &str) -> Result<Decimal, FeedError> {
        let quote = self.quote(symbol).await.map_err(FeedError::Unavailable)?;
        quote_price(symbol, &quote)
    }
}

/// Finnhub answers unknown symbols with an all-zero quote instead of a 404.
pub fn quote_price(symbol: &str, quote: &QuoteResponse) -> Result<Decimal, FeedError> {
    if !quote.c.is_finite() || quote.c <= 0.0 {
        return Err(FeedError::NotFound(symbol.to_string()));
    }

    Decimal::from_f64_retain(quote.c)
        .map(|d| d.round_dp(4))
        .ok_or_else(|| FeedError::NotFound(symbol.to_string()))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuoteResponse {
    // current
    pub c: f64,
    // change
    #[serde(default)]
    pub d: Option<f64>,
    // percent change
    #[serde(default)]
    pub dp: Option<f64>,
    // high
    #[serde(default)]
    pub h: f64,
    // low
    #[serde(default)]
    pub l: f64,
    // open
    #[serde(default)]
    pub o: f64,
    // previous close
    #[serde(default)]
    pub pc: f64,
    // timestamp
    #[serde(default)]
    pub t: i64,
}
