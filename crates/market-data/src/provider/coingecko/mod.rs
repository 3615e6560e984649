//! CoinGecko market data provider.
//!
//! Uses the public `/coins/markets` endpoint, which returns price, market cap,
//! volume, 24h/7d change and a 7 day sparkline for a list of coin ids in one
//! call. No API key is required for the public tier.
//!
//! API documentation: https://docs.coingecko.com/reference/coins-markets

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::MarketTicker;
use crate::provider::MarketDataProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PROVIDER_ID: &str = "COINGECKO";
const QUOTE_CURRENCY: &str = "usd";

// ============================================================================
// API Response Structures
// ============================================================================

/// Error body. CoinGecko uses either `{"error": ".."}` or
/// `{"status": {"error_code": .., "error_message": ".."}}`.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
    status: Option<ErrorStatus>,
}

#[derive(Debug, Deserialize)]
struct ErrorStatus {
    error_message: Option<String>,
}

impl ErrorResponse {
    fn message(self) -> Option<String> {
        self.error
            .or_else(|| self.status.and_then(|s| s.error_message))
    }
}

// ============================================================================
// CoinGeckoProvider
// ============================================================================

pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    /// Create a provider against `base_url` (no trailing slash needed) whose
    /// requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cointrail/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MarketDataError::ClientSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn markets_url(&self) -> String {
        format!("{}/coins/markets", self.base_url)
    }

    /// Query parameters for a markets request covering `asset_ids`.
    fn markets_query(asset_ids: &[String]) -> Vec<(&'static str, String)> {
        vec![
            ("vs_currency", QUOTE_CURRENCY.to_string()),
            ("ids", asset_ids.join(",")),
            ("order", "market_cap_desc".to_string()),
            ("per_page", asset_ids.len().to_string()),
            ("page", "1".to_string()),
            ("sparkline", "true".to_string()),
            ("price_change_percentage", "24h,7d".to_string()),
        ]
    }

    async fn fetch(&self, query: &[(&'static str, String)]) -> Result<String, MarketDataError> {
        let url = self.markets_url();
        debug!("CoinGecko request: {} with {} params", url, query.len());

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        response.text().await.map_err(request_error)
    }
}

fn request_error(e: reqwest::Error) -> MarketDataError {
    if e.is_timeout() {
        MarketDataError::Timeout {
            provider: PROVIDER_ID.to_string(),
        }
    } else {
        MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Request failed: {}", e),
        }
    }
}

/// Maps a non-success status (and its body) to an error.
fn status_error(status: StatusCode, body: &str) -> MarketDataError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return MarketDataError::RateLimited {
            provider: PROVIDER_ID.to_string(),
        };
    }

    if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::GATEWAY_TIMEOUT {
        return MarketDataError::Timeout {
            provider: PROVIDER_ID.to_string(),
        };
    }

    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(ErrorResponse::message)
        .unwrap_or_else(|| format!("HTTP {} - {}", status, body));

    MarketDataError::ProviderError {
        provider: PROVIDER_ID.to_string(),
        message,
    }
}

/// Parses a markets payload. Rows without an id are dropped.
fn parse_markets(body: &str) -> Result<Vec<MarketTicker>, MarketDataError> {
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| MarketDataError::InvalidResponse {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse markets response: {}", e),
        })?;

    let mut tickers = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::from_value::<MarketTicker>(row) {
            Ok(ticker) => tickers.push(ticker),
            Err(e) => warn!("Skipping malformed CoinGecko row: {}", e),
        }
    }
    Ok(tickers)
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_market_snapshot(
        &self,
        asset_ids: &[String],
    ) -> Result<Vec<MarketTicker>, MarketDataError> {
        if asset_ids.is_empty() {
            return Ok(Vec::new());
        }

        let body = self.fetch(&Self::markets_query(asset_ids)).await?;
        let tickers = parse_markets(&body)?;
        debug!(
            "CoinGecko returned {} of {} requested assets",
            tickers.len(),
            asset_ids.len()
        );
        Ok(tickers)
    }
}
