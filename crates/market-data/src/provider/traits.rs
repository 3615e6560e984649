//! Market data provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::MarketTicker;

/// Trait for market data providers.
///
/// Implement this trait to add support for a new market data source. The
/// server's poller holds one provider and asks it for a snapshot each cycle.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "COINGECKO".
    ///
    /// Used for logging and error messages.
    fn id(&self) -> &'static str;

    /// Fetch the current market snapshot for `asset_ids`.
    ///
    /// Ids the provider does not know are silently absent from the result.
    /// Rows are returned in the provider's order (market cap descending for
    /// CoinGecko).
    async fn get_market_snapshot(
        &self,
        asset_ids: &[String],
    ) -> Result<Vec<MarketTicker>, MarketDataError>;
}
