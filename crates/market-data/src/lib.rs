//! Cointrail Market Data Crate
//!
//! Fetches live market snapshots for the tracked crypto assets.
//!
//! ```text
//! poller ──► MarketDataProvider ──► CoinGeckoProvider ──► /coins/markets
//!                     │
//!                     ▼
//!              Vec<MarketTicker>
//! ```
//!
//! # Core Types
//!
//! - [`MarketDataProvider`] - provider trait
//! - [`MarketTicker`] - one asset's price, market cap, volume and changes
//! - [`MarketDataError`] - provider failures

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::MarketDataError;
pub use models::{MarketTicker, Sparkline};
pub use provider::coingecko::CoinGeckoProvider;
pub use provider::MarketDataProvider;
