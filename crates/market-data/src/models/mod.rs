//! Market data models

mod ticker;

pub use ticker::{MarketTicker, Sparkline};
