use serde::{Deserialize, Serialize};

/// Seven days of sampled prices, oldest first.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Sparkline {
    #[serde(default)]
    pub price: Vec<f64>,
}

/// One row of a markets snapshot.
///
/// Field names follow the upstream markets payload. Any numeric field may be
/// null for thinly traded assets.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MarketTicker {
    pub id: String,
    pub symbol: String,
    pub name: String,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub current_price: Option<f64>,

    #[serde(default)]
    pub market_cap: Option<f64>,

    #[serde(default)]
    pub market_cap_rank: Option<u32>,

    #[serde(default)]
    pub total_volume: Option<f64>,

    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,

    #[serde(default)]
    pub price_change_percentage_7d_in_currency: Option<f64>,

    #[serde(default)]
    pub sparkline_in_7d: Option<Sparkline>,
}

impl MarketTicker {
    /// A ticker with only identity and price set.
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        current_price: Option<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
            image: None,
            current_price,
            market_cap: None,
            market_cap_rank: None,
            total_volume: None,
            price_change_percentage_24h: None,
            price_change_percentage_7d_in_currency: None,
            sparkline_in_7d: None,
        }
    }

    /// The current price if it is usable as a history point.
    pub fn usable_price(&self) -> Option<f64> {
        self.current_price.filter(|p| p.is_finite())
    }
}
