//! In-memory dashboard state: the last market snapshot, the prices it
//! replaced, and the error banner. Nothing here is persisted.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use cointrail_market_data::MarketTicker;
use serde::Serialize;
use utoipa::ToSchema;

/// Movement of the current price against the previous snapshot.
#[derive(Serialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Unchanged,
}

/// No direction without a usable previous price; a previous price of zero
/// counts as missing.
pub fn price_direction(previous: Option<f64>, current: Option<f64>) -> Option<Direction> {
    let previous = previous.filter(|p| *p != 0.0 && p.is_finite())?;
    let current = current.filter(|c| c.is_finite())?;
    Some(if current > previous {
        Direction::Up
    } else if current < previous {
        Direction::Down
    } else {
        Direction::Unchanged
    })
}

/// `$1.23B`, `$4.56M`, otherwise a grouped dollar amount like `$12,345`.
pub fn format_compact_usd(value: f64) -> String {
    if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format_usd(value)
    }
}

/// Dollar amount with thousands separators and at most three decimals.
pub fn format_usd(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let negative = rounded < 0.0;
    let fixed = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}${}", sign, grouped)
    } else {
        format!("{}${}.{}", sign, grouped, frac_part)
    }
}

/// Two-decimal percentage; a missing value renders as `0.00%`.
pub fn format_percent(value: Option<f64>) -> String {
    format!("{:.2}%", value.unwrap_or(0.0))
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRow {
    pub rank: Option<u32>,
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: Option<String>,
    pub current_price: Option<f64>,
    pub price_label: String,
    pub direction: Option<Direction>,
    pub change_24h: Option<f64>,
    pub change_24h_label: String,
    pub change_7d: Option<f64>,
    pub change_7d_label: String,
    pub market_cap: Option<f64>,
    pub market_cap_label: String,
    pub total_volume: Option<f64>,
    pub volume_label: String,
    pub sparkline: Vec<f64>,
}

fn label(value: Option<f64>, format: fn(f64) -> String) -> String {
    value.map(format).unwrap_or_else(|| "-".to_string())
}

impl DashboardRow {
    fn build(ticker: &MarketTicker, previous: Option<f64>) -> Self {
        Self {
            rank: ticker.market_cap_rank,
            id: ticker.id.clone(),
            name: ticker.name.clone(),
            symbol: ticker.symbol.to_uppercase(),
            image: ticker.image.clone(),
            current_price: ticker.current_price,
            price_label: label(ticker.current_price, format_usd),
            direction: price_direction(previous, ticker.current_price),
            change_24h: ticker.price_change_percentage_24h,
            change_24h_label: format_percent(ticker.price_change_percentage_24h),
            change_7d: ticker.price_change_percentage_7d_in_currency,
            change_7d_label: format_percent(ticker.price_change_percentage_7d_in_currency),
            market_cap: ticker.market_cap,
            market_cap_label: label(ticker.market_cap, format_compact_usd),
            total_volume: ticker.total_volume,
            volume_label: label(ticker.total_volume, format_compact_usd),
            sparkline: ticker
                .sparkline_in_7d
                .as_ref()
                .map(|s| s.price.clone())
                .unwrap_or_default(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.symbol.to_lowercase().contains(needle)
    }
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub rows: Vec<DashboardRow>,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub is_refreshing: bool,
}

#[derive(Default)]
struct Snapshot {
    tickers: Vec<MarketTicker>,
    previous_prices: HashMap<String, f64>,
    last_error: Option<String>,
    last_updated: Option<DateTime<Utc>>,
    in_flight: usize,
}

#[derive(Default)]
pub struct DashboardState {
    inner: RwLock<Snapshot>,
}

pub struct RefreshGuard<'a> {
    state: &'a DashboardState,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        let mut snapshot = self.state.write();
        snapshot.in_flight = snapshot.in_flight.saturating_sub(1);
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Marks a refresh as in flight until the returned guard is dropped, so
    /// a cancelled refresh still clears the flag.
    pub fn begin_refresh(&self) -> RefreshGuard<'_> {
        self.write().in_flight += 1;
        RefreshGuard { state: self }
    }

    /// Replaces the rows. Prices of the rows being replaced become the
    /// comparison base for direction indicators; an empty snapshot leaves
    /// no base.
    pub fn apply_snapshot(&self, tickers: Vec<MarketTicker>, at: DateTime<Utc>) {
        let mut guard = self.write();
        let snapshot = &mut *guard;
        snapshot.previous_prices = snapshot
            .tickers
            .iter()
            .filter_map(|t| t.current_price.map(|p| (t.id.clone(), p)))
            .collect();
        snapshot.tickers = tickers;
        snapshot.last_error = None;
        snapshot.last_updated = Some(at);
    }

    /// Sets the error banner and keeps the last successful rows.
    pub fn record_failure(&self, message: impl Into<String>) {
        self.write().last_error = Some(message.into());
    }

    pub fn tickers(&self) -> Vec<MarketTicker> {
        self.read().tickers.clone()
    }

    /// Rows in snapshot order, filtered case-insensitively on name or symbol.
    pub fn view(&self, search: Option<&str>) -> DashboardView {
        let snapshot = self.read();
        let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();

        let rows = snapshot
            .tickers
            .iter()
            .map(|t| DashboardRow::build(t, snapshot.previous_prices.get(&t.id).copied()))
            .filter(|row| needle.is_empty() || row.matches(&needle))
            .collect();

        DashboardView {
            rows,
            last_updated: snapshot.last_updated,
            error: snapshot.last_error.clone(),
            is_refreshing: snapshot.in_flight > 0,
        }
    }
}
