//! Price history domain models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TRACKED_ASSETS;

/// One retained observation. `timestamp` is epoch milliseconds at acceptance time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub timestamp: i64,
    pub price: f64,
}

impl PricePoint {
    pub fn new(accepted_at: DateTime<Utc>, price: f64) -> Self {
        Self {
            timestamp: accepted_at.timestamp_millis(),
            price,
        }
    }
}

/// A tracked asset and its bounded price history (oldest first).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub historical_data: Vec<PricePoint>,
}

impl AssetRecord {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            historical_data: Vec::new(),
        }
    }

    /// Most recently accepted point, if any.
    pub fn latest_point(&self) -> Option<&PricePoint> {
        self.historical_data.last()
    }
}

/// The whole persisted store: asset id -> record.
///
/// Keys are kept sorted so the serialized file is stable between writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PriceDocument(BTreeMap<String, AssetRecord>);

impl PriceDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in asset set with empty histories.
    pub fn with_default_assets() -> Self {
        DEFAULT_TRACKED_ASSETS
            .iter()
            .map(|(id, name, symbol)| (id.to_string(), AssetRecord::new(*name, *symbol)))
            .collect()
    }

    pub fn get(&self, asset_id: &str) -> Option<&AssetRecord> {
        self.0.get(asset_id)
    }

    pub fn get_mut(&mut self, asset_id: &str) -> Option<&mut AssetRecord> {
        self.0.get_mut(asset_id)
    }

    pub fn contains(&self, asset_id: &str) -> bool {
        self.0.contains_key(asset_id)
    }

    pub fn insert(&mut self, asset_id: impl Into<String>, record: AssetRecord) {
        self.0.insert(asset_id.into(), record);
    }

    pub fn asset_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AssetRecord)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, AssetRecord)> for PriceDocument {
    fn from_iter<I: IntoIterator<Item = (String, AssetRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Result of offering a price to the history policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOutcome {
    /// A new point was appended (and older points possibly evicted).
    Applied(PricePoint),
    /// The price matched the latest point's integer part; nothing changed.
    Unchanged,
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied(_))
    }
}
