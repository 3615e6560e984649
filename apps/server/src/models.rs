use std::collections::BTreeMap;

use cointrail_core::prices as core_prices;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Milliseconds since the Unix epoch at acceptance time.
    pub timestamp: i64,
    /// Quote in USD.
    pub price: f64,
}

impl From<core_prices::PricePoint> for PricePoint {
    fn from(p: core_prices::PricePoint) -> Self {
        Self {
            timestamp: p.timestamp,
            price: p.price,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub name: String,
    pub symbol: String,
    /// Oldest first, at most 30 points.
    pub historical_data: Vec<PricePoint>,
}

impl From<core_prices::AssetRecord> for AssetRecord {
    fn from(r: core_prices::AssetRecord) -> Self {
        Self {
            name: r.name,
            symbol: r.symbol,
            historical_data: r.historical_data.into_iter().map(PricePoint::from).collect(),
        }
    }
}

/// Every tracked asset keyed by id.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct PriceCollection(pub BTreeMap<String, AssetRecord>);

impl From<core_prices::PriceDocument> for PriceCollection {
    fn from(doc: core_prices::PriceDocument) -> Self {
        Self(
            doc.iter()
                .map(|(id, record)| (id.clone(), AssetRecord::from(record.clone())))
                .collect(),
        )
    }
}

/// Body of `POST /collection`. Both fields are required; missing ones are
/// reported as 400 before the store is touched.
#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct UpdatePriceRequest {
    pub id: Option<String>,
    pub price: Option<f64>,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct UpdatePriceResponse {
    pub success: bool,
}
