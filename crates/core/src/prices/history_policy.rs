//! History update policy.
//!
//! Decides whether an observed price becomes a new history point:
//! a point is appended only when the asset has no history yet or when the
//! integer part of the price differs from the integer part of the latest
//! point. After an append the history is trimmed from the front to
//! [`HISTORY_RETENTION_LIMIT`] points. Points are never edited or reordered.

use chrono::{DateTime, Utc};
use log::debug;

use super::prices_model::{PriceDocument, PricePoint, UpdateOutcome};
use crate::constants::HISTORY_RETENTION_LIMIT;
use crate::errors::{Error, Result, ValidationError};

/// Checks the inputs of an update before the store is touched.
pub fn validate_update(asset_id: &str, price: f64) -> Result<()> {
    if asset_id.is_empty() {
        return Err(ValidationError::MissingField("id".to_string()).into());
    }
    if !price.is_finite() {
        return Err(ValidationError::NonFinitePrice(price).into());
    }
    Ok(())
}

/// True when `next` should be recorded after `last`.
///
/// Comparison is on `floor`, so moves inside the same whole dollar are ignored.
pub fn is_significant_change(last: Option<f64>, next: f64) -> bool {
    match last {
        None => true,
        Some(previous) => previous.floor() != next.floor(),
    }
}

/// Applies the policy to `document` in place.
///
/// Returns [`Error::NotFound`] for an unknown id without creating it.
pub fn apply_update(
    document: &mut PriceDocument,
    asset_id: &str,
    price: f64,
    now: DateTime<Utc>,
) -> Result<UpdateOutcome> {
    validate_update(asset_id, price)?;

    let record = document
        .get_mut(asset_id)
        .ok_or_else(|| Error::NotFound(asset_id.to_string()))?;

    let last = record.latest_point().map(|p| p.price);
    if !is_significant_change(last, price) {
        debug!(
            "Skipping {} at {}: same integer part as last point {:?}",
            asset_id, price, last
        );
        return Ok(UpdateOutcome::Unchanged);
    }

    let point = PricePoint::new(now, price);
    record.historical_data.push(point);

    let len = record.historical_data.len();
    if len > HISTORY_RETENTION_LIMIT {
        record
            .historical_data
            .drain(..len - HISTORY_RETENTION_LIMIT);
    }

    Ok(UpdateOutcome::Applied(point))
}
