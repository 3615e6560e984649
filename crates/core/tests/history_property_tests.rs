//! Property-based tests for the history update policy.
//!
//! Random price walks are fed through `apply_update` and the retained history
//! is checked against the retention and dedup invariants.

use chrono::{Duration, TimeZone, Utc};
use cointrail_core::constants::HISTORY_RETENTION_LIMIT;
use cointrail_core::prices::{apply_update, AssetRecord, PriceDocument, UpdateOutcome};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

/// Prices clustered in a narrow band so floor collisions happen often.
fn arb_price() -> impl Strategy<Value = f64> {
    prop_oneof![0.0f64..5.0, 99.0f64..103.0, 50_000.0f64..50_010.0]
}

fn arb_price_walk(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(arb_price(), 0..=max_len)
}

fn single_asset_document() -> PriceDocument {
    let mut doc = PriceDocument::new();
    doc.insert("bitcoin", AssetRecord::new("Bitcoin", "BTC"));
    doc
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// History never exceeds the retention bound.
    #[test]
    fn prop_history_is_bounded(prices in arb_price_walk(120)) {
        let mut doc = single_asset_document();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        for (i, price) in prices.iter().enumerate() {
            apply_update(&mut doc, "bitcoin", *price, start + Duration::seconds(i as i64)).unwrap();
            prop_assert!(doc.get("bitcoin").unwrap().historical_data.len() <= HISTORY_RETENTION_LIMIT);
        }
    }

    /// Neighbouring points never share an integer part, and timestamps ascend.
    #[test]
    fn prop_consecutive_points_differ_in_floor(prices in arb_price_walk(80)) {
        let mut doc = single_asset_document();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        for (i, price) in prices.iter().enumerate() {
            apply_update(&mut doc, "bitcoin", *price, start + Duration::seconds(i as i64)).unwrap();
        }

        let points = &doc.get("bitcoin").unwrap().historical_data;
        for pair in points.windows(2) {
            prop_assert_ne!(pair[0].price.floor(), pair[1].price.floor());
            prop_assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    /// The retained history is exactly the tail of the accepted points.
    #[test]
    fn prop_retained_points_are_latest_accepted(prices in arb_price_walk(120)) {
        let mut doc = single_asset_document();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut accepted = Vec::new();

        for (i, price) in prices.iter().enumerate() {
            if let UpdateOutcome::Applied(point) =
                apply_update(&mut doc, "bitcoin", *price, start + Duration::seconds(i as i64)).unwrap()
            {
                accepted.push(point);
            }
        }

        let keep_from = accepted.len().saturating_sub(HISTORY_RETENTION_LIMIT);
        prop_assert_eq!(&doc.get("bitcoin").unwrap().historical_data, &accepted[keep_from..].to_vec());
    }

    /// Unknown ids never appear in the document, whatever the price.
    #[test]
    fn prop_unknown_ids_are_never_created(id in "[a-z]{3,12}", price in arb_price()) {
        prop_assume!(id != "bitcoin");
        let mut doc = single_asset_document();
        let result = apply_update(&mut doc, &id, price, Utc::now());

        prop_assert!(result.is_err());
        prop_assert!(!doc.contains(&id));
        prop_assert_eq!(doc.len(), 1);
    }
}
