use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::Arc;

use super::history_policy::{apply_update, validate_update};
use super::prices_model::{AssetRecord, PriceDocument, UpdateOutcome};
use super::prices_traits::{PriceRepositoryTrait, PriceServiceTrait};
use crate::errors::{Error, Result};

pub struct PriceService {
    repository: Arc<dyn PriceRepositoryTrait>,
}

impl PriceService {
    pub fn new(repository: Arc<dyn PriceRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Same as [`PriceServiceTrait::record_price`] with an explicit acceptance time.
    pub async fn record_price_at(
        &self,
        asset_id: &str,
        price: f64,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome> {
        validate_update(asset_id, price)?;

        let id = asset_id.to_string();
        let outcome = self
            .repository
            .update_document(Box::new(move |document: &mut PriceDocument| {
                apply_update(document, &id, price, now)
            }))
            .await?;

        match outcome {
            UpdateOutcome::Applied(point) => {
                info!("Recorded {} at {} (ts {})", asset_id, point.price, point.timestamp)
            }
            UpdateOutcome::Unchanged => debug!("No history change for {} at {}", asset_id, price),
        }
        Ok(outcome)
    }
}

#[async_trait]
impl PriceServiceTrait for PriceService {
    fn get_all(&self) -> Result<PriceDocument> {
        self.repository.load_document()
    }

    fn get_one(&self, asset_id: &str) -> Result<AssetRecord> {
        self.repository
            .load_document()?
            .get(asset_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(asset_id.to_string()))
    }

    async fn record_price(&self, asset_id: &str, price: f64) -> Result<UpdateOutcome> {
        self.record_price_at(asset_id, price, Utc::now()).await
    }
}
