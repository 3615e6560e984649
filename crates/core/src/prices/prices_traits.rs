use async_trait::async_trait;

use crate::errors::Result;
use crate::prices::prices_model::{AssetRecord, PriceDocument, UpdateOutcome};

/// A mutation run against the current document.
///
/// The document is persisted only when the job returns [`UpdateOutcome::Applied`].
pub type DocumentJob = Box<dyn FnOnce(&mut PriceDocument) -> Result<UpdateOutcome> + Send + 'static>;

/// Storage interface for the price document.
#[async_trait]
pub trait PriceRepositoryTrait: Send + Sync {
    /// Reads the whole document as last durably written.
    fn load_document(&self) -> Result<PriceDocument>;

    /// Replaces the whole document.
    async fn save_document(&self, document: PriceDocument) -> Result<()>;

    /// Runs `job` against the current document and persists the result if
    /// the job applied a change.
    ///
    /// The default implementation is a plain read-modify-write. Backends
    /// shared between tasks should override it to serialise jobs.
    async fn update_document(&self, job: DocumentJob) -> Result<UpdateOutcome> {
        let mut document = self.load_document()?;
        let outcome = job(&mut document)?;
        if outcome.is_applied() {
            self.save_document(document).await?;
        }
        Ok(outcome)
    }
}

/// Trait for price service operations
#[async_trait]
pub trait PriceServiceTrait: Send + Sync {
    fn get_all(&self) -> Result<PriceDocument>;
    fn get_one(&self, asset_id: &str) -> Result<AssetRecord>;
    async fn record_price(&self, asset_id: &str, price: f64) -> Result<UpdateOutcome>;
}
