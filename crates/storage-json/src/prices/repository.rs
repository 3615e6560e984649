use std::path::PathBuf;

use async_trait::async_trait;
use cointrail_core::errors::Result;
use cointrail_core::prices::{DocumentJob, PriceDocument, PriceRepositoryTrait, UpdateOutcome};

use crate::file::{spawn_writer, PriceFile, WriteHandle};

/// Price repository backed by a single JSON file.
///
/// Must be created inside a Tokio runtime; it spawns the writer task.
pub struct JsonPriceRepository {
    file: PriceFile,
    writer: WriteHandle,
}

impl JsonPriceRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let file = PriceFile::new(path);
        let writer = spawn_writer(file.clone());
        Self { file, writer }
    }
}

#[async_trait]
impl PriceRepositoryTrait for JsonPriceRepository {
    fn load_document(&self) -> Result<PriceDocument> {
        Ok(self
            .file
            .read()?
            .unwrap_or_else(PriceDocument::with_default_assets))
    }

    async fn save_document(&self, document: PriceDocument) -> Result<()> {
        self.writer.replace(document).await
    }

    async fn update_document(&self, job: DocumentJob) -> Result<UpdateOutcome> {
        self.writer.update(job).await
    }
}
