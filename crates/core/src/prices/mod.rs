//! Prices module - asset records, the history update policy, and the service
//! that ties them to a repository.

pub mod history_policy;
mod prices_model;
mod prices_service;
mod prices_traits;

pub use history_policy::{apply_update, is_significant_change, validate_update};
pub use prices_model::{AssetRecord, PriceDocument, PricePoint, UpdateOutcome};
pub use prices_service::PriceService;
pub use prices_traits::{DocumentJob, PriceRepositoryTrait, PriceServiceTrait};
