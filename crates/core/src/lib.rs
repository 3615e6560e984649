//! Cointrail Core - price history domain, policy and service.
//!
//! This crate owns the asset/price model and the rules deciding when an
//! observed price becomes a history point. It is storage-agnostic: the
//! `storage-json` crate implements [`prices::PriceRepositoryTrait`].

pub mod constants;
pub mod errors;
pub mod prices;

pub use errors::Error;
pub use errors::Result;
