//! JSON file storage implementation for Cointrail.
//!
//! The whole price document lives in one pretty-printed JSON file. Reads go
//! straight to disk; every write goes through a single writer task so
//! read-modify-write cycles from concurrent callers never interleave.
//!
//! ```text
//! core (PriceService)
//!        │  PriceRepositoryTrait
//!        ▼
//! JsonPriceRepository ──► WriteHandle ──► writer task ──► PriceFile
//!        │                                                   ▲
//!        └──────────────────── load_document ────────────────┘
//! ```

pub mod errors;
pub mod file;
pub mod prices;

pub use errors::StorageError;
pub use file::{spawn_writer, PriceFile, WriteHandle};
pub use prices::JsonPriceRepository;

pub use cointrail_core::errors::{Error, Result, StoreError};
