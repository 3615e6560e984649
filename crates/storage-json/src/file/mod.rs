//! Raw access to the price document file.

mod write_actor;

pub use write_actor::{spawn_writer, WriteHandle};

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cointrail_core::prices::PriceDocument;
use log::warn;

use crate::errors::StorageError;

/// The JSON file holding the whole price document.
#[derive(Debug, Clone)]
pub struct PriceFile {
    path: PathBuf,
}

impl PriceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }

    /// Reads and parses the file. `Ok(None)` when it does not exist.
    pub fn read(&self) -> Result<Option<PriceDocument>, StorageError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.display(),
                    source,
                })
            }
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                path: self.display(),
                source,
            })
    }

    /// Reads the file for an update, falling back to the default asset set
    /// when it is missing or unparsable. I/O failures still propagate so a
    /// permission problem never causes the file to be overwritten.
    pub fn read_or_default(&self) -> Result<PriceDocument, StorageError> {
        match self.read() {
            Ok(Some(document)) => Ok(document),
            Ok(None) => Ok(PriceDocument::with_default_assets()),
            Err(StorageError::Corrupt { path, source }) => {
                warn!("Discarding unreadable price file {}: {}", path, source);
                Ok(PriceDocument::with_default_assets())
            }
            Err(e) => Err(e),
        }
    }

    /// Writes the document to a sibling temp file and renames it into place.
    pub fn write(&self, document: &PriceDocument) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StorageError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, json).map_err(|source| StorageError::Write {
            path: tmp_path.display().to_string(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| StorageError::Write {
            path: self.display(),
            source,
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "prices.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
