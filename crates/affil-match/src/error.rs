//! Error types for the matching stage.

use std::path::PathBuf;

use affil_harvest::HarvestError;
use affil_registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    /// Harvested records could not be loaded.
    #[error("failed to read harvested records: {0}")]
    RecordsRead(#[from] HarvestError),

    /// Label table could not be loaded.
    #[error("failed to read label table: {0}")]
    LabelsRead(#[from] RegistryError),

    #[error("failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MatchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Write {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
