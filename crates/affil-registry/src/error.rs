//! Error types for registry label extraction.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading registry inputs or writing label tables.
#[derive(Debug, Error)]
pub enum RegistryError {
    // === Missing inputs ===
    /// Canonical ID list not found.
    #[error("canonical ID file not found: {path}")]
    IdFileNotFound { path: PathBuf },

    /// Registry dump not found.
    #[error("registry dump not found: {path}")]
    DumpNotFound { path: PathBuf },

    // === Parse errors ===
    /// Registry dump is not a JSON array.
    #[error("failed to parse registry dump {path}: {source}")]
    DumpParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Label table is not a readable two-column TSV.
    #[error("failed to parse label table {path}: {message}")]
    LabelsParse { path: PathBuf, message: String },

    // === I/O ===
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },
}

impl RegistryError {
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

    /// True for the missing-input class, as opposed to parse or write failures.
    #[must_use]
    pub fn is_missing_file(&self) -> bool {
        matches!(self, Self::IdFileNotFound { .. } | Self::DumpNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
