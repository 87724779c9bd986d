//! Canonical ID list input.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use affil_model::strip_registry_prefix;

use crate::error::{RegistryError, Result};

/// Reads a newline-delimited list of canonical IDs.
///
/// Lines are trimmed, blank lines skipped, and a leading registry URI is
/// stripped so full-URI lists work too. Order and duplicates are preserved.
///
/// # Errors
///
/// [`RegistryError::IdFileNotFound`] when the file does not exist.
pub fn read_canonical_ids(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RegistryError::IdFileNotFound {
            path: path.to_path_buf(),
        },
        _ => RegistryError::io(path, e),
    })?;
    Ok(parse_canonical_ids(&contents))
}

pub fn parse_canonical_ids(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(strip_registry_prefix)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
