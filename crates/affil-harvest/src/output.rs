//! Persisting harvest results.
//!
//! Records are stored as a JSON array sorted by document ID; observed
//! canonical IDs as one bare ID per line, which is the extractor's input
//! format. Files are written to a temporary sibling and renamed into place.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use affil_model::{AffiliationRecord, RecordMap};
use tempfile::NamedTempFile;

use crate::error::{HarvestError, Result};

/// Writes records as a pretty-printed JSON array.
///
/// # Errors
///
/// Fails on I/O or serialization errors; no file is left behind in that case.
pub fn write_records(path: &Path, records: &RecordMap) -> Result<()> {
    let values: Vec<&AffiliationRecord> = records.values().collect();
    write_atomic(path, |writer| {
        serde_json::to_writer_pretty(&mut *writer, &values).map_err(std::io::Error::other)?;
        writer.write_all(b"\n")
    })
}

/// Reads records written by [`write_records`].
///
/// Duplicate document IDs keep the later entry.
///
/// # Errors
///
/// Fails when the file is missing or is not a JSON array of records.
pub fn read_records(path: &Path) -> Result<RecordMap> {
    let file = File::open(path).map_err(|e| HarvestError::io(path, e))?;
    let records: Vec<AffiliationRecord> = serde_json::from_reader(BufReader::new(file))
        .map_err(|source| HarvestError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(records
        .into_iter()
        .map(|record| (record.document_id.clone(), record))
        .collect())
}

/// Writes canonical IDs, one per line.
///
/// # Errors
///
/// Fails on I/O errors.
pub fn write_canonical_ids(path: &Path, ids: &BTreeSet<String>) -> Result<()> {
    write_atomic(path, |writer| {
        for id in ids {
            writeln!(writer, "{id}")?;
        }
        Ok(())
    })
}

fn write_atomic(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<&File>) -> std::io::Result<()>,
) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(dir).map_err(|e| HarvestError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        write(&mut writer).map_err(|e| HarvestError::io(path, e))?;
        writer.flush().map_err(|e| HarvestError::io(path, e))?;
    }
    temp.persist(path)
        .map_err(|e| HarvestError::io(path, e.error))?;
    Ok(())
}
