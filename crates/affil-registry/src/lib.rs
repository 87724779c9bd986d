//! Registry label extraction.
//!
//! Turns a list of canonical IDs and a ROR registry dump into a flat
//! `ROR ID<TAB>Label` table covering each organization's primary name,
//! localized labels, acronyms and aliases.

#![deny(unsafe_code)]

pub mod dump;
pub mod error;
pub mod extract;
pub mod ids;
pub mod output;

use std::path::Path;

use tracing::{info, info_span};

pub use dump::{LocalizedLabel, RegistryDump, RegistryName, RegistryRecord, load_dump};
pub use error::{RegistryError, Result};
pub use extract::{Extraction, extract_labels};
pub use ids::{parse_canonical_ids, read_canonical_ids};
pub use output::{LABEL_TABLE_HEADER, load_label_table, read_label_rows, write_label_rows};

/// Counts reported after a file-to-file extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub ids_requested: usize,
    pub ids_found: usize,
    pub ids_missing: Vec<String>,
    pub rows_written: usize,
    pub dump_objects: usize,
    pub dump_objects_skipped: usize,
}

/// Reads the ID list and the dump, extracts labels, and writes the TSV.
///
/// Both inputs are fully read before the output is created; on any error no
/// output file is produced.
///
/// # Errors
///
/// Missing inputs are reported as [`RegistryError::IdFileNotFound`] or
/// [`RegistryError::DumpNotFound`], distinct from parse and write errors.
pub fn extract_labels_to_file(
    ids_path: &Path,
    dump_path: &Path,
    output_path: &Path,
) -> Result<ExtractionSummary> {
    let span = info_span!(
        "extract_labels",
        ids = %ids_path.display(),
        dump = %dump_path.display()
    );
    let _guard = span.enter();

    let ids = read_canonical_ids(ids_path)?;
    let dump = load_dump(dump_path)?;
    info!(ids = ids.len(), dump_objects = dump.len(), "inputs loaded");

    let extraction = extract_labels(&ids, &dump);
    write_label_rows(output_path, &extraction.rows)?;
    info!(
        output = %output_path.display(),
        rows = extraction.rows.len(),
        "label table written"
    );

    Ok(ExtractionSummary {
        ids_requested: ids.len(),
        ids_found: extraction.ids_found,
        ids_missing: extraction.ids_missing,
        rows_written: extraction.rows.len(),
        dump_objects: dump.len(),
        dump_objects_skipped: dump.skipped(),
    })
}
