//! Label extraction for a list of canonical IDs.

use affil_model::{RegistryLabelRow, canonical_uri};
use tracing::{debug, info};

use crate::dump::RegistryDump;

/// Progress is logged every this many IDs.
const PROGRESS_EVERY: usize = 1000;

/// Rows produced for a list of IDs, plus what could not be found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Rows in input-ID order, then dump order, then label order.
    pub rows: Vec<RegistryLabelRow>,
    /// Input IDs that matched at least one object.
    pub ids_found: usize,
    /// Input IDs with no object in the dump, in input order.
    pub ids_missing: Vec<String>,
}

/// Flattens the labels of every dump object whose identifier matches an input ID.
///
/// The output is the same as scanning the whole dump once per ID: IDs are
/// visited in input order and, for each, every matching object in dump order.
/// Duplicate IDs and duplicate dump objects both produce repeated rows.
pub fn extract_labels(ids: &[String], dump: &RegistryDump) -> Extraction {
    let index = dump.index();
    let mut extraction = Extraction::default();

    for (position, id) in ids.iter().enumerate() {
        let uri = canonical_uri(id);
        match index.get(uri.as_str()) {
            Some(matches) => {
                extraction.ids_found += 1;
                for record in matches {
                    let labels = record.labels();
                    debug!(canonical_id = %id, labels = labels.len(), "extracting labels");
                    extraction
                        .rows
                        .extend(labels.into_iter().map(|label| RegistryLabelRow::new(id, label)));
                }
            }
            None => {
                debug!(canonical_id = %id, "canonical ID not present in registry dump");
                extraction.ids_missing.push(id.clone());
            }
        }
        if (position + 1) % PROGRESS_EVERY == 0 {
            info!(processed = position + 1, total = ids.len(), "canonical IDs processed");
        }
    }

    info!(
        ids = ids.len(),
        found = extraction.ids_found,
        missing = extraction.ids_missing.len(),
        rows = extraction.rows.len(),
        "label extraction finished"
    );
    extraction
}
