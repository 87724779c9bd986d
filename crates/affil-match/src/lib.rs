//! Affiliation matching.
//!
//! Scores each harvested affiliation string against the registry labels of
//! the organization the document was tagged with, keeps the best label and
//! assigns a confidence tier.

#![deny(unsafe_code)]

pub mod engine;
pub mod error;
pub mod output;
pub mod score;

use std::path::Path;

use tracing::{info, info_span};

pub use engine::{
    DEFAULT_SCORE_CUTOFF, MatchOptions, MatchRun, MatchSummary, Matcher, best_label, classify,
    match_records,
};
pub use error::{MatchError, Result};
pub use output::{OutputFormat, RESULT_HEADER, write_results};
pub use score::{default_process, partial_ratio, partial_token_set_ratio, ratio};

/// Loads harvested records and a label table, matches them, and writes the
/// result table.
///
/// # Errors
///
/// Fails when either input cannot be read or the output cannot be written.
pub fn match_files(
    records_path: &Path,
    labels_path: &Path,
    output_path: &Path,
    options: MatchOptions,
    format: OutputFormat,
) -> Result<MatchSummary> {
    let span = info_span!(
        "match",
        records = %records_path.display(),
        labels = %labels_path.display()
    );
    let _guard = span.enter();

    let records = affil_harvest::read_records(records_path)?;
    let labels = affil_registry::load_label_table(labels_path)?;
    info!(
        documents = records.len(),
        canonical_ids = labels.len(),
        labels = labels.label_count(),
        "inputs loaded"
    );

    let run = match_records(&records, &labels, options);
    write_results(output_path, &run.results, format)?;
    info!(
        output = %output_path.display(),
        rows = run.results.len(),
        %format,
        "match results written"
    );
    Ok(run.summary)
}
