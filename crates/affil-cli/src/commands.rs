use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use affil_cli::config::{AppConfig, HarvestOverrides};
use affil_harvest::{HarvestConfig, HarvestOutcome};
use affil_match::{MatchOptions, MatchSummary, OutputFormat};
use affil_registry::ExtractionSummary;
use anyhow::{Context, Result};
use tracing::{info, info_span};

/// Harvested records file written into the output directory.
pub const RECORDS_FILENAME: &str = "affiliations.json";
/// Observed canonical IDs, the extractor's ID list input.
pub const IDS_FILENAME: &str = "ror_ids.txt";

pub struct HarvestReport {
    pub config: HarvestConfig,
    pub outcome: HarvestOutcome,
    pub records_path: PathBuf,
    pub ids_path: PathBuf,
}

pub fn run_harvest(
    config: &AppConfig,
    overrides: &HarvestOverrides,
    out_dir: &Path,
) -> Result<HarvestReport> {
    let harvest_config = overrides.resolve(&config.harvest);
    harvest_config.validate().context("harvest settings")?;
    let span = info_span!("harvest", endpoint = %harvest_config.endpoint);
    let _guard = span.enter();

    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory {}", out_dir.display()))?;

    let start = Instant::now();
    let outcome = affil_harvest::harvest(&harvest_config).context("harvest")?;

    let records_path = out_dir.join(RECORDS_FILENAME);
    let ids_path = out_dir.join(IDS_FILENAME);
    affil_harvest::write_records(&records_path, &outcome.records)
        .context("write harvested records")?;
    affil_harvest::write_canonical_ids(&ids_path, &outcome.canonical_ids)
        .context("write canonical IDs")?;
    info!(
        records = outcome.records.len(),
        canonical_ids = outcome.canonical_ids.len(),
        duration_ms = start.elapsed().as_millis(),
        "harvest outputs written"
    );

    Ok(HarvestReport {
        config: harvest_config,
        outcome,
        records_path,
        ids_path,
    })
}

pub fn run_extract(ids: &Path, dump: &Path, output: &Path) -> Result<ExtractionSummary> {
    affil_registry::extract_labels_to_file(ids, dump, output).context("extract labels")
}

pub fn run_match(
    config: &AppConfig,
    records: &Path,
    labels: &Path,
    output: &Path,
    cutoff: Option<u8>,
    format: OutputFormat,
) -> Result<MatchSummary> {
    let options = MatchOptions {
        score_cutoff: cutoff.unwrap_or(config.matching.score_cutoff),
    };
    affil_match::match_files(records, labels, output, options, format).context("match affiliations")
}
