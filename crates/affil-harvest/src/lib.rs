//! Harvesting of author affiliation mentions from the Crossref works API.
//!
//! [`harvest`] is the entry point: it builds a [`CrossrefClient`] from a
//! [`HarvestConfig`] and drives it through the cursor loop in [`Harvester`].
//! The result maps each document ID to an [`affil_model::AffiliationRecord`]
//! and collects every canonical registry ID seen along the way.

#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod harvester;
pub mod output;
pub mod works;

pub use client::{CrossrefClient, PageSource, WorksPage, parse_page};
pub use config::{DEFAULT_ENDPOINT, DEFAULT_FILTER, HarvestConfig, INITIAL_CURSOR, MAX_ROWS};
pub use error::{HarvestError, Result};
pub use harvester::{HarvestOutcome, Harvester, RecordAccumulator, StopReason};
pub use output::{read_records, write_canonical_ids, write_records};
pub use works::{AffiliationEntry, NormalizedWork, parse_work};

/// Harvests affiliation records from the configured endpoint.
///
/// # Errors
///
/// Returns an error for invalid configuration only; request failures end
/// the run early with partial results.
pub fn harvest(config: &HarvestConfig) -> Result<HarvestOutcome> {
    config.validate()?;
    let client = CrossrefClient::new(config)?;
    Harvester::new(client, config.clone()).run()
}
