//! Cursor-paginated harvest loop.
//!
//! The loop stops on whichever comes first: the planned page count
//! (`ceil(expected_total / rows)`), an absent next-cursor, or an empty page.
//! Cursor exhaustion is authoritative; the page count is only a cap.
//!
//! Transient request failures are retried on the same cursor after the fixed
//! delay. Every successful page is followed by the same delay when another
//! request is due.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use affil_model::{AffiliationRecord, RecordMap};
use tracing::{debug, info, info_span, warn};

use crate::client::{PageSource, WorksPage};
use crate::config::HarvestConfig;
use crate::error::Result;
use crate::works::parse_work;

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Planned page count reached.
    PageBudgetReached,
    /// Source returned no next-cursor or an empty page.
    CursorExhausted,
    /// Too many consecutive transient failures.
    TooManyFailures,
    /// Response envelope was not recognizable.
    MalformedResponse,
}

impl StopReason {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PageBudgetReached => "page budget reached",
            Self::CursorExhausted => "cursor exhausted",
            Self::TooManyFailures => "too many failed requests",
            Self::MalformedResponse => "malformed response",
        }
    }

    /// True when the harvest ended without hitting a failure.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        matches!(self, Self::PageBudgetReached | Self::CursorExhausted)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mutable state for a single harvest call.
///
/// Documents seen twice keep the later occurrence.
#[derive(Debug, Default)]
pub struct RecordAccumulator {
    records: RecordMap,
    canonical_ids: BTreeSet<String>,
    items_skipped: usize,
    entries_skipped: usize,
}

impl RecordAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorbs one raw item. Items that do not parse are counted and skipped.
    pub fn absorb_item(&mut self, item: &serde_json::Value) {
        let work = match parse_work(item) {
            Ok(work) => work,
            Err(error) => {
                self.items_skipped += 1;
                warn!(%error, "skipping malformed work item");
                return;
            }
        };
        if work.entries_skipped > 0 {
            self.entries_skipped += work.entries_skipped;
            warn!(
                document_id = %work.document_id,
                skipped = work.entries_skipped,
                "dropping malformed affiliation entries"
            );
        }
        for id in work.canonical_ids() {
            self.canonical_ids.insert(id.to_string());
        }
        let record = work.to_record();
        if self.records.contains_key(&record.document_id) {
            debug!(document_id = %record.document_id, "document seen again, keeping later occurrence");
        }
        self.records.insert(record.document_id.clone(), record);
    }

    pub fn absorb_page(&mut self, page: &WorksPage) {
        for item in &page.items {
            self.absorb_item(item);
        }
    }

    pub fn records(&self) -> &RecordMap {
        &self.records
    }

    pub fn canonical_ids(&self) -> &BTreeSet<String> {
        &self.canonical_ids
    }

    pub fn items_skipped(&self) -> usize {
        self.items_skipped
    }

    pub fn entries_skipped(&self) -> usize {
        self.entries_skipped
    }

    /// Records, canonical IDs, skipped items, skipped affiliation entries.
    pub fn into_parts(self) -> (RecordMap, BTreeSet<String>, usize, usize) {
        (
            self.records,
            self.canonical_ids,
            self.items_skipped,
            self.entries_skipped,
        )
    }
}

/// Result of a harvest run. Partial results are kept whatever the stop reason.
#[derive(Debug, Clone)]
pub struct HarvestOutcome {
    pub records: RecordMap,
    pub canonical_ids: BTreeSet<String>,
    pub pages_planned: u64,
    pub pages_completed: u64,
    pub failed_requests: u64,
    pub items_skipped: usize,
    /// Affiliation entries dropped from otherwise valid documents.
    pub entries_skipped: usize,
    /// Cursor of the last page fetched successfully. Restarting from it
    /// re-fetches that page.
    pub last_cursor: Option<String>,
    pub stop_reason: StopReason,
}

impl HarvestOutcome {
    /// Records that reported no affiliations at all.
    pub fn empty_records(&self) -> usize {
        self.records.values().filter(|r| r.is_empty()).count()
    }

    pub fn records_with_canonical_id(&self) -> usize {
        self.records
            .values()
            .filter(|r| r.canonical_id.is_some())
            .count()
    }

    pub fn record(&self, document_id: &str) -> Option<&AffiliationRecord> {
        self.records.get(document_id)
    }
}

/// Drives a [`PageSource`] through the cursor loop.
pub struct Harvester<S> {
    source: S,
    config: HarvestConfig,
}

impl<S: PageSource> Harvester<S> {
    pub fn new(source: S, config: HarvestConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Runs the harvest to completion.
    ///
    /// # Errors
    ///
    /// Only configuration problems are errors. Request failures are logged and
    /// reflected in [`HarvestOutcome::stop_reason`].
    pub fn run(&self) -> Result<HarvestOutcome> {
        self.config.validate()?;

        let pages_planned = self.config.planned_pages();
        let delay = self.config.request_delay();
        let span = info_span!("harvest", filter = %self.config.filter, pages_planned);
        let _guard = span.enter();
        info!(
            expected_total = self.config.expected_total,
            rows = self.config.rows,
            "starting harvest"
        );

        let mut accumulator = RecordAccumulator::new();
        let mut cursor = self.config.start_cursor.clone();
        let mut last_cursor = None;
        let mut pages_completed = 0u64;
        let mut failed_requests = 0u64;
        let mut consecutive_failures = 0u32;
        let mut last_page_full = false;

        let stop_reason = loop {
            if pages_completed >= pages_planned {
                break StopReason::PageBudgetReached;
            }

            let page = match self.source.fetch_page(&cursor) {
                Ok(page) => page,
                Err(error) if error.is_transient() => {
                    failed_requests += 1;
                    consecutive_failures += 1;
                    warn!(
                        %error,
                        cursor = %cursor,
                        attempt = consecutive_failures,
                        "page request failed"
                    );
                    if consecutive_failures >= self.config.max_consecutive_failures {
                        break StopReason::TooManyFailures;
                    }
                    pause(delay);
                    continue;
                }
                Err(error) => {
                    failed_requests += 1;
                    warn!(%error, cursor = %cursor, "stopping harvest");
                    break StopReason::MalformedResponse;
                }
            };
            consecutive_failures = 0;

            if pages_completed == 0 {
                self.check_reported_total(page.total_results);
            }

            accumulator.absorb_page(&page);
            pages_completed += 1;
            last_page_full = page.items.len() >= self.config.rows as usize;
            last_cursor = Some(cursor.clone());
            info!(
                page = pages_completed,
                total_pages = pages_planned,
                items = page.items.len(),
                documents = accumulator.records().len(),
                "page harvested"
            );

            if page.items.is_empty() {
                break StopReason::CursorExhausted;
            }
            match page.next_cursor {
                Some(next) => cursor = next,
                None => break StopReason::CursorExhausted,
            }

            if pages_completed < pages_planned {
                pause(delay);
            }
        };

        match stop_reason {
            StopReason::CursorExhausted if pages_completed < pages_planned => warn!(
                pages_completed,
                pages_planned,
                "source exhausted before the planned page count; expected_total overstates the result set"
            ),
            StopReason::PageBudgetReached if last_page_full => warn!(
                pages_completed,
                "page budget reached while pages were still full; expected_total may understate the result set"
            ),
            _ => {}
        }

        let (records, canonical_ids, items_skipped, entries_skipped) = accumulator.into_parts();
        info!(
            documents = records.len(),
            canonical_ids = canonical_ids.len(),
            items_skipped,
            entries_skipped,
            failed_requests,
            stop_reason = %stop_reason,
            "harvest finished"
        );

        Ok(HarvestOutcome {
            records,
            canonical_ids,
            pages_planned,
            pages_completed,
            failed_requests,
            items_skipped,
            entries_skipped,
            last_cursor,
            stop_reason,
        })
    }

    fn check_reported_total(&self, reported: Option<u64>) {
        if let Some(reported) = reported
            && reported != self.config.expected_total
        {
            warn!(
                reported,
                expected = self.config.expected_total,
                "API result count differs from expected_total"
            );
        }
    }
}

fn pause(delay: Duration) {
    std::thread::sleep(delay);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accumulator_keeps_later_occurrence() {
        let mut acc = RecordAccumulator::new();
        acc.absorb_item(&json!({
            "DOI": "10.1/x",
            "author": [{"affiliation": [{"name": "First"}]}]
        }));
        acc.absorb_item(&json!({
            "DOI": "10.1/x",
            "author": [{"affiliation": [{
                "name": "Second",
                "id": [{"id": "https://ror.org/ABC123", "id-type": "ROR"}]
            }]}]
        }));

        let record = &acc.records()["10.1/x"];
        assert_eq!(record.affiliation_names, vec!["Second".to_string()]);
        assert_eq!(record.canonical_id.as_deref(), Some("ABC123"));
        assert!(acc.canonical_ids().contains("ABC123"));
    }

    #[test]
    fn bad_affiliation_entry_keeps_document_and_id() {
        let mut acc = RecordAccumulator::new();
        acc.absorb_item(&json!({
            "DOI": "10.1/x",
            "author": [{"affiliation": [
                {
                    "name": "Example University",
                    "acronym": [null],
                    "id": [{"id": "https://ror.org/ABC123", "id-type": "ROR"}]
                },
                ["not", "an", "entry"]
            ]}]
        }));

        assert_eq!(acc.items_skipped(), 0);
        assert_eq!(acc.entries_skipped(), 1);
        let record = &acc.records()["10.1/x"];
        assert_eq!(record.affiliation_names, vec!["Example University".to_string()]);
        assert_eq!(record.canonical_id.as_deref(), Some("ABC123"));
        assert!(acc.canonical_ids().contains("ABC123"));
    }

    #[test]
    fn accumulator_counts_malformed_items() {
        let mut acc = RecordAccumulator::new();
        acc.absorb_item(&json!({"title": ["no doi"]}));
        acc.absorb_item(&json!({"DOI": "10.1/ok"}));

        assert_eq!(acc.items_skipped(), 1);
        assert_eq!(acc.records().len(), 1);
    }

    #[test]
    fn stop_reason_cleanliness() {
        assert!(StopReason::CursorExhausted.is_clean());
        assert!(StopReason::PageBudgetReached.is_clean());
        assert!(!StopReason::TooManyFailures.is_clean());
        assert!(!StopReason::MalformedResponse.is_clean());
    }
}
