//! Matching engine.
//!
//! For each harvested record whose canonical ID is present in the label
//! table, every affiliation name is scored against that ID's labels. The best
//! label above the cutoff becomes the result; its score picks the tier.

use std::collections::BTreeMap;

use affil_model::{AffiliationRecord, ConfidenceTier, LabelTable, MatchResult, RecordMap};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::score::partial_token_set_ratio;

/// Candidates scoring below this are never selected.
pub const DEFAULT_SCORE_CUTOFF: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Minimum score, inclusive, for a label to be considered.
    pub score_cutoff: u8,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            score_cutoff: DEFAULT_SCORE_CUTOFF,
        }
    }
}

/// Tier for a selected score, or `None` when the score is below the cutoff.
#[must_use]
pub fn classify(score: u8, cutoff: u8) -> Option<ConfidenceTier> {
    (score >= cutoff).then(|| ConfidenceTier::from_score(score))
}

/// Best-scoring label for `name`, ignoring candidates below `cutoff`.
///
/// On equal scores the label that comes first wins.
pub fn best_label<'a>(name: &str, labels: &'a [String], cutoff: u8) -> Option<(&'a str, u8)> {
    let mut best: Option<(&str, u8)> = None;
    for label in labels {
        let score = partial_token_set_ratio(name, label);
        if score < cutoff {
            continue;
        }
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((label.as_str(), score));
        }
    }
    best
}

/// Counts describing one matching run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSummary {
    /// Records seen, including empty ones.
    pub documents: usize,
    /// Records with names whose canonical ID is missing or not in the table.
    pub unresolved_records: usize,
    /// Names on unresolved records. They produce no rows.
    pub names_unresolved: usize,
    pub names_scored: usize,
    /// Names where every label scored below the cutoff.
    pub names_below_cutoff: usize,
    pub rows: usize,
    pub tiers: BTreeMap<ConfidenceTier, usize>,
}

impl MatchSummary {
    #[must_use]
    pub fn tier_count(&self, tier: ConfidenceTier) -> usize {
        self.tiers.get(&tier).copied().unwrap_or(0)
    }

    fn record_result(&mut self, result: &MatchResult) {
        self.rows += 1;
        *self.tiers.entry(result.confidence_tier).or_default() += 1;
    }
}

/// Results in record order plus the run's counts.
#[derive(Debug, Clone, Default)]
pub struct MatchRun {
    pub results: Vec<MatchResult>,
    pub summary: MatchSummary,
}

/// Matches affiliation names against one label table.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    labels: &'a LabelTable,
    options: MatchOptions,
}

impl<'a> Matcher<'a> {
    pub fn new(labels: &'a LabelTable, options: MatchOptions) -> Self {
        Self { labels, options }
    }

    pub fn options(&self) -> MatchOptions {
        self.options
    }

    /// Scores one name against the labels of `canonical_id`.
    ///
    /// `None` when the ID has no labels or nothing clears the cutoff.
    pub fn match_name(
        &self,
        document_id: &str,
        canonical_id: &str,
        name: &str,
    ) -> Option<MatchResult> {
        let labels = self.labels.get(canonical_id)?;
        let (label, score) = best_label(name, labels, self.options.score_cutoff)?;
        let confidence_tier = classify(score, self.options.score_cutoff)?;
        Some(MatchResult {
            document_id: document_id.to_string(),
            affiliation_name: name.to_string(),
            matched_label: label.to_string(),
            canonical_id: canonical_id.to_string(),
            score,
            confidence_tier,
        })
    }

    /// Matches every name of one record, in name order.
    pub fn match_record(&self, record: &AffiliationRecord) -> Vec<MatchResult> {
        self.match_record_into(record, &mut MatchSummary::default())
    }

    /// Matches every record, in document ID order.
    pub fn run(&self, records: &RecordMap) -> MatchRun {
        let mut run = MatchRun::default();
        for record in records.values() {
            let rows = self.match_record_into(record, &mut run.summary);
            run.results.extend(rows);
        }

        info!(
            documents = run.summary.documents,
            names_scored = run.summary.names_scored,
            rows = run.summary.rows,
            below_cutoff = run.summary.names_below_cutoff,
            unresolved_records = run.summary.unresolved_records,
            "matching finished"
        );
        run
    }

    fn match_record_into(
        &self,
        record: &AffiliationRecord,
        summary: &mut MatchSummary,
    ) -> Vec<MatchResult> {
        summary.documents += 1;
        if record.affiliation_names.is_empty() {
            return Vec::new();
        }

        let Some(canonical_id) = record
            .canonical_id
            .as_deref()
            .filter(|id| self.labels.contains(id))
        else {
            debug!(
                document_id = %record.document_id,
                canonical_id = ?record.canonical_id,
                names = record.affiliation_names.len(),
                "canonical ID unresolved, skipping names"
            );
            summary.unresolved_records += 1;
            summary.names_unresolved += record.affiliation_names.len();
            return Vec::new();
        };

        let mut rows = Vec::with_capacity(record.affiliation_names.len());
        for name in &record.affiliation_names {
            summary.names_scored += 1;
            match self.match_name(&record.document_id, canonical_id, name) {
                Some(result) => {
                    summary.record_result(&result);
                    rows.push(result);
                }
                None => {
                    debug!(
                        document_id = %record.document_id,
                        %canonical_id,
                        name = %name,
                        "no label above cutoff"
                    );
                    summary.names_below_cutoff += 1;
                }
            }
        }
        rows
    }
}

/// Matches `records` against `labels` with the given options.
pub fn match_records(records: &RecordMap, labels: &LabelTable, options: MatchOptions) -> MatchRun {
    Matcher::new(labels, options).run(records)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn labels() -> LabelTable {
        let mut table = LabelTable::new();
        for label in ["Example University", "Université Exemple", "EU"] {
            table.insert("ABC123", label);
        }
        table
    }

    fn record(id: Option<&str>, names: &[&str]) -> AffiliationRecord {
        AffiliationRecord {
            document_id: "10.1/x".to_string(),
            canonical_id: id.map(str::to_string),
            affiliation_names: names.iter().map(|n| (*n).to_string()).collect(),
        }
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(classify(90, 20), Some(ConfidenceTier::High));
        assert_eq!(classify(89, 20), Some(ConfidenceTier::Moderate));
        assert_eq!(classify(80, 20), Some(ConfidenceTier::Moderate));
        assert_eq!(classify(79, 20), Some(ConfidenceTier::Low));
        assert_eq!(classify(70, 20), Some(ConfidenceTier::Low));
        assert_eq!(classify(69, 20), Some(ConfidenceTier::NoReliable));
        assert_eq!(classify(20, 20), Some(ConfidenceTier::NoReliable));
        assert_eq!(classify(19, 20), None);
    }

    proptest! {
        #[test]
        fn every_score_lands_in_exactly_one_tier(score in 0u8..=100) {
            let tier = classify(score, DEFAULT_SCORE_CUTOFF);
            let expected = match score {
                90..=100 => Some(ConfidenceTier::High),
                80..=89 => Some(ConfidenceTier::Moderate),
                70..=79 => Some(ConfidenceTier::Low),
                20..=69 => Some(ConfidenceTier::NoReliable),
                _ => None,
            };
            prop_assert_eq!(tier, expected);
        }

        #[test]
        fn best_label_never_returns_below_cutoff(
            name in "[a-zA-Z ]{0,24}",
            cutoff in 0u8..=100,
        ) {
            let candidates = vec!["Example University".to_string(), "EU".to_string()];
            if let Some((_, score)) = best_label(&name, &candidates, cutoff) {
                prop_assert!(score >= cutoff);
            }
        }
    }

    #[test]
    fn ties_keep_first_label() {
        let candidates = vec![
            "Example University".to_string(),
            "University Example".to_string(),
        ];
        assert_eq!(
            best_label("Example University", &candidates, 20),
            Some(("Example University", 100))
        );
    }

    #[test]
    fn unresolved_ids_produce_no_rows() {
        let table = labels();
        let matcher = Matcher::new(&table, MatchOptions::default());
        assert!(matcher.match_record(&record(None, &["Example University"])).is_empty());
        assert!(
            matcher
                .match_record(&record(Some("ZZZ999"), &["Example University"]))
                .is_empty()
        );
    }

    #[test]
    fn cutoff_drops_names_silently() {
        let table = labels();
        let strict = Matcher::new(&table, MatchOptions { score_cutoff: 101 });
        let mut records = RecordMap::new();
        records.insert("10.1/x".to_string(), record(Some("ABC123"), &["Example University"]));

        let run = strict.run(&records);
        assert!(run.results.is_empty());
        assert_eq!(run.summary.names_below_cutoff, 1);
        assert_eq!(run.summary.names_scored, 1);
    }
}
