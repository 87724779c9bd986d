//! Matching over harvested records and extracted label tables.

use std::fs;

use affil_match::{MatchOptions, OutputFormat, match_files, match_records};
use affil_model::{AffiliationRecord, ConfidenceTier, LabelTable, RecordMap, RegistryLabelRow};

fn example_labels() -> LabelTable {
    ["Example University", "Université Exemple", "EU"]
        .into_iter()
        .map(|label| RegistryLabelRow::new("ABC123", label))
        .collect()
}

fn records(entries: Vec<AffiliationRecord>) -> RecordMap {
    entries
        .into_iter()
        .map(|record| (record.document_id.clone(), record))
        .collect()
}

fn record(document_id: &str, canonical_id: Option<&str>, names: &[&str]) -> AffiliationRecord {
    AffiliationRecord {
        document_id: document_id.to_string(),
        canonical_id: canonical_id.map(str::to_string),
        affiliation_names: names.iter().map(|n| (*n).to_string()).collect(),
    }
}

#[test]
fn each_name_picks_its_best_label() {
    let records = records(vec![record(
        "10.1/x",
        Some("ABC123"),
        &["Example Univ.", "Dept of Physics, Example University"],
    )]);

    let run = match_records(&records, &example_labels(), MatchOptions::default());

    assert_eq!(run.results.len(), 2);
    for (result, name) in run
        .results
        .iter()
        .zip(["Example Univ.", "Dept of Physics, Example University"])
    {
        assert_eq!(result.document_id, "10.1/x");
        assert_eq!(result.affiliation_name, name);
        assert_eq!(result.matched_label, "Example University");
        assert_eq!(result.canonical_id, "ABC123");
        assert_eq!(result.score, 100);
        assert_eq!(result.confidence_tier, ConfidenceTier::High);
    }
    assert_eq!(run.summary.tier_count(ConfidenceTier::High), 2);
}

#[test]
fn unresolved_records_produce_no_rows() {
    let records = records(vec![
        record("10.1/none", None, &["Example University"]),
        record("10.1/absent", Some("ZZZ999"), &["Example University"]),
    ]);

    let run = match_records(&records, &example_labels(), MatchOptions::default());

    assert!(run.results.is_empty());
    assert_eq!(run.summary.unresolved_records, 2);
    assert_eq!(run.summary.names_unresolved, 2);
    assert_eq!(run.summary.names_scored, 0);
}

#[test]
fn empty_records_are_counted_but_emit_nothing() {
    let records = records(vec![
        AffiliationRecord::new("10.1/empty"),
        record("10.1/x", Some("ABC123"), &["Example University"]),
    ]);

    let run = match_records(&records, &example_labels(), MatchOptions::default());

    assert_eq!(run.summary.documents, 2);
    assert_eq!(run.results.len(), 1);
    assert_eq!(run.results[0].document_id, "10.1/x");
    assert_eq!(run.summary.unresolved_records, 0);
}

#[test]
fn results_follow_document_then_name_order() {
    let records = records(vec![
        record("10.2/b", Some("ABC123"), &["EU", "Example University"]),
        record("10.1/a", Some("ABC123"), &["Université Exemple"]),
    ]);

    let run = match_records(&records, &example_labels(), MatchOptions::default());

    let order: Vec<(&str, &str)> = run
        .results
        .iter()
        .map(|r| (r.document_id.as_str(), r.affiliation_name.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("10.1/a", "Université Exemple"),
            ("10.2/b", "EU"),
            ("10.2/b", "Example University"),
        ]
    );
}

#[test]
fn files_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let records_path = dir.path().join("affiliations.json");
    let labels_path = dir.path().join("labels.tsv");
    let output_path = dir.path().join("matches.csv");

    affil_harvest::write_records(
        &records_path,
        &records(vec![
            record("10.1/x", Some("ABC123"), &["Example Univ."]),
            AffiliationRecord::new("10.1/empty"),
        ]),
    )
    .unwrap();
    let rows: Vec<RegistryLabelRow> = ["Example University", "EU"]
        .into_iter()
        .map(|label| RegistryLabelRow::new("ABC123", label))
        .collect();
    affil_registry::write_label_rows(&labels_path, &rows).unwrap();

    let summary = match_files(
        &records_path,
        &labels_path,
        &output_path,
        MatchOptions::default(),
        OutputFormat::Csv,
    )
    .unwrap();

    assert_eq!(summary.rows, 1);
    let contents = fs::read_to_string(&output_path).unwrap();
    assert_eq!(
        contents,
        "DOI,Crossref affiliation,Matched ROR name,ROR ID,Match score,Match status\n\
         10.1/x,Example Univ.,Example University,ABC123,100,High Confidence Match\n"
    );
}

#[test]
fn missing_records_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let labels_path = dir.path().join("labels.tsv");
    affil_registry::write_label_rows(&labels_path, &[]).unwrap();
    let output_path = dir.path().join("matches.tsv");

    let err = match_files(
        &dir.path().join("missing.json"),
        &labels_path,
        &output_path,
        MatchOptions::default(),
        OutputFormat::Tsv,
    )
    .unwrap_err();

    assert!(matches!(err, affil_match::MatchError::RecordsRead(_)));
    assert!(!output_path.exists());
}
