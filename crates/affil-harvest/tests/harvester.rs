//! Harvest loop behaviour against scripted page sources.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use affil_harvest::{
    HarvestConfig, HarvestError, Harvester, PageSource, Result, StopReason, WorksPage,
};
use serde_json::{Value, json};

/// Replays a fixed sequence of responses and records the cursors requested.
struct ScriptedSource {
    responses: RefCell<VecDeque<Result<WorksPage>>>,
    cursors: RefCell<Vec<String>>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<WorksPage>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            cursors: RefCell::new(Vec::new()),
        }
    }

    fn cursors(&self) -> Vec<String> {
        self.cursors.borrow().clone()
    }
}

impl PageSource for ScriptedSource {
    fn fetch_page(&self, cursor: &str) -> Result<WorksPage> {
        self.cursors.borrow_mut().push(cursor.to_string());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(page(vec![], None)))
    }
}

fn page(items: Vec<Value>, next: Option<&str>) -> WorksPage {
    WorksPage {
        items,
        next_cursor: next.map(String::from),
        total_results: None,
    }
}

fn unavailable() -> HarvestError {
    HarvestError::Status {
        status: 503,
        body: "unavailable".to_string(),
    }
}

fn config(rows: u32, expected_total: u64) -> HarvestConfig {
    HarvestConfig {
        mailto: "team@example.org".to_string(),
        rows,
        expected_total,
        request_delay_ms: 1,
        max_consecutive_failures: 3,
        ..HarvestConfig::default()
    }
}

fn work(doi: &str, affiliations: Value) -> Value {
    json!({"DOI": doi, "author": [{"given": "A", "family": "B", "affiliation": affiliations}]})
}

fn ror(id: &str) -> Value {
    json!([{"id": format!("https://ror.org/{id}"), "id-type": "ROR", "asserted-by": "publisher"}])
}

#[test]
fn stops_at_planned_page_count() {
    let source = ScriptedSource::new(vec![
        Ok(page(vec![work("10.1/a", json!([]))], Some("c1"))),
        Ok(page(vec![work("10.1/b", json!([]))], Some("c2"))),
        Ok(page(vec![work("10.1/c", json!([]))], Some("c3"))),
    ]);

    let outcome = Harvester::new(&source, config(1, 2)).run().unwrap();

    assert_eq!(outcome.stop_reason, StopReason::PageBudgetReached);
    assert_eq!(outcome.pages_planned, 2);
    assert_eq!(outcome.pages_completed, 2);
    assert_eq!(source.cursors(), vec!["*".to_string(), "c1".to_string()]);
    assert_eq!(outcome.last_cursor.as_deref(), Some("c1"));
    assert!(outcome.record("10.1/c").is_none());
}

#[test]
fn missing_next_cursor_ends_harvest_early() {
    let source = ScriptedSource::new(vec![
        Ok(page(vec![work("10.1/a", json!([]))], Some("c1"))),
        Ok(page(vec![work("10.1/b", json!([]))], None)),
    ]);

    let outcome = Harvester::new(&source, config(1, 10)).run().unwrap();

    assert_eq!(outcome.stop_reason, StopReason::CursorExhausted);
    assert_eq!(outcome.pages_planned, 10);
    assert_eq!(outcome.pages_completed, 2);
    assert_eq!(source.cursors().len(), 2);
    assert_eq!(outcome.records.len(), 2);
}

#[test]
fn empty_page_ends_harvest() {
    let source = ScriptedSource::new(vec![
        Ok(page(vec![work("10.1/a", json!([]))], Some("c1"))),
        Ok(page(vec![], Some("c1"))),
    ]);

    let outcome = Harvester::new(&source, config(1, 10)).run().unwrap();

    assert_eq!(outcome.stop_reason, StopReason::CursorExhausted);
    assert_eq!(outcome.pages_completed, 2);
    assert_eq!(outcome.records.len(), 1);
}

#[test]
fn transient_failure_retries_same_cursor() {
    let source = ScriptedSource::new(vec![
        Ok(page(vec![work("10.1/a", json!([]))], Some("c1"))),
        Err(unavailable()),
        Ok(page(vec![work("10.1/b", json!([]))], Some("c2"))),
    ]);

    let outcome = Harvester::new(&source, config(1, 2)).run().unwrap();

    assert_eq!(outcome.stop_reason, StopReason::PageBudgetReached);
    assert_eq!(outcome.failed_requests, 1);
    assert_eq!(outcome.pages_completed, 2);
    assert_eq!(
        source.cursors(),
        vec!["*".to_string(), "c1".to_string(), "c1".to_string()]
    );
    assert_eq!(outcome.records.len(), 2);
}

#[test]
fn repeated_failures_keep_partial_results() {
    let source = ScriptedSource::new(vec![
        Ok(page(vec![work("10.1/a", json!([]))], Some("c1"))),
        Err(unavailable()),
        Err(unavailable()),
        Err(unavailable()),
    ]);

    let outcome = Harvester::new(&source, config(1, 5)).run().unwrap();

    assert_eq!(outcome.stop_reason, StopReason::TooManyFailures);
    assert_eq!(outcome.failed_requests, 3);
    assert_eq!(outcome.pages_completed, 1);
    assert!(outcome.record("10.1/a").is_some());
}

#[test]
fn malformed_envelope_stops_without_retry() {
    let source = ScriptedSource::new(vec![
        Ok(page(vec![work("10.1/a", json!([]))], Some("c1"))),
        Err(HarvestError::MalformedPage("missing `message.items`".to_string())),
        Ok(page(vec![work("10.1/b", json!([]))], Some("c2"))),
    ]);

    let outcome = Harvester::new(&source, config(1, 5)).run().unwrap();

    assert_eq!(outcome.stop_reason, StopReason::MalformedResponse);
    assert_eq!(source.cursors().len(), 2);
    assert_eq!(outcome.records.len(), 1);
}

#[test]
fn invalid_config_is_rejected_before_any_request() {
    let source = ScriptedSource::new(vec![]);
    let result = Harvester::new(&source, config(0, 5)).run();

    assert!(matches!(result, Err(HarvestError::InvalidConfig(_))));
    assert!(source.cursors().is_empty());
}

#[test]
fn harvesting_same_pages_twice_is_deterministic() {
    let pages = || {
        vec![
            Ok(page(
                vec![
                    work("10.1/a", json!([{"name": "Example University", "id": ror("ABC123")}])),
                    work("10.1/b", json!([{"name": "Other Institute", "acronym": ["OI"]}])),
                ],
                Some("c1"),
            )),
            Ok(page(vec![], None)),
        ]
    };

    let first = Harvester::new(ScriptedSource::new(pages()), config(2, 4))
        .run()
        .unwrap();
    let second = Harvester::new(ScriptedSource::new(pages()), config(2, 4))
        .run()
        .unwrap();

    assert_eq!(first.records, second.records);
    assert_eq!(first.canonical_ids, second.canonical_ids);
}

#[test]
fn names_and_acronyms_are_collected_in_encounter_order() {
    let item = json!({
        "DOI": "10.1/x",
        "author": [
            {"affiliation": [
                {"name": "Example University", "acronym": ["EU", "ExU"], "id": ror("ABC123")},
                {"name": "Dept of Physics"}
            ]},
            {"affiliation": [{"name": "Example University", "acronym": ["EU"]}]},
            {"given": "No", "family": "Affiliation"}
        ]
    });
    let source = ScriptedSource::new(vec![Ok(page(vec![item], None))]);

    let outcome = Harvester::new(&source, config(1, 1)).run().unwrap();
    let record = outcome.record("10.1/x").unwrap();

    // (1 + 2) + (1 + 0) + (1 + 1)
    assert_eq!(record.affiliation_names.len(), 6);
    assert_eq!(
        record.affiliation_names,
        vec![
            "Example University",
            "EU",
            "ExU",
            "Dept of Physics",
            "Example University",
            "EU"
        ]
    );
    assert_eq!(record.canonical_id.as_deref(), Some("ABC123"));
    assert_eq!(
        outcome.canonical_ids.iter().collect::<Vec<_>>(),
        vec!["ABC123"]
    );
}

#[test]
fn document_without_affiliations_is_present_and_empty() {
    let source = ScriptedSource::new(vec![Ok(page(
        vec![
            json!({"DOI": "10.1/no-authors"}),
            json!({"DOI": "10.1/no-affiliations", "author": [{"given": "A", "family": "B"}]}),
            json!({"title": ["missing DOI"]}),
        ],
        None,
    ))]);

    let outcome = Harvester::new(&source, config(3, 3)).run().unwrap();

    assert_eq!(outcome.records.len(), 2);
    assert!(outcome.record("10.1/no-authors").unwrap().is_empty());
    assert!(outcome.record("10.1/no-affiliations").unwrap().is_empty());
    assert_eq!(outcome.empty_records(), 2);
    assert_eq!(outcome.items_skipped, 1);
}

#[test]
fn odd_affiliation_values_keep_the_document() {
    let source = ScriptedSource::new(vec![Ok(page(
        vec![work(
            "10.1/odd",
            json!([
                {"name": "Example University", "acronym": [null], "id": ror("ABC123")},
                {"name": 7},
                null
            ]),
        )],
        None,
    ))]);

    let outcome = Harvester::new(&source, config(1, 1)).run().unwrap();
    let record = outcome.record("10.1/odd").unwrap();

    assert_eq!(record.affiliation_names, vec!["Example University".to_string()]);
    assert_eq!(record.canonical_id.as_deref(), Some("ABC123"));
    assert!(outcome.canonical_ids.contains("ABC123"));
    assert_eq!(outcome.items_skipped, 0);
    assert_eq!(outcome.entries_skipped, 1);
}

#[test]
fn document_repeated_across_pages_keeps_later_occurrence() {
    let source = ScriptedSource::new(vec![
        Ok(page(
            vec![work("10.1/x", json!([{"name": "Old Name"}]))],
            Some("c1"),
        )),
        Ok(page(
            vec![work("10.1/x", json!([{"name": "New Name", "id": ror("XYZ789")}]))],
            None,
        )),
    ]);

    let outcome = Harvester::new(&source, config(1, 2)).run().unwrap();
    let record = outcome.record("10.1/x").unwrap();

    assert_eq!(record.affiliation_names, vec!["New Name".to_string()]);
    assert_eq!(record.canonical_id.as_deref(), Some("XYZ789"));
}

#[test]
fn fixed_delay_separates_successful_pages() {
    let source = ScriptedSource::new(vec![
        Ok(page(vec![work("10.1/a", json!([]))], Some("c1"))),
        Ok(page(vec![work("10.1/b", json!([]))], Some("c2"))),
        Ok(page(vec![work("10.1/c", json!([]))], Some("c3"))),
    ]);
    let config = HarvestConfig {
        request_delay_ms: 40,
        ..config(1, 3)
    };

    let started = Instant::now();
    let outcome = Harvester::new(&source, config).run().unwrap();

    assert_eq!(outcome.pages_completed, 3);
    // Two pauses: between pages 1-2 and 2-3. None after the last page.
    assert!(started.elapsed() >= Duration::from_millis(80));
}
