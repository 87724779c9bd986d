use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use affil_match::MatchSummary;
use affil_model::ConfidenceTier;
use affil_registry::ExtractionSummary;

use crate::commands::HarvestReport;

pub fn print_harvest_summary(report: &HarvestReport) {
    let outcome = &report.outcome;
    println!("Records: {}", report.records_path.display());
    println!("Canonical IDs: {}", report.ids_path.display());

    let mut table = metric_table();
    table.add_row(vec![Cell::new("Filter"), Cell::new(&report.config.filter)]);
    table.add_row(vec![
        Cell::new("Stop reason"),
        stop_reason_cell(outcome.stop_reason.label(), outcome.stop_reason.is_clean()),
    ]);
    table.add_row(vec![
        Cell::new("Pages"),
        Cell::new(format!(
            "{} / {} ({} rows each)",
            outcome.pages_completed, outcome.pages_planned, report.config.rows
        )),
    ]);
    table.add_row(vec![Cell::new("Documents"), Cell::new(outcome.records.len())]);
    table.add_row(vec![
        Cell::new("With canonical ID"),
        Cell::new(outcome.records_with_canonical_id()),
    ]);
    table.add_row(vec![
        Cell::new("Without affiliations"),
        dim_cell(outcome.empty_records()),
    ]);
    table.add_row(vec![
        Cell::new("Distinct canonical IDs"),
        Cell::new(outcome.canonical_ids.len()),
    ]);
    table.add_row(vec![
        Cell::new("Failed requests"),
        count_cell(outcome.failed_requests, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Items skipped"),
        count_cell(outcome.items_skipped, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Affiliation entries skipped"),
        count_cell(outcome.entries_skipped, Color::Yellow),
    ]);
    align_column(&mut table, 1, CellAlignment::Right);
    println!("{table}");

    if !outcome.stop_reason.is_clean()
        && let Some(cursor) = &outcome.last_cursor
    {
        eprintln!(
            "Harvest stopped early ({}). Resume with: --start-cursor '{cursor}'",
            outcome.stop_reason
        );
    }
}

pub fn print_extraction_summary(summary: &ExtractionSummary, output: &Path) {
    println!("Label table: {}", output.display());

    let mut table = metric_table();
    table.add_row(vec![Cell::new("IDs requested"), Cell::new(summary.ids_requested)]);
    table.add_row(vec![Cell::new("IDs found"), Cell::new(summary.ids_found)]);
    table.add_row(vec![
        Cell::new("IDs missing from dump"),
        count_cell(summary.ids_missing.len(), Color::Yellow),
    ]);
    table.add_row(vec![Cell::new("Rows written"), Cell::new(summary.rows_written)]);
    table.add_row(vec![Cell::new("Dump objects"), Cell::new(summary.dump_objects)]);
    table.add_row(vec![
        Cell::new("Dump objects skipped"),
        count_cell(summary.dump_objects_skipped, Color::Yellow),
    ]);
    align_column(&mut table, 1, CellAlignment::Right);
    println!("{table}");
}

pub fn print_match_summary(summary: &MatchSummary, output: &Path) {
    println!("Matches: {}", output.display());

    let mut table = Table::new();
    table.set_header(vec![header_cell("Match status"), header_cell("Rows")]);
    apply_table_style(&mut table);
    for tier in ConfidenceTier::all() {
        table.add_row(vec![
            tier_cell(*tier),
            Cell::new(summary.tier_count(*tier)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.rows).add_attribute(Attribute::Bold),
    ]);
    align_column(&mut table, 1, CellAlignment::Right);
    println!("{table}");

    let mut dropped = metric_table();
    dropped.add_row(vec![Cell::new("Documents"), Cell::new(summary.documents)]);
    dropped.add_row(vec![Cell::new("Names scored"), Cell::new(summary.names_scored)]);
    dropped.add_row(vec![
        Cell::new("Names below cutoff"),
        count_cell(summary.names_below_cutoff, Color::Yellow),
    ]);
    dropped.add_row(vec![
        Cell::new("Unresolved records"),
        count_cell(summary.unresolved_records, Color::Yellow),
    ]);
    dropped.add_row(vec![
        Cell::new("Names on unresolved records"),
        count_cell(summary.names_unresolved, Color::Yellow),
    ]);
    align_column(&mut dropped, 1, CellAlignment::Right);
    println!("{dropped}");
}

fn metric_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table);
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn tier_cell(tier: ConfidenceTier) -> Cell {
    let color = match tier {
        ConfidenceTier::High => Color::Green,
        ConfidenceTier::Moderate => Color::Blue,
        ConfidenceTier::Low => Color::Yellow,
        ConfidenceTier::NoReliable => Color::DarkGrey,
    };
    Cell::new(tier.label()).fg(color)
}

fn stop_reason_cell(label: &str, clean: bool) -> Cell {
    if clean {
        Cell::new(label).fg(Color::Green)
    } else {
        Cell::new(label).fg(Color::Red).add_attribute(Attribute::Bold)
    }
}

fn count_cell<T: PartialOrd + Default + ToString>(count: T, color: Color) -> Cell {
    if count > T::default() {
        Cell::new(count.to_string())
            .fg(color)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
