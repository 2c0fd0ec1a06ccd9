use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use eicu_query::TableSchema;
use eicu_transform::{BuildReport, EnrichmentStatus};

pub fn print_build_summary(output: &Path, report: &BuildReport) {
    println!("Output: {}", output.display());
    println!("Rows: {}  Columns: {}", report.rows, report.columns);
    if !report.outcome_column_present {
        println!("Outcome column missing: every row has expired = false");
    }

    let mut sources = Table::new();
    sources.set_header(vec![header_cell("Source"), header_cell("Duplicates removed")]);
    apply_table_style(&mut sources);
    align_column(&mut sources, 1, CellAlignment::Right);
    for record in &report.deduplicated {
        let removed = if record.removed > 0 {
            Cell::new(record.removed).fg(Color::Yellow)
        } else {
            dim_cell(0)
        };
        sources.add_row(vec![Cell::new(&record.source), removed]);
    }
    println!("{sources}");

    let mut enrichments = Table::new();
    enrichments.set_header(vec![
        header_cell("Enrichment"),
        header_cell("Status"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut enrichments);
    for record in &report.enrichments {
        let (status, detail) = match &record.status {
            EnrichmentStatus::Applied { columns } => (
                Cell::new("applied").fg(Color::Green),
                Cell::new(columns.join(", ")),
            ),
            EnrichmentStatus::Skipped { reason } => (
                Cell::new("skipped").fg(Color::Yellow),
                Cell::new(reason.to_string()),
            ),
        };
        enrichments.add_row(vec![
            Cell::new(record.name).add_attribute(Attribute::Bold),
            status,
            detail,
        ]);
    }
    println!("{enrichments}");
}

pub fn print_schema(schema: &TableSchema) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Dtype"),
        header_cell("Filter type"),
    ]);
    apply_table_style(&mut table);
    for column in &schema.columns {
        table.add_row(vec![
            Cell::new(&column.name),
            dim_cell(&column.dtype),
            Cell::new(column.column_type),
        ]);
    }
    println!("{table}");
    println!("Rows: {}", schema.row_count);
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
