use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use cmdi_cli::types::{ArchiveListing, ConversionResult};

pub fn print_summary(result: &ConversionResult) {
    println!("Source: {}", result.source.display());
    println!("Archive: {}", result.archive.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rows"),
        header_cell("Skipped"),
        header_cell("Documents"),
        header_cell("Duplicates"),
        header_cell("Warnings"),
        header_cell("Time (ms)"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 0..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(result.rows_read).add_attribute(Attribute::Bold),
        count_cell(result.rows_skipped, Color::DarkGrey),
        Cell::new(result.documents.len())
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        count_cell(result.duplicates.len(), Color::Yellow),
        count_cell(result.warnings.len(), Color::Yellow),
        dim_cell(result.duration_ms),
    ]);
    println!("{table}");
    if !result.duplicates.is_empty() {
        eprintln!("Duplicate resource names (last row wins):");
        for name in &result.duplicates {
            eprintln!("- {name}");
        }
    }
    if !result.warnings.is_empty() {
        eprintln!("Warnings:");
        for warning in &result.warnings {
            eprintln!("- {warning}");
        }
    }
}

pub fn print_archives(archives: &[ArchiveListing]) {
    if archives.is_empty() {
        println!("No archives.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Archive"), header_cell("Size (bytes)")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for archive in archives {
        table.add_row(vec![
            Cell::new(&archive.name).fg(Color::Blue),
            Cell::new(archive.size_bytes),
        ]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
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
