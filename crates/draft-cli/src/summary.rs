use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use draft_cli::pipeline::GenerateOutcome;
use draft_model::Manifest;

pub fn print_summary(outcome: &GenerateOutcome) {
    let manifest = &outcome.report.manifest;
    println!("Archive: {}", outcome.archive_path.display());
    if let Some(path) = &outcome.manifest_path {
        println!("Manifest: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rows"),
        header_cell("Generated"),
        header_cell("Failed"),
        header_cell("Size"),
        header_cell("Time"),
    ]);
    apply_table_style(&mut table);
    for index in 0..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(manifest.total_rows),
        Cell::new(manifest.generated).fg(Color::Green),
        count_cell(manifest.failed(), Color::Red),
        Cell::new(format_bytes(outcome.report.archive.total_bytes())),
        Cell::new(format!("{} ms", outcome.report.duration.as_millis())),
    ]);
    println!("{table}");
    print_failures(manifest);
}

/// List failed rows; prints nothing for a clean manifest.
pub fn print_failures(manifest: &Manifest) {
    if manifest.is_clean() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Label"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for failure in &manifest.failures {
        table.add_row(vec![
            Cell::new(failure.row_number()),
            Cell::new(&failure.label),
            Cell::new(&failure.message).fg(Color::Red),
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

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}

fn format_bytes(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = KIB * 1024;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
