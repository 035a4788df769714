//! Plain text rendering

use dockdeck_table::ParsedTable;

const SEPARATOR: &str = "  ";

/// Render a table with left-aligned, padded columns
pub fn table(table: &ParsedTable) -> String {
    let headers = table.headers();
    if headers.is_empty() {
        return String::new();
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in table.rows() {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers, &widths);
    for row in table.rows() {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (idx, (cell, width)) in cells.iter().zip(widths).enumerate() {
        out.push_str(cell);
        if idx != last {
            let pad = width.saturating_sub(cell.chars().count());
            out.push_str(&" ".repeat(pad));
            out.push_str(SEPARATOR);
        }
    }
    out.push('\n');
}
