//! dockdeck-table: Columnar CLI output parsing
//!
//! Turns whitespace-aligned listings (first line headers, then data) into
//! header-keyed rows.

pub mod parser;
pub mod types;

pub use parser::{ColumnParser, split_fields};
pub use types::{COLUMN_GAP, HeaderResolution, ListingKind, ParsedTable, ReferenceHeaders};

/// Parse lines with the reference headers of a built-in listing
pub fn parse_listing<S: AsRef<str>>(kind: ListingKind, lines: &[S]) -> ParsedTable {
    ColumnParser::new(kind.reference()).parse(lines)
}
