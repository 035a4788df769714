//! Columnar output parsing
//!
//! Listings like `docker ps` align columns with runs of spaces while single
//! spaces appear inside values (`2 hours ago`, `CONTAINER ID`). A line that
//! contains a run of two or more whitespace characters is therefore split on
//! those runs only. A line without such a run falls back to plain whitespace
//! splitting.

use tracing::debug;

use crate::types::{HeaderResolution, ParsedTable, ReferenceHeaders};

/// Minimum whitespace run treated as a column gap
const GAP_WIDTH: usize = 2;

/// Parser for one listing kind
#[derive(Debug, Clone)]
pub struct ColumnParser {
    reference: ReferenceHeaders,
}

impl ColumnParser {
    /// Create a parser for a reference header set
    #[must_use]
    pub fn new(reference: ReferenceHeaders) -> Self {
        Self { reference }
    }

    /// Reference headers
    #[must_use]
    pub fn reference(&self) -> &ReferenceHeaders {
        &self.reference
    }

    /// Resolve the header line against the reference set
    ///
    /// 1. Split labels matching the reference count are used as-is.
    /// 2. Otherwise reference labels found in the raw line, in reference order.
    /// 3. Otherwise the whole reference set.
    #[must_use]
    pub fn resolve_headers(&self, header_line: &str) -> HeaderResolution {
        let candidates: Vec<String> = split_fields(header_line, usize::MAX)
            .into_iter()
            .map(str::to_string)
            .collect();

        if candidates.len() == self.reference.len() && all_unique(&candidates) {
            return HeaderResolution::ExactMatch(candidates);
        }

        let found: Vec<String> = self
            .reference
            .labels()
            .iter()
            .filter(|label| header_line.contains(label.as_str()))
            .cloned()
            .collect();

        if found.is_empty() {
            HeaderResolution::ReferenceFallback(self.reference.labels().to_vec())
        } else {
            HeaderResolution::SubstringFallback(found)
        }
    }

    /// Parse raw output lines into a table
    ///
    /// Never fails. Short rows are padded with empty cells, the last cell
    /// absorbs any surplus text.
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> ParsedTable {
        let Some((header_line, data)) = lines.split_first() else {
            return ParsedTable::default();
        };

        let resolution = self.resolve_headers(header_line.as_ref());
        debug!(resolution = ?resolution, rows = data.len(), "resolved headers");

        let headers = resolution.into_headers();
        let width = headers.len();

        let rows = data
            .iter()
            .map(|line| {
                split_fields(line.as_ref(), width)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect();

        ParsedTable::new(headers, rows)
    }
}

/// Split a line into at most `max_fields` fields
///
/// The final field keeps the remainder of the line, internal whitespace
/// included.
#[must_use]
pub fn split_fields(line: &str, max_fields: usize) -> Vec<&str> {
    let line = line.trim();
    if line.is_empty() || max_fields == 0 {
        return Vec::new();
    }

    let min_run = if has_column_gap(line) { GAP_WIDTH } else { 1 };
    split_on_runs(line, max_fields, min_run)
}

/// Whether a line contains two or more consecutive whitespace characters
fn has_column_gap(line: &str) -> bool {
    let mut previous_ws = false;
    for ch in line.chars() {
        let ws = ch.is_whitespace();
        if ws && previous_ws {
            return true;
        }
        previous_ws = ws;
    }
    false
}

/// Split a trimmed line on whitespace runs of at least `min_run` characters
fn split_on_runs(line: &str, max_fields: usize, min_run: usize) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut field_start = 0;
    let mut run_start: Option<usize> = None;
    let mut run_len = 0;

    for (idx, ch) in line.char_indices() {
        if fields.len() + 1 == max_fields {
            break;
        }

        if ch.is_whitespace() {
            if run_start.is_none() {
                run_start = Some(idx);
                run_len = 0;
            }
            run_len += 1;
        } else if let Some(start) = run_start.take()
            && run_len >= min_run
        {
            fields.push(&line[field_start..start]);
            field_start = idx;
        }
    }

    fields.push(&line[field_start..]);
    fields
}

fn all_unique(labels: &[String]) -> bool {
    labels
        .iter()
        .enumerate()
        .all(|(i, label)| !labels[..i].contains(label))
}
