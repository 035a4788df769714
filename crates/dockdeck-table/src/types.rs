//! Table and header types

use serde::{Deserialize, Serialize};

/// Separator used when joining cells back into a columnar line
pub const COLUMN_GAP: &str = "   ";

/// Expected column labels for one listing kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceHeaders {
    labels: Vec<String>,
}

impl ReferenceHeaders {
    /// Create a reference set, dropping repeated labels
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if !unique.contains(&label) {
                unique.push(label);
            }
        }
        Self { labels: unique }
    }

    /// Labels in reference order
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of labels
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Listings with built-in reference headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    /// `docker ps`
    Containers,
    /// `docker images`
    Images,
}

impl ListingKind {
    /// Reference header set for this listing
    #[must_use]
    pub fn reference(self) -> ReferenceHeaders {
        match self {
            ListingKind::Containers => ReferenceHeaders::new([
                "CONTAINER ID",
                "IMAGE",
                "COMMAND",
                "CREATED",
                "STATUS",
                "PORTS",
                "NAMES",
            ]),
            ListingKind::Images => {
                ReferenceHeaders::new(["REPOSITORY", "TAG", "IMAGE ID", "CREATED", "SIZE"])
            }
        }
    }
}

/// How the header row was resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "path", content = "headers", rename_all = "snake_case")]
pub enum HeaderResolution {
    /// Header line split into as many labels as expected
    ExactMatch(Vec<String>),
    /// Reference labels found inside the header line, in reference order
    SubstringFallback(Vec<String>),
    /// Nothing matched; full reference set
    ReferenceFallback(Vec<String>),
}

impl HeaderResolution {
    /// Resolved headers
    #[must_use]
    pub fn headers(&self) -> &[String] {
        match self {
            HeaderResolution::ExactMatch(h)
            | HeaderResolution::SubstringFallback(h)
            | HeaderResolution::ReferenceFallback(h) => h,
        }
    }

    /// Take the resolved headers
    #[must_use]
    pub fn into_headers(self) -> Vec<String> {
        match self {
            HeaderResolution::ExactMatch(h)
            | HeaderResolution::SubstringFallback(h)
            | HeaderResolution::ReferenceFallback(h) => h,
        }
    }
}

/// Header-keyed rows parsed from columnar output
///
/// Every row has exactly `headers.len()` cells, including tables read back
/// from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTable")]
pub struct ParsedTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Serialized table, padded through [`ParsedTable::new`] on the way in
#[derive(Deserialize)]
struct RawTable {
    headers: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<String>>,
}

impl From<RawTable> for ParsedTable {
    fn from(raw: RawTable) -> Self {
        ParsedTable::new(raw.headers, raw.rows)
    }
}

impl ParsedTable {
    /// Build a table, padding or truncating rows to the header count
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Column labels
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Whether there are no headers and no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Index of a column by label
    #[must_use]
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell at `row` in column `header`
    #[must_use]
    pub fn cell(&self, row: usize, header: &str) -> Option<&str> {
        let col = self.column_index(header)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// All values of one column
    #[must_use]
    pub fn column(&self, header: &str) -> Vec<&str> {
        match self.column_index(header) {
            Some(col) => self
                .rows
                .iter()
                .filter_map(|r| r.get(col).map(String::as_str))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Headers joined back into a columnar header line
    #[must_use]
    pub fn header_line(&self) -> String {
        self.headers.join(COLUMN_GAP)
    }

    /// Split into headers and rows
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<String>>) {
        (self.headers, self.rows)
    }
}
