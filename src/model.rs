use std::fmt::{Display, Formatter};

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// One logical row of tabular data: an ordered name-to-value mapping.
///
/// Column order is insertion order from the source document. Two sources may
/// spell logically identical columns with different casing, so lookups come in
/// an exact-cased and a case-insensitive flavour. The case-insensitive lookup
/// never rewrites the stored names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Sets `name` to `value`. An exact-cased existing column is overwritten
    /// in place; otherwise the column is appended, preserving order.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(field) = self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            field.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Exact-cased lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Case-insensitive lookup; returns the first matching column's value.
    #[must_use]
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        let wanted = name.to_lowercase();
        self.fields
            .iter()
            .find(|(existing, _)| existing.to_lowercase() == wanted)
            .map(|(_, value)| value.as_str())
    }

    /// Column names in insertion order, as originally cased.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut record = Self::default();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// An ordered sequence of [`Record`]s extracted from one source document.
///
/// All records are assumed, not enforced, to share one column set; the first
/// record's columns stand in for "the columns of the set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.records
            .first()
            .map(|record| record.columns().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

/// Declared type of an input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Spreadsheet,
    Pdf,
}

impl DocumentKind {
    /// Resolves a MIME type, bare extension, or file name into a kind.
    #[must_use]
    pub fn from_hint(hint: &str) -> Option<Self> {
        let hint = hint.trim().to_lowercase();
        match hint.as_str() {
            "application/pdf" | "pdf" => Some(Self::Pdf),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            | "application/vnd.ms-excel"
            | "xlsx"
            | "xls" => Some(Self::Spreadsheet),
            _ if hint.ends_with(".pdf") => Some(Self::Pdf),
            _ if hint.ends_with(".xlsx") || hint.ends_with(".xls") => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

/// Which of the two input documents an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSide {
    Left,
    Right,
}

impl Display for DocumentSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// Summary of one merge pass, surfaced to the caller alongside the results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub left_rows: usize,
    pub right_rows: usize,
    pub merged_rows: usize,
    /// Shared columns in left-source order, as cased in the left source.
    pub common_columns: Vec<String>,
}
