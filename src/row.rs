//! Catalog result rows and row-key case handling.
//!
//! DM drivers hand every catalog value back as text (numeric facets included), and,
//! depending on how the connection was configured, may fold result-set labels to lower
//! case. The fixed catalog queries alias their columns in upper case, so rows are
//! folded back to upper case once per session convention before any field is read.

use serde::{Deserialize, Serialize};

/// Case convention a driver applies to result-set column labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowCase {
    /// Labels are folded to upper case
    Upper,
    /// Labels are folded to lower case
    Lower,
    /// Labels are returned as the query spelled them
    #[default]
    Natural,
}

impl RowCase {
    /// Whether rows decoded under this convention need their labels rewritten.
    pub fn needs_normalization(self) -> bool {
        matches!(self, RowCase::Lower)
    }
}

/// One row returned by a catalog query.
///
/// Cells keep the order of the select list. A cell value of `None` is SQL `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRow {
    cells: Vec<(String, Option<String>)>,
}

impl CatalogRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(label, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(label, value)| (label.into(), value.map(Into::into)))
                .collect(),
        }
    }

    /// Append a cell.
    pub fn push(&mut self, label: impl Into<String>, value: Option<String>) {
        self.cells.push((label.into(), value));
    }

    /// Value of the cell labelled `label`; `None` when the label is missing or the value
    /// is `NULL`.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(l, _)| l == label)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Owned copy of [`CatalogRow::get`].
    pub fn text(&self, label: &str) -> Option<String> {
        self.get(label).map(str::to_string)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.cells.iter().any(|(l, _)| l == label)
    }

    /// Value of the first cell, as used by scalar queries.
    pub fn first_value(&self) -> Option<&str> {
        self.cells.first().and_then(|(_, v)| v.as_deref())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Rewrite labels into the canonical (upper) case when `case` requires it.
    pub fn normalized(mut self, case: RowCase) -> Self {
        if case.needs_normalization() {
            for (label, _) in &mut self.cells {
                *label = label.to_uppercase();
            }
        }
        self
    }
}

/// Normalize every row of a result set under one session convention.
pub fn normalize_rows(rows: Vec<CatalogRow>, case: RowCase) -> Vec<CatalogRow> {
    if !case.needs_normalization() {
        return rows;
    }
    rows.into_iter().map(|row| row.normalized(case)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower_row() -> CatalogRow {
        CatalogRow::from_pairs([("column_name", Some("ID")), ("data_default", None)])
    }

    #[test]
    fn test_get_missing_and_null() {
        let row = lower_row();
        assert_eq!(row.get("column_name"), Some("ID"));
        assert_eq!(row.get("data_default"), None);
        assert!(row.contains("data_default"));
        assert_eq!(row.get("nope"), None);
        assert!(!row.contains("nope"));
    }

    #[test]
    fn test_lower_case_rows_are_upper_cased() {
        let row = lower_row().normalized(RowCase::Lower);
        assert_eq!(row.get("COLUMN_NAME"), Some("ID"));
        assert_eq!(row.get("column_name"), None);
        assert_eq!(row.labels().collect::<Vec<_>>(), vec!["COLUMN_NAME", "DATA_DEFAULT"]);
    }

    #[test]
    fn test_natural_and_upper_rows_untouched() {
        for case in [RowCase::Natural, RowCase::Upper] {
            let row = lower_row().normalized(case);
            assert_eq!(row.get("column_name"), Some("ID"));
        }
    }

    #[test]
    fn test_normalize_rows_applies_to_all() {
        let rows = normalize_rows(vec![lower_row(), lower_row()], RowCase::Lower);
        assert!(rows.iter().all(|r| r.get("COLUMN_NAME") == Some("ID")));
    }

    #[test]
    fn test_first_value_and_push() {
        let mut row = CatalogRow::new();
        assert!(row.is_empty());
        row.push("SEQUENCE_NAME", Some("SEQ_USERS".to_string()));
        assert_eq!(row.first_value(), Some("SEQ_USERS"));
        assert_eq!(row.len(), 1);
    }

    #[test]
    fn test_row_case_deserializes_lowercase() {
        let case: RowCase = serde_json::from_str("\"lower\"").unwrap();
        assert_eq!(case, RowCase::Lower);
    }
}
