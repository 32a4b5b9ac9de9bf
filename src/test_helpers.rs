//! Scripted executor for tests.
//!
//! `MockExecutor` answers queries from a FIFO of canned results and records every
//! statement it was asked to run, so tests can assert on round trips as well as on the
//! assembled descriptors.

use crate::executor::{CatalogExecutor, ExecutorError};
use crate::row::{CatalogRow, RowCase};
use std::collections::VecDeque;
use std::sync::Mutex;

type Scripted = Result<Vec<CatalogRow>, ExecutorError>;

#[derive(Debug, Default)]
pub struct MockExecutor {
    results: Mutex<VecDeque<Scripted>>,
    issued: Mutex<Vec<(String, Vec<String>)>>,
    identity: Option<String>,
    row_case: RowCase,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful result set.
    pub fn with_rows(self, rows: Vec<CatalogRow>) -> Self {
        self.push(Ok(rows));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, error: ExecutorError) -> Self {
        self.push(Err(error));
        self
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_row_case(mut self, row_case: RowCase) -> Self {
        self.row_case = row_case;
        self
    }

    fn push(&self, scripted: Scripted) {
        if let Ok(mut results) = self.results.lock() {
            results.push_back(scripted);
        }
    }

    /// Every statement run so far, in order.
    pub fn issued_sql(&self) -> Vec<String> {
        self.issued
            .lock()
            .map(|issued| issued.iter().map(|(sql, _)| sql.clone()).collect())
            .unwrap_or_default()
    }

    /// Parameters bound to every statement run so far, in order.
    pub fn issued_params(&self) -> Vec<Vec<String>> {
        self.issued
            .lock()
            .map(|issued| issued.iter().map(|(_, params)| params.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of scripted results not consumed yet.
    pub fn pending(&self) -> usize {
        self.results.lock().map(|r| r.len()).unwrap_or_default()
    }
}

impl CatalogExecutor for MockExecutor {
    fn query_all(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>, ExecutorError> {
        if let Ok(mut issued) = self.issued.lock() {
            issued.push((
                sql.to_string(),
                params.iter().map(|p| p.to_string()).collect(),
            ));
        }
        self.results
            .lock()
            .map_err(|_| ExecutorError::Other("mock executor poisoned".to_string()))?
            .pop_front()
            .unwrap_or_else(|| {
                Err(ExecutorError::Other(format!(
                    "no scripted result for query: {}",
                    sql.trim()
                )))
            })
    }

    fn session_identity(&self) -> Option<String> {
        self.identity.clone()
    }

    fn active_row_case(&self) -> RowCase {
        self.row_case
    }
}

/// Row builder for a columns-query row.
#[allow(clippy::too_many_arguments)]
pub fn column_row(
    name: &str,
    data_type: &str,
    precision: Option<&str>,
    scale: Option<&str>,
    length: Option<&str>,
    nullable: bool,
    default: Option<&str>,
    primary_key: bool,
) -> CatalogRow {
    CatalogRow::from_pairs([
        ("COLUMN_NAME", Some(name)),
        ("DATA_TYPE", Some(data_type)),
        ("DATA_PRECISION", precision),
        ("DATA_SCALE", scale),
        ("DATA_LENGTH", length),
        ("NULLABLE", Some(if nullable { "Y" } else { "N" })),
        ("DATA_DEFAULT", default),
        ("COLUMN_COMMENT", None),
        ("IS_INCREMENT", Some("0")),
        ("IS_PRIMARY_KEY", Some(if primary_key { "1" } else { "0" })),
    ])
}

/// Row builder for a constraints-query row.
pub fn constraint_row(
    name: &str,
    kind: &str,
    column: &str,
    position: u32,
    reference: Option<(&str, &str, &str)>,
) -> CatalogRow {
    let position = position.to_string();
    let (ref_schema, ref_table, ref_column) = match reference {
        Some((s, t, c)) => (Some(s), Some(t), Some(c)),
        None => (None, None, None),
    };
    CatalogRow::from_pairs([
        ("CONSTRAINT_NAME", Some(name)),
        ("CONSTRAINT_TYPE", Some(kind)),
        ("COLUMN_NAME", Some(column)),
        ("POSITION", Some(position.as_str())),
        ("R_CONSTRAINT_NAME", reference.map(|_| "PK_REF")),
        ("SCHEMA_REF", ref_schema),
        ("TABLE_REF", ref_table),
        ("COLUMN_REF", ref_column),
        ("DELETE_RULE", reference.map(|_| "CASCADE")),
        ("SEARCH_CONDITION", None),
        ("TABLE_NAME", Some("T")),
    ])
}

/// Row builder for an indexes-query row.
pub fn index_row(name: &str, column: &str, unique: bool, primary: bool) -> CatalogRow {
    CatalogRow::from_pairs([
        ("INDEX_NAME", Some(name)),
        ("COLUMN_NAME", Some(column)),
        ("INDEX_IS_UNIQUE", Some(if unique { "1" } else { "0" })),
        ("INDEX_IS_PRIMARY", Some(if primary { "1" } else { "0" })),
    ])
}
