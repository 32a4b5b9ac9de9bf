//! Catalog query dispatch shared by the loaders.
//!
//! Every catalog round trip of a table load goes through [`Fetcher::rows`], which is
//! where cancellation is honoured, timing and tracing happen, and rows are folded into
//! the session's canonical key case.

use crate::error::{CatalogError, Result};
use crate::executor::CatalogExecutor;
use crate::row::{normalize_rows, CatalogRow};
use crate::session::{CancelToken, Session};
use std::time::Instant;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Which fixed catalog query is being run; used for logs, spans and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Columns,
    Constraints,
    Indexes,
    UniqueIndexes,
    Sequence,
    Schemas,
    Tables,
}

impl QueryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::Columns => "columns",
            QueryKind::Constraints => "constraints",
            QueryKind::Indexes => "indexes",
            QueryKind::UniqueIndexes => "unique_indexes",
            QueryKind::Sequence => "sequence",
            QueryKind::Schemas => "schemas",
            QueryKind::Tables => "tables",
        }
    }
}

pub(crate) struct Fetcher<'a, E: ?Sized> {
    executor: &'a E,
    session: &'a Session,
    cancel: Option<&'a CancelToken>,
}

impl<'a, E: CatalogExecutor + ?Sized> Fetcher<'a, E> {
    pub(crate) fn new(executor: &'a E, session: &'a Session, cancel: Option<&'a CancelToken>) -> Self {
        Self {
            executor,
            session,
            cancel,
        }
    }

    pub(crate) fn check_cancelled(&self) -> Result<()> {
        match self.cancel {
            Some(token) if token.is_cancelled() => Err(CatalogError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Run one catalog query and return its rows with normalized labels.
    pub(crate) fn rows(&self, kind: QueryKind, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        self.check_cancelled()?;

        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::catalog_query_span(kind.as_str()).entered();

        log::debug!("Running {} catalog query {:?}", kind.as_str(), params);
        let start = Instant::now();
        let result = self.executor.query_all(sql, params);
        let elapsed = start.elapsed();

        #[cfg(feature = "metrics")]
        METRICS.record_query(kind.as_str(), elapsed, result.is_ok());

        let rows = result.map_err(|e| {
            log::debug!("{} catalog query failed after {:?}: {}", kind.as_str(), elapsed, e);
            CatalogError::CatalogQueryFailed(e)
        })?;
        Ok(normalize_rows(rows, self.session.row_case()))
    }

    /// Run a query whose answer is the first column of the first row.
    pub(crate) fn scalar(&self, kind: QueryKind, sql: &str, params: &[&str]) -> Result<Option<String>> {
        Ok(self
            .rows(kind, sql, params)?
            .into_iter()
            .next()
            .and_then(|row| row.first_value().map(str::to_string)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutorError;
    use crate::row::RowCase;
    use crate::test_helpers::MockExecutor;

    #[test]
    fn test_rows_are_normalized_with_session_case() {
        let mock = MockExecutor::new().with_rows(vec![CatalogRow::from_pairs([(
            "table_name",
            Some("USERS"),
        )])]);
        let session = Session::new("ADMIN", RowCase::Lower);
        let rows = Fetcher::new(&mock, &session, None)
            .rows(QueryKind::Tables, "SELECT 1", &[])
            .unwrap();
        assert_eq!(rows[0].get("TABLE_NAME"), Some("USERS"));
    }

    #[test]
    fn test_cancelled_token_issues_no_query() {
        let mock = MockExecutor::new().with_rows(vec![]);
        let session = Session::new("ADMIN", RowCase::Natural);
        let token = CancelToken::new();
        token.cancel();
        let err = Fetcher::new(&mock, &session, Some(&token))
            .rows(QueryKind::Columns, "SELECT 1", &[])
            .unwrap_err();
        assert!(matches!(err, CatalogError::Cancelled));
        assert!(mock.issued_sql().is_empty());
    }

    #[test]
    fn test_executor_failure_is_query_failed() {
        let mock = MockExecutor::new().with_error(ExecutorError::Connection("reset".to_string()));
        let session = Session::new("ADMIN", RowCase::Natural);
        let err = Fetcher::new(&mock, &session, None)
            .rows(QueryKind::Indexes, "SELECT 1", &[])
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::CatalogQueryFailed(ExecutorError::Connection(_))
        ));
    }

    #[test]
    fn test_scalar_of_empty_result_is_none() {
        let mock = MockExecutor::new().with_rows(vec![]);
        let session = Session::new("ADMIN", RowCase::Natural);
        let value = Fetcher::new(&mock, &session, None)
            .scalar(QueryKind::Sequence, "SELECT 1", &["T"])
            .unwrap();
        assert_eq!(value, None);
        assert_eq!(mock.issued_params(), vec![vec!["T".to_string()]]);
    }
}
