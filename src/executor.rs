//! `CatalogExecutor` Module
//!
//! Provides the `CatalogExecutor` trait that abstracts catalog query execution.
//!
//! The introspection engine never talks to a driver directly. Everything it needs from
//! the connection (rows for a fixed catalog query, the authenticated identity, the
//! driver's row-key case convention) comes through this trait, so a DM8 ODBC connection,
//! a pooled connection or a scripted test double can be used interchangeably.

use crate::row::{CatalogRow, RowCase};
use std::fmt;

/// `CatalogExecutor` error type
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutorError {
    /// Connection could not be established or was lost
    Connection(String),
    /// The server rejected or failed the statement
    Query { sql: String, message: String },
    /// The executor gave up waiting on the server
    Timeout(String),
    /// Other execution errors
    Other(String),
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutorError::Connection(s) => {
                write!(f, "Connection error: {s}")
            }
            ExecutorError::Query { sql, message } => {
                write!(f, "Query error: {message} - SQL: {}", sql.trim())
            }
            ExecutorError::Timeout(s) => {
                write!(f, "Query timed out: {s}")
            }
            ExecutorError::Other(s) => {
                write!(f, "Execution error: {s}")
            }
        }
    }
}

impl std::error::Error for ExecutorError {}

/// SQL used by the default [`CatalogExecutor::last_insert_id`].
///
/// Returns the last identity value inserted in the current scope of the session.
pub const LAST_IDENTITY_SQL: &str = "SELECT SCOPE_IDENTITY()";

/// Trait for executing catalog queries
///
/// Parameters are positional (`?` placeholders) and always textual: every catalog
/// query filters on schema and object names only.
///
/// # Examples
///
/// ```
/// use dm_catalog::{CatalogExecutor, CatalogRow, ExecutorError, RowCase};
///
/// struct Empty;
///
/// impl CatalogExecutor for Empty {
///     fn query_all(&self, _sql: &str, _params: &[&str]) -> Result<Vec<CatalogRow>, ExecutorError> {
///         Ok(Vec::new())
///     }
///     fn session_identity(&self) -> Option<String> {
///         Some("sysdba".to_string())
///     }
///     fn active_row_case(&self) -> RowCase {
///         RowCase::Natural
///     }
/// }
///
/// assert_eq!(Empty.query_scalar("SELECT 1 FROM DUAL", &[]).unwrap(), None);
/// ```
pub trait CatalogExecutor {
    /// Execute a query and return all rows
    ///
    /// # Errors
    ///
    /// Returns `ExecutorError` if the query execution fails. Timeouts enforced by the
    /// executor surface as [`ExecutorError::Timeout`].
    fn query_all(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>, ExecutorError>;

    /// Execute a query and return the first column of the first row
    ///
    /// Returns `Ok(None)` when the query yields no rows or the value is SQL `NULL`.
    ///
    /// # Errors
    ///
    /// Returns `ExecutorError` if the query execution fails.
    fn query_scalar(&self, sql: &str, params: &[&str]) -> Result<Option<String>, ExecutorError> {
        Ok(self
            .query_all(sql, params)?
            .into_iter()
            .next()
            .and_then(|row| row.first_value().map(str::to_string)))
    }

    /// The user name the session authenticated as, if the driver knows it
    fn session_identity(&self) -> Option<String>;

    /// The case the driver applies to result-set column labels
    fn active_row_case(&self) -> RowCase;

    /// The last identity value inserted by this session
    ///
    /// # Errors
    ///
    /// Returns `ExecutorError` if the query fails or returns no value.
    fn last_insert_id(&self) -> Result<String, ExecutorError> {
        self.query_scalar(LAST_IDENTITY_SQL, &[])?
            .ok_or_else(|| ExecutorError::Other("SCOPE_IDENTITY() returned no value".to_string()))
    }
}

impl<E: CatalogExecutor + ?Sized> CatalogExecutor for &E {
    fn query_all(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>, ExecutorError> {
        (**self).query_all(sql, params)
    }

    fn query_scalar(&self, sql: &str, params: &[&str]) -> Result<Option<String>, ExecutorError> {
        (**self).query_scalar(sql, params)
    }

    fn session_identity(&self) -> Option<String> {
        (**self).session_identity()
    }

    fn active_row_case(&self) -> RowCase {
        (**self).active_row_case()
    }

    fn last_insert_id(&self) -> Result<String, ExecutorError> {
        (**self).last_insert_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockExecutor;

    #[test]
    fn test_executor_error_display() {
        let err = ExecutorError::Query {
            sql: "  SELECT 1  ".to_string(),
            message: "syntax error".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("Query error"));
        assert!(display.contains("syntax error"));
        assert!(display.ends_with("SQL: SELECT 1"));
    }

    #[test]
    fn test_executor_error_all_variants() {
        assert!(ExecutorError::Connection("x".to_string())
            .to_string()
            .contains("Connection error"));
        assert!(ExecutorError::Timeout("x".to_string())
            .to_string()
            .contains("timed out"));
        assert!(ExecutorError::Other("x".to_string())
            .to_string()
            .contains("Execution error"));
    }

    #[test]
    fn test_query_scalar_takes_first_cell() {
        let mock = MockExecutor::new().with_rows(vec![
            CatalogRow::from_pairs([("SEQUENCE_NAME", Some("SEQ_A"))]),
            CatalogRow::from_pairs([("SEQUENCE_NAME", Some("SEQ_B"))]),
        ]);
        assert_eq!(
            mock.query_scalar("SELECT 1", &[]).unwrap(),
            Some("SEQ_A".to_string())
        );
    }

    #[test]
    fn test_query_scalar_no_rows_is_none() {
        let mock = MockExecutor::new().with_rows(vec![]);
        assert_eq!(mock.query_scalar("SELECT 1", &[]).unwrap(), None);
    }

    #[test]
    fn test_last_insert_id_uses_scope_identity() {
        let mock = MockExecutor::new().with_rows(vec![CatalogRow::from_pairs([(
            "SCOPE_IDENTITY()",
            Some("42"),
        )])]);
        assert_eq!(mock.last_insert_id().unwrap(), "42");
        assert_eq!(mock.issued_sql(), vec![LAST_IDENTITY_SQL.to_string()]);
    }

    #[test]
    fn test_last_insert_id_without_value_is_error() {
        let mock = MockExecutor::new().with_rows(vec![]);
        assert!(matches!(mock.last_insert_id(), Err(ExecutorError::Other(_))));
    }
}
