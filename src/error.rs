//! Error types for catalog introspection.
//!
//! A table that does not exist is not an error: [`crate::CatalogSchema::load_table`]
//! returns `Ok(None)` for it. Everything here aborts assembly of the table being loaded.

use crate::executor::ExecutorError;
use thiserror::Error;

/// Main error type for introspection operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The executor failed a catalog query (connectivity, syntax, timeout)
    #[error("Catalog query failed: {0}")]
    CatalogQueryFailed(#[from] ExecutorError),

    /// A numeric facet (length, precision, scale) was not an integer
    #[error("Malformed {facet} facet {value:?} on column {column}")]
    MalformedFacet {
        column: String,
        facet: &'static str,
        value: String,
    },

    /// More than one constraint tagged as primary key on a single table
    #[error("Table {table} reports more than one primary key: {}", names.join(", "))]
    AmbiguousPrimaryKey { table: String, names: Vec<String> },

    /// Rows of one foreign key disagree about what they reference
    #[error("Foreign key {constraint} is inconsistent: {reason}")]
    InconsistentForeignKey { constraint: String, reason: String },

    /// The dialect does not offer this capability
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The caller cancelled the load before it completed
    #[error("Catalog introspection cancelled")]
    Cancelled,

    /// A cache warm-up coroutine panicked while loading a table
    #[error("Loading table {table} panicked during cache warm-up")]
    WarmupPanicked { table: String },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl CatalogError {
    /// Create an `InconsistentForeignKey` error
    pub fn inconsistent_fk(constraint: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::InconsistentForeignKey {
            constraint: constraint.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error reports bad catalog data rather than a failed query.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            CatalogError::MalformedFacet { .. }
                | CatalogError::AmbiguousPrimaryKey { .. }
                | CatalogError::InconsistentForeignKey { .. }
        )
    }
}

/// Result type alias for introspection operations.
pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_error_converts_to_query_failed() {
        let err: CatalogError = ExecutorError::Timeout("30s".to_string()).into();
        assert!(matches!(err, CatalogError::CatalogQueryFailed(ExecutorError::Timeout(_))));
        assert!(!err.is_data_integrity());
    }

    #[test]
    fn test_ambiguous_primary_key_display() {
        let err = CatalogError::AmbiguousPrimaryKey {
            table: "ADMIN.ORDERS".to_string(),
            names: vec!["PK_A".to_string(), "PK_B".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Table ADMIN.ORDERS reports more than one primary key: PK_A, PK_B"
        );
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_malformed_facet_display() {
        let err = CatalogError::MalformedFacet {
            column: "PRICE".to_string(),
            facet: "scale",
            value: "two".to_string(),
        };
        assert_eq!(err.to_string(), "Malformed scale facet \"two\" on column PRICE");
    }
}
