//! # dm-catalog
//!
//! Catalog introspection for DM (Dameng) databases.
//!
//! Turns the rows of DM's catalog views into one cross-referenced [`TableDescriptor`] per
//! table: columns with portable types and typed defaults, primary key, foreign keys with
//! positionally aligned columns, unique and check constraints, indexes and the sequence
//! behind an auto-increment key. Queries run through a caller-supplied
//! [`CatalogExecutor`]; an ODBC implementation is available behind the `odbc` feature.
//!
//! ```
//! use dm_catalog::{CatalogExecutor, CatalogRow, CatalogSchema, ExecutorError, RowCase, Session};
//!
//! struct EmptyCatalog;
//!
//! impl CatalogExecutor for EmptyCatalog {
//!     fn query_all(&self, _sql: &str, _params: &[&str]) -> Result<Vec<CatalogRow>, ExecutorError> {
//!         Ok(Vec::new())
//!     }
//!     fn session_identity(&self) -> Option<String> {
//!         None
//!     }
//!     fn active_row_case(&self) -> RowCase {
//!         RowCase::Natural
//!     }
//! }
//!
//! let schema = CatalogSchema::new(EmptyCatalog, Session::new("ADMIN", RowCase::Natural));
//! assert!(schema.load_table("ORDERS").unwrap().is_none());
//! ```

pub mod cache;
pub mod column;
pub mod config;
pub mod constraint;
pub mod error;
pub mod executor;
mod fetch;
pub mod index;
#[cfg(any(feature = "metrics", feature = "tracing"))]
pub mod metrics;
pub mod name;
#[cfg(feature = "odbc")]
pub mod odbc;
pub mod queries;
pub mod row;
pub mod schema;
mod sequence;
pub mod session;
pub mod table;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use cache::SchemaCache;
pub use column::{
    builder::TypeCategory, ColumnDescriptor, ColumnSchemaBuilder, DefaultValue, PortableType,
};
pub use config::CatalogConfig;
pub use constraint::{
    CheckConstraint, Constraint, ConstraintKind, ForeignKeyAction, ForeignKeyDescriptor,
    KeyConstraint, TableConstraints,
};
pub use error::{CatalogError, Result};
pub use executor::{CatalogExecutor, ExecutorError};
pub use fetch::QueryKind;
pub use index::IndexDescriptor;
pub use name::{quote_simple_table_name, quote_table_name, NameResolver, ResolvedName};
#[cfg(feature = "odbc")]
pub use odbc::OdbcExecutor;
pub use row::{CatalogRow, RowCase};
pub use schema::CatalogSchema;
pub use session::{CancelToken, Session};
pub use table::TableDescriptor;
