//! Table schema assembly.
//!
//! [`CatalogSchema`] drives the loaders for one table in a fixed order: columns,
//! constraints (with primary-key back-annotation and the sequence lookup), then indexes.
//! A table whose columns query returns nothing is reported as absent before any other
//! query is issued. The assembler keeps no memory between calls; caching belongs to
//! [`crate::SchemaCache`].

use crate::column::{load_columns, DefaultValue};
use crate::config::CatalogConfig;
use crate::constraint::{
    annotate_primary_key, load_constraints, CheckConstraint, ForeignKeyDescriptor, KeyConstraint,
    TableConstraints,
};
use crate::error::{CatalogError, Result};
use crate::executor::CatalogExecutor;
use crate::fetch::{Fetcher, QueryKind};
use crate::index::{find_unique_indexes, load_indexes, IndexDescriptor};
use crate::name::{quote_simple_table_name, ResolvedName};
use crate::queries::{OWN_TABLES_SQL, SCHEMAS_SQL, SCHEMA_TABLES_SQL};
use crate::sequence::find_sequence;
use crate::session::{CancelToken, Session};
use crate::table::TableDescriptor;
use indexmap::IndexMap;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Catalog introspection over one executor and session.
#[derive(Debug)]
pub struct CatalogSchema<E> {
    executor: E,
    session: Session,
}

impl<E: CatalogExecutor> CatalogSchema<E> {
    pub fn new(executor: E, session: Session) -> Self {
        Self { executor, session }
    }

    /// Settle the session from the executor and `config`, then wrap both.
    pub fn establish(executor: E, config: &CatalogConfig) -> Self {
        let session = Session::establish(&executor, config);
        Self::new(executor, session)
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn default_schema(&self) -> &str {
        self.session.default_schema()
    }

    pub fn resolve_table_name(&self, raw: &str) -> ResolvedName {
        self.session.resolver().resolve(raw)
    }

    fn fetcher<'a>(&'a self, cancel: Option<&'a CancelToken>) -> Fetcher<'a, E> {
        Fetcher::new(&self.executor, &self.session, cancel)
    }

    /// Load the full descriptor of `raw_name`, or `Ok(None)` if no such table exists.
    pub fn load_table(&self, raw_name: &str) -> Result<Option<TableDescriptor>> {
        self.load(raw_name, None)
    }

    /// As [`CatalogSchema::load_table`], stopping before the next catalog query once
    /// `cancel` fires.
    pub fn load_table_with_cancel(
        &self,
        raw_name: &str,
        cancel: &CancelToken,
    ) -> Result<Option<TableDescriptor>> {
        self.load(raw_name, Some(cancel))
    }

    fn load(&self, raw_name: &str, cancel: Option<&CancelToken>) -> Result<Option<TableDescriptor>> {
        let name = self.resolve_table_name(raw_name);

        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::load_table_span(&name.schema, &name.name).entered();

        let fetcher = self.fetcher(cancel);
        let result = assemble(&fetcher, &name);
        match &result {
            Ok(Some(table)) => {
                log::info!(
                    "Loaded table {} ({} columns, {} foreign keys, {} indexes)",
                    table.full_name,
                    table.columns.len(),
                    table.foreign_keys.len(),
                    table.indexes.len()
                );
                #[cfg(feature = "metrics")]
                METRICS.record_table_loaded();
            }
            Ok(None) => {
                log::debug!("Table {} not found in schema {}", name.name, name.schema);
                #[cfg(feature = "metrics")]
                METRICS.record_table_not_found();
            }
            Err(CatalogError::Cancelled) => log::debug!("Loading {} cancelled", name.full_name),
            Err(e) => log::warn!("Failed to load table {}: {}", name.full_name, e),
        }
        result
    }

    /// Names of the schemas owned by non-system users.
    pub fn list_schemas(&self) -> Result<Vec<String>> {
        let rows = self.fetcher(None).rows(QueryKind::Schemas, SCHEMAS_SQL, &[])?;
        Ok(rows.iter().filter_map(|row| row.text("USERNAME")).collect())
    }

    /// Tables, views and materialized views of `schema`; of the session user when `schema`
    /// is `None` or empty.
    pub fn list_tables(&self, schema: Option<&str>) -> Result<Vec<String>> {
        let fetcher = self.fetcher(None);
        let rows = match schema.filter(|s| !s.is_empty()) {
            None => fetcher.rows(QueryKind::Tables, OWN_TABLES_SQL, &[])?,
            Some(schema) => fetcher.rows(QueryKind::Tables, SCHEMA_TABLES_SQL, &[schema])?,
        };
        Ok(rows.iter().filter_map(|row| row.text("TABLE_NAME")).collect())
    }

    /// Unique indexes of `raw_name` as `index name -> columns`.
    pub fn find_unique_indexes(&self, raw_name: &str) -> Result<IndexMap<String, Vec<String>>> {
        let name = self.resolve_table_name(raw_name);
        find_unique_indexes(&self.fetcher(None), &name)
    }

    /// Every constraint of `raw_name`, without loading columns.
    pub fn table_constraints(&self, raw_name: &str) -> Result<TableConstraints> {
        let name = self.resolve_table_name(raw_name);
        load_constraints(&self.fetcher(None), &name)
    }

    pub fn table_primary_key(&self, raw_name: &str) -> Result<Option<KeyConstraint>> {
        Ok(self.table_constraints(raw_name)?.primary_key)
    }

    pub fn table_foreign_keys(&self, raw_name: &str) -> Result<Vec<ForeignKeyDescriptor>> {
        Ok(self.table_constraints(raw_name)?.foreign_keys)
    }

    pub fn table_uniques(&self, raw_name: &str) -> Result<Vec<KeyConstraint>> {
        Ok(self.table_constraints(raw_name)?.uniques)
    }

    pub fn table_checks(&self, raw_name: &str) -> Result<Vec<CheckConstraint>> {
        Ok(self.table_constraints(raw_name)?.checks)
    }

    pub fn table_indexes(&self, raw_name: &str) -> Result<Vec<IndexDescriptor>> {
        let name = self.resolve_table_name(raw_name);
        load_indexes(&self.fetcher(None), &name)
    }

    /// DM has no column-level default constraints.
    pub fn table_default_values(&self, _raw_name: &str) -> Result<IndexMap<String, DefaultValue>> {
        Err(CatalogError::UnsupportedOperation(
            "DM does not support default value constraints".to_string(),
        ))
    }

    /// DM releases savepoints implicitly, so this issues nothing.
    pub fn release_savepoint(&self, name: &str) -> Result<()> {
        log::debug!("Savepoint {} is released implicitly", name);
        Ok(())
    }

    /// Identity value generated by the session's last insert.
    pub fn last_insert_id(&self) -> Result<String> {
        Ok(self.executor.last_insert_id()?)
    }

    pub fn quote_simple_table_name(&self, name: &str) -> String {
        quote_simple_table_name(name)
    }
}

fn assemble<E: CatalogExecutor + ?Sized>(
    fetcher: &Fetcher<'_, E>,
    name: &ResolvedName,
) -> Result<Option<TableDescriptor>> {
    let Some(columns) = load_columns(fetcher, name)? else {
        return Ok(None);
    };
    let mut table = TableDescriptor::new(name, columns);

    let constraints = load_constraints(fetcher, name)?;
    if let Some(primary_key) = &constraints.primary_key {
        table.primary_key = annotate_primary_key(name, &mut table.columns, primary_key);
        if table.sequence_name.is_none() {
            table.sequence_name = find_sequence(fetcher, &name.name)?;
        }
    }
    table.foreign_keys = constraints
        .foreign_keys
        .into_iter()
        .map(|fk| (fk.name.clone(), fk))
        .collect();
    table.uniques = constraints.uniques;
    table.checks = constraints.checks;

    table.indexes = load_indexes(fetcher, name)?;
    fetcher.check_cancelled()?;
    Ok(Some(table))
}
