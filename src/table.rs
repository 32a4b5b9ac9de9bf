//! Assembled table descriptor.

use crate::column::ColumnDescriptor;
use crate::constraint::{CheckConstraint, ForeignKeyDescriptor, KeyConstraint};
use crate::index::IndexDescriptor;
use crate::name::ResolvedName;
use indexmap::IndexMap;
use sea_query::{Alias, Index, IndexCreateStatement, Table, TableCreateStatement};
use serde::Serialize;

/// Everything known about one table, view or materialized view.
///
/// Built fresh by [`crate::CatalogSchema::load_table`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDescriptor {
    pub schema: String,
    pub name: String,
    pub full_name: String,
    /// In catalog ordinal order
    pub columns: IndexMap<String, ColumnDescriptor>,
    /// Primary key column names in key order
    pub primary_key: Vec<String>,
    pub foreign_keys: IndexMap<String, ForeignKeyDescriptor>,
    pub uniques: Vec<KeyConstraint>,
    pub checks: Vec<CheckConstraint>,
    pub indexes: Vec<IndexDescriptor>,
    pub sequence_name: Option<String>,
}

impl TableDescriptor {
    pub(crate) fn new(name: &ResolvedName, columns: IndexMap<String, ColumnDescriptor>) -> Self {
        Self {
            schema: name.schema.clone(),
            name: name.name.clone(),
            full_name: name.full_name.clone(),
            columns,
            primary_key: Vec::new(),
            foreign_keys: IndexMap::new(),
            uniques: Vec::new(),
            checks: Vec::new(),
            indexes: Vec::new(),
            sequence_name: None,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.get(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.primary_key.iter().filter_map(|name| self.columns.get(name))
    }

    /// `CREATE TABLE` statement reproducing columns and primary key.
    pub fn to_create_statement(&self) -> TableCreateStatement {
        let mut stmt = Table::create();
        stmt.table(Alias::new(self.name.clone()));
        for column in self.columns.values() {
            stmt.col(&mut column.to_column_def());
        }
        if !self.primary_key.is_empty() {
            let mut pk = Index::create();
            for name in &self.primary_key {
                pk.col(Alias::new(name.clone()));
            }
            stmt.primary_key(&mut pk);
        }
        stmt.to_owned()
    }

    /// `CREATE INDEX` statements for the secondary indexes.
    pub fn to_index_statements(&self) -> Vec<IndexCreateStatement> {
        self.indexes
            .iter()
            .filter(|index| !index.is_primary && !index.columns.is_empty())
            .map(|index| {
                let mut stmt = Index::create();
                stmt.name(index.name.as_str()).table(Alias::new(self.name.clone()));
                if index.is_unique {
                    stmt.unique();
                }
                for column in &index.columns {
                    stmt.col(Alias::new(column.clone()));
                }
                stmt.to_owned()
            })
            .collect()
    }
}
