//! Index loading.

use crate::error::Result;
use crate::executor::CatalogExecutor;
use crate::fetch::{Fetcher, QueryKind};
use crate::name::ResolvedName;
use crate::queries::{INDEXES_SQL, UNIQUE_INDEXES_SQL};
use crate::row::CatalogRow;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDescriptor {
    pub name: String,
    /// Key columns in index position order
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_primary: bool,
}

fn flag(row: &CatalogRow, label: &str) -> bool {
    matches!(row.get(label).map(str::trim), Some("1"))
}

/// Group rows of the indexes query by index name.
///
/// Rows arrive ordered by index name then column position. Unique and primary flags are
/// read from the first row of each index. An index without key columns (function-based
/// or otherwise unmatched) keeps an empty column list.
pub fn group_indexes(rows: &[CatalogRow]) -> Vec<IndexDescriptor> {
    let mut indexes: IndexMap<String, IndexDescriptor> = IndexMap::new();
    for row in rows {
        let Some(name) = row.get("INDEX_NAME") else {
            continue;
        };
        let index = indexes
            .entry(name.to_string())
            .or_insert_with(|| IndexDescriptor {
                name: name.to_string(),
                columns: Vec::new(),
                is_unique: flag(row, "INDEX_IS_UNIQUE"),
                is_primary: flag(row, "INDEX_IS_PRIMARY"),
            });
        if let Some(column) = row.text("COLUMN_NAME") {
            index.columns.push(column);
        }
    }
    indexes.into_values().collect()
}

pub(crate) fn load_indexes<E: CatalogExecutor + ?Sized>(
    fetcher: &Fetcher<'_, E>,
    table: &ResolvedName,
) -> Result<Vec<IndexDescriptor>> {
    let rows = fetcher.rows(
        QueryKind::Indexes,
        INDEXES_SQL,
        &[table.schema.as_str(), table.name.as_str()],
    )?;
    Ok(group_indexes(&rows))
}

/// Unique indexes of `table` as `index name -> columns`.
pub(crate) fn find_unique_indexes<E: CatalogExecutor + ?Sized>(
    fetcher: &Fetcher<'_, E>,
    table: &ResolvedName,
) -> Result<IndexMap<String, Vec<String>>> {
    let rows = fetcher.rows(
        QueryKind::UniqueIndexes,
        UNIQUE_INDEXES_SQL,
        &[table.schema.as_str(), table.name.as_str()],
    )?;
    let mut uniques: IndexMap<String, Vec<String>> = IndexMap::new();
    for row in &rows {
        if let (Some(index), Some(column)) = (row.text("INDEX_NAME"), row.text("COLUMN_NAME")) {
            uniques.entry(index).or_default().push(column);
        }
    }
    Ok(uniques)
}
