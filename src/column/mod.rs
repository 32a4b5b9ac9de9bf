//! Column descriptors and the column loader.

pub mod builder;
pub mod default;
pub mod type_mapping;

pub use builder::ColumnSchemaBuilder;
pub use default::{extract_default, DefaultValue};
pub use type_mapping::{map_type, Facets, MappedType, PortableType};

use crate::error::{CatalogError, Result};
use crate::executor::CatalogExecutor;
use crate::fetch::{Fetcher, QueryKind};
use crate::name::ResolvedName;
use crate::queries::COLUMNS_SQL;
use crate::row::CatalogRow;
use indexmap::IndexMap;
use sea_query::{Alias, ColumnDef, Expr};
use serde::Serialize;

/// One column of an introspected table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub portable_type: PortableType,
    /// Type exactly as the catalog reports it
    pub db_type: String,
    pub size: Option<i64>,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
    pub nullable: bool,
    pub is_primary_key: bool,
    pub auto_increment: bool,
    pub default_value: Option<DefaultValue>,
    /// Empty when the column has no comment
    pub comment: String,
}

impl ColumnDescriptor {
    /// Decode one (normalized) row of the columns query.
    pub fn from_row(row: &CatalogRow) -> Result<Self> {
        let name = row.text("COLUMN_NAME").unwrap_or_default();
        let db_type = row.text("DATA_TYPE").unwrap_or_default();
        let mapped = map_type(
            &db_type,
            row.get("DATA_PRECISION"),
            row.get("DATA_SCALE"),
            row.get("DATA_LENGTH"),
        )
        .map_err(|e| CatalogError::MalformedFacet {
            column: name.clone(),
            facet: e.facet,
            value: e.value,
        })?;

        let is_primary_key = row.get("IS_PRIMARY_KEY") == Some("1");
        let default_value = extract_default(row.get("DATA_DEFAULT"), mapped.portable, is_primary_key);

        Ok(Self {
            portable_type: mapped.portable,
            db_type,
            size: mapped.facets.size,
            precision: mapped.facets.precision,
            scale: mapped.facets.scale,
            nullable: row.get("NULLABLE") == Some("Y"),
            is_primary_key,
            auto_increment: row.get("IS_INCREMENT") == Some("1"),
            default_value,
            comment: row.text("COLUMN_COMMENT").unwrap_or_default(),
            name,
        })
    }

    pub fn facets(&self) -> Facets {
        Facets {
            size: self.size,
            precision: self.precision,
            scale: self.scale,
        }
    }

    /// Convert to `SeaQuery`'s `ColumnDef` so the column can be recreated by migrations.
    ///
    /// Type, nullability, auto-increment, literal defaults, `CURRENT_TIMESTAMP` defaults
    /// and the comment are carried over. Primary keys are left to the table-level key
    /// because they may span several columns.
    pub fn to_column_def(&self) -> ColumnDef {
        let mut def = ColumnDef::new(Alias::new(self.name.clone()));
        type_mapping::apply_portable_type(self.portable_type, &self.facets(), &mut def);

        if self.nullable {
            def.null();
        } else {
            def.not_null();
        }

        if self.auto_increment {
            def.auto_increment();
        }

        match &self.default_value {
            Some(DefaultValue::Integer(v)) => {
                def.default(*v);
            }
            Some(DefaultValue::Double(v)) => {
                def.default(*v);
            }
            Some(DefaultValue::Decimal(v)) => {
                def.default(*v);
            }
            Some(DefaultValue::String(v)) => {
                def.default(v.clone());
            }
            Some(DefaultValue::Timestamp(v)) => {
                def.default(*v);
            }
            Some(DefaultValue::Expression(expr)) if expr.eq_ignore_ascii_case(default::CURRENT_TIMESTAMP) => {
                def.default(Expr::current_timestamp());
            }
            Some(DefaultValue::Expression(expr)) => {
                log::debug!("Column {}: default expression {} not replayed", self.name, expr);
            }
            None => {}
        }

        if !self.comment.is_empty() {
            def.comment(self.comment.as_str());
        }

        def
    }
}

/// Load the columns of `table` in catalog ordinal order.
///
/// Returns `Ok(None)` when the catalog knows no such table, view or materialized view.
pub(crate) fn load_columns<E: CatalogExecutor + ?Sized>(
    fetcher: &Fetcher<'_, E>,
    table: &ResolvedName,
) -> Result<Option<IndexMap<String, ColumnDescriptor>>> {
    let rows = fetcher.rows(
        QueryKind::Columns,
        COLUMNS_SQL,
        &[table.schema.as_str(), table.name.as_str()],
    )?;
    if rows.is_empty() {
        return Ok(None);
    }

    let mut columns = IndexMap::with_capacity(rows.len());
    for row in &rows {
        let column = ColumnDescriptor::from_row(row)?;
        columns.insert(column.name.clone(), column);
    }
    Ok(Some(columns))
}
