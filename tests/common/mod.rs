//! In-memory DM catalog for integration tests.
//!
//! `FakeCatalog` answers the fixed catalog queries from per-table fixtures, keyed on the
//! bound schema and table name, so tables can be loaded in any order and concurrently.

#![allow(dead_code)]

use dm_catalog::queries::{
    COLUMNS_SQL, CONSTRAINTS_SQL, INDEXES_SQL, OWN_TABLES_SQL, SCHEMAS_SQL, SCHEMA_TABLES_SQL,
    SEQUENCE_SQL, UNIQUE_INDEXES_SQL,
};
use dm_catalog::{CancelToken, CatalogExecutor, CatalogRow, ExecutorError, RowCase};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct FakeTable {
    pub columns: Vec<CatalogRow>,
    pub constraints: Vec<CatalogRow>,
    pub indexes: Vec<CatalogRow>,
    pub sequence: Option<String>,
}

pub struct ColumnSpec<'a> {
    pub name: &'a str,
    pub data_type: &'a str,
    pub precision: Option<&'a str>,
    pub scale: Option<&'a str>,
    pub length: Option<&'a str>,
    pub nullable: bool,
    pub default: Option<&'a str>,
}

impl<'a> ColumnSpec<'a> {
    pub fn new(name: &'a str, data_type: &'a str) -> Self {
        Self {
            name,
            data_type,
            precision: None,
            scale: None,
            length: None,
            nullable: true,
            default: None,
        }
    }

    pub fn number(mut self, precision: &'a str, scale: &'a str) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn length(mut self, length: &'a str) -> Self {
        self.length = Some(length);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default(mut self, default: &'a str) -> Self {
        self.default = Some(default);
        self
    }
}

impl FakeTable {
    pub fn column(mut self, spec: ColumnSpec<'_>) -> Self {
        self.columns.push(CatalogRow::from_pairs([
            ("COLUMN_NAME", Some(spec.name)),
            ("DATA_TYPE", Some(spec.data_type)),
            ("DATA_PRECISION", spec.precision),
            ("DATA_SCALE", spec.scale),
            ("DATA_LENGTH", spec.length),
            ("NULLABLE", Some(if spec.nullable { "Y" } else { "N" })),
            ("DATA_DEFAULT", spec.default),
            ("COLUMN_COMMENT", None),
            ("IS_INCREMENT", Some("0")),
            ("IS_PRIMARY_KEY", Some("0")),
        ]));
        self
    }

    /// One constraint row; `reference` is `(schema, table, column)` for foreign keys.
    pub fn constraint(
        mut self,
        name: &str,
        kind: &str,
        column: &str,
        position: u32,
        reference: Option<(&str, &str, &str)>,
    ) -> Self {
        let position = position.to_string();
        self.constraints.push(CatalogRow::from_pairs([
            ("CONSTRAINT_NAME", Some(name)),
            ("CONSTRAINT_TYPE", Some(kind)),
            ("COLUMN_NAME", Some(column)),
            ("POSITION", Some(position.as_str())),
            ("R_CONSTRAINT_NAME", reference.map(|_| "PK_REF")),
            ("SCHEMA_REF", reference.map(|r| r.0)),
            ("TABLE_REF", reference.map(|r| r.1)),
            ("COLUMN_REF", reference.map(|r| r.2)),
            ("DELETE_RULE", reference.map(|_| "NO ACTION")),
            ("SEARCH_CONDITION", None),
        ]));
        self
    }

    pub fn index(mut self, name: &str, column: &str, unique: bool, primary: bool) -> Self {
        self.indexes.push(CatalogRow::from_pairs([
            ("INDEX_NAME", Some(name)),
            ("COLUMN_NAME", Some(column)),
            ("INDEX_IS_UNIQUE", Some(if unique { "1" } else { "0" })),
            ("INDEX_IS_PRIMARY", Some(if primary { "1" } else { "0" })),
        ]));
        self
    }

    pub fn sequence(mut self, name: &str) -> Self {
        self.sequence = Some(name.to_string());
        self
    }
}

// ============================================================================
// Fake executor
// ============================================================================

#[derive(Default)]
pub struct FakeCatalog {
    tables: HashMap<(String, String), FakeTable>,
    identity: Option<String>,
    row_case: RowCase,
    calls: Mutex<Vec<&'static str>>,
    round_trips: AtomicUsize,
    cancel_after: Option<(&'static str, CancelToken)>,
}

impl FakeCatalog {
    pub fn new(identity: &str) -> Self {
        Self {
            identity: Some(identity.to_string()),
            ..Default::default()
        }
    }

    pub fn with_table(mut self, schema: &str, name: &str, table: FakeTable) -> Self {
        self.tables.insert((schema.to_string(), name.to_string()), table);
        self
    }

    /// Report labels in lower case, as a driver configured to lower them would.
    pub fn lowering_labels(mut self) -> Self {
        self.row_case = RowCase::Lower;
        self
    }

    /// Fire `token` right after answering `sql`.
    pub fn cancel_after(mut self, sql: &'static str, token: CancelToken) -> Self {
        self.cancel_after = Some((sql, token));
        self
    }

    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }

    /// Query names in call order (`columns`, `constraints`, ...).
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn table(&self, params: &[&str]) -> Option<&FakeTable> {
        match params {
            [schema, name] => self.tables.get(&(schema.to_string(), name.to_string())),
            [name] => self
                .tables
                .iter()
                .find(|((_, table), _)| table.as_str() == *name)
                .map(|(_, t)| t),
            _ => None,
        }
    }

    fn lower(&self, rows: Vec<CatalogRow>) -> Vec<CatalogRow> {
        if self.row_case != RowCase::Lower {
            return rows;
        }
        rows.into_iter()
            .map(|row| {
                let mut lowered = CatalogRow::new();
                for label in row.labels() {
                    lowered.push(label.to_lowercase(), row.text(label));
                }
                lowered
            })
            .collect()
    }

    fn answer(&self, sql: &str, params: &[&str]) -> Result<(&'static str, Vec<CatalogRow>), ExecutorError> {
        let table = self.table(params);
        let answer = if sql == COLUMNS_SQL {
            ("columns", table.map(|t| t.columns.clone()).unwrap_or_default())
        } else if sql == CONSTRAINTS_SQL {
            ("constraints", table.map(|t| t.constraints.clone()).unwrap_or_default())
        } else if sql == INDEXES_SQL {
            ("indexes", table.map(|t| t.indexes.clone()).unwrap_or_default())
        } else if sql == UNIQUE_INDEXES_SQL {
            let rows = table
                .map(|t| {
                    t.indexes
                        .iter()
                        .filter(|r| r.get("INDEX_IS_UNIQUE") == Some("1"))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            ("unique_indexes", rows)
        } else if sql == SEQUENCE_SQL {
            let rows = table
                .and_then(|t| t.sequence.as_deref())
                .map(|seq| vec![CatalogRow::from_pairs([("SEQUENCE_NAME", Some(seq))])])
                .unwrap_or_default();
            ("sequence", rows)
        } else if sql == SCHEMAS_SQL {
            let mut schemas: Vec<&str> = self.tables.keys().map(|(s, _)| s.as_str()).collect();
            schemas.sort();
            schemas.dedup();
            let rows = schemas
                .into_iter()
                .map(|s| CatalogRow::from_pairs([("USERNAME", Some(s))]))
                .collect();
            ("schemas", rows)
        } else if sql == OWN_TABLES_SQL || sql == SCHEMA_TABLES_SQL {
            let owner = params
                .first()
                .map(|s| s.to_string())
                .or_else(|| self.identity.as_ref().map(|i| i.to_uppercase()))
                .unwrap_or_default();
            let mut names: Vec<&str> = self
                .tables
                .keys()
                .filter(|(s, _)| *s == owner)
                .map(|(_, t)| t.as_str())
                .collect();
            names.sort();
            let rows = names
                .into_iter()
                .map(|t| CatalogRow::from_pairs([("TABLE_NAME", Some(t))]))
                .collect();
            ("tables", rows)
        } else {
            return Err(ExecutorError::Query {
                sql: sql.trim().to_string(),
                message: "unknown catalog query".to_string(),
            });
        };
        Ok(answer)
    }
}

impl CatalogExecutor for FakeCatalog {
    fn query_all(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>, ExecutorError> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        let (kind, rows) = self.answer(sql, params)?;
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(kind);
        }
        if let Some((trigger, token)) = &self.cancel_after {
            if *trigger == sql {
                token.cancel();
            }
        }
        Ok(self.lower(rows))
    }

    fn session_identity(&self) -> Option<String> {
        self.identity.clone()
    }

    fn active_row_case(&self) -> RowCase {
        self.row_case
    }
}

// ============================================================================
// Shared fixture
// ============================================================================

/// `ADMIN.CUSTOMERS`, `ADMIN.ORDERS` (composite key) and `ADMIN.ORDER_LINES`
/// (composite foreign key to `ORDERS`), plus `SALES.REGIONS`.
pub fn shop(identity: &str) -> FakeCatalog {
    let customers = FakeTable::default()
        .column(ColumnSpec::new("ID", "INTEGER").length("4").not_null())
        .column(ColumnSpec::new("NAME", "VARCHAR").length("64").not_null().default("'anonymous'"))
        .column(ColumnSpec::new("CREATED_AT", "TIMESTAMP").default("CURRENT_TIMESTAMP"))
        .constraint("PK_CUSTOMERS", "P", "ID", 1, None)
        .index("PK_CUSTOMERS", "ID", true, true)
        .sequence("SEQ_CUSTOMERS");

    let orders = FakeTable::default()
        .column(ColumnSpec::new("ORDER_YEAR", "NUMBER").number("4", "0").not_null())
        .column(ColumnSpec::new("ORDER_NO", "NUMBER").number("10", "0").not_null())
        .column(ColumnSpec::new("CUSTOMER_ID", "INTEGER").length("4").not_null())
        .column(ColumnSpec::new("TOTAL", "NUMBER").number("12", "2").default("0.00"))
        .constraint("FK_ORDERS_CUSTOMER", "R", "CUSTOMER_ID", 1, Some(("ADMIN", "CUSTOMERS", "ID")))
        .constraint("PK_ORDERS", "P", "ORDER_YEAR", 1, None)
        .constraint("PK_ORDERS", "P", "ORDER_NO", 2, None)
        .index("IDX_ORDERS_CUSTOMER", "CUSTOMER_ID", false, false)
        .index("PK_ORDERS", "ORDER_YEAR", true, true)
        .index("PK_ORDERS", "ORDER_NO", true, true);

    let order_lines = FakeTable::default()
        .column(ColumnSpec::new("LINE_ID", "INTEGER").length("4").not_null())
        .column(ColumnSpec::new("L_NO", "NUMBER").number("10", "0").not_null())
        .column(ColumnSpec::new("L_YEAR", "NUMBER").number("4", "0").not_null())
        .column(ColumnSpec::new("NOTE", "CLOB"))
        .constraint("FK_LINES_ORDER", "R", "L_NO", 2, Some(("ADMIN", "ORDERS", "ORDER_NO")))
        .constraint("FK_LINES_ORDER", "R", "L_YEAR", 1, Some(("ADMIN", "ORDERS", "ORDER_YEAR")))
        .constraint("CK_LINES_NO", "C", "L_NO", 1, None)
        .constraint("PK_LINES", "P", "LINE_ID", 1, None);

    let regions = FakeTable::default()
        .column(ColumnSpec::new("CODE", "CHAR").length("2").not_null())
        .constraint("UQ_REGIONS_CODE", "U", "CODE", 1, None)
        .index("UQ_REGIONS_CODE", "CODE", true, false);

    FakeCatalog::new(identity)
        .with_table("ADMIN", "CUSTOMERS", customers)
        .with_table("ADMIN", "ORDERS", orders)
        .with_table("ADMIN", "ORDER_LINES", order_lines)
        .with_table("SALES", "REGIONS", regions)
}
