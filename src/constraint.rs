//! Constraint resolution.
//!
//! One catalog query returns a row per (constraint, column). Rows are grouped by
//! `(type, name)`, ordered by ordinal position inside each group, and turned into one
//! [`Constraint`] per group. Foreign keys align local and referenced columns through the
//! shared ordinal position of the row.

use crate::column::ColumnDescriptor;
use crate::error::{CatalogError, Result};
use crate::executor::CatalogExecutor;
use crate::fetch::{Fetcher, QueryKind};
use crate::name::ResolvedName;
use crate::queries::CONSTRAINTS_SQL;
use crate::row::CatalogRow;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Constraint type tag as stored in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    Unique,
    Check,
}

impl ConstraintKind {
    /// Decode a catalog tag. Anything but `P`, `R`, `U` or `C` is not a constraint we model.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "P" => Some(ConstraintKind::PrimaryKey),
            "R" => Some(ConstraintKind::ForeignKey),
            "U" => Some(ConstraintKind::Unique),
            "C" => Some(ConstraintKind::Check),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "P",
            ConstraintKind::ForeignKey => "R",
            ConstraintKind::Unique => "U",
            ConstraintKind::Check => "C",
        }
    }
}

/// Referential action of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
    /// Rule text the dialect reported but this crate does not know
    Other(String),
}

impl ForeignKeyAction {
    pub fn from_rule(rule: &str) -> Self {
        match rule.trim().to_ascii_uppercase().as_str() {
            "NO ACTION" => ForeignKeyAction::NoAction,
            "RESTRICT" => ForeignKeyAction::Restrict,
            "CASCADE" => ForeignKeyAction::Cascade,
            "SET NULL" => ForeignKeyAction::SetNull,
            "SET DEFAULT" => ForeignKeyAction::SetDefault,
            _ => ForeignKeyAction::Other(rule.to_string()),
        }
    }
}

impl fmt::Display for ForeignKeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForeignKeyAction::NoAction => f.write_str("NO ACTION"),
            ForeignKeyAction::Restrict => f.write_str("RESTRICT"),
            ForeignKeyAction::Cascade => f.write_str("CASCADE"),
            ForeignKeyAction::SetNull => f.write_str("SET NULL"),
            ForeignKeyAction::SetDefault => f.write_str("SET DEFAULT"),
            ForeignKeyAction::Other(rule) => f.write_str(rule),
        }
    }
}

/// Primary key or unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyConstraint {
    pub name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyDescriptor {
    pub name: String,
    pub columns: Vec<String>,
    pub foreign_schema: String,
    pub foreign_table: String,
    /// Positionally aligned with `columns`
    pub foreign_columns: Vec<String>,
    pub on_delete: Option<ForeignKeyAction>,
}

impl ForeignKeyDescriptor {
    /// `(local, referenced)` column pairs in key order.
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.foreign_columns.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckConstraint {
    pub name: String,
    pub columns: Vec<String>,
    pub expression: String,
}

/// One resolved constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    PrimaryKey(KeyConstraint),
    ForeignKey(ForeignKeyDescriptor),
    Unique(KeyConstraint),
    Check(CheckConstraint),
}

impl Constraint {
    pub fn name(&self) -> &str {
        match self {
            Constraint::PrimaryKey(c) | Constraint::Unique(c) => &c.name,
            Constraint::ForeignKey(fk) => &fk.name,
            Constraint::Check(c) => &c.name,
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::PrimaryKey(_) => ConstraintKind::PrimaryKey,
            Constraint::ForeignKey(_) => ConstraintKind::ForeignKey,
            Constraint::Unique(_) => ConstraintKind::Unique,
            Constraint::Check(_) => ConstraintKind::Check,
        }
    }

    pub fn columns(&self) -> &[String] {
        match self {
            Constraint::PrimaryKey(c) | Constraint::Unique(c) => &c.columns,
            Constraint::ForeignKey(fk) => &fk.columns,
            Constraint::Check(c) => &c.columns,
        }
    }
}

/// Every constraint of one table, split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableConstraints {
    pub primary_key: Option<KeyConstraint>,
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
    pub uniques: Vec<KeyConstraint>,
    pub checks: Vec<CheckConstraint>,
}

impl TableConstraints {
    fn push(&mut self, constraint: Constraint) {
        match constraint {
            Constraint::PrimaryKey(pk) => self.primary_key = Some(pk),
            Constraint::ForeignKey(fk) => self.foreign_keys.push(fk),
            Constraint::Unique(unique) => self.uniques.push(unique),
            Constraint::Check(check) => self.checks.push(check),
        }
    }
}

/// One decoded row of the constraints query.
#[derive(Debug, Clone)]
struct ConstraintColumn {
    column: String,
    position: i64,
    foreign_schema: Option<String>,
    foreign_table: Option<String>,
    foreign_column: Option<String>,
    delete_rule: Option<String>,
    search_condition: Option<String>,
}

impl ConstraintColumn {
    fn from_row(row: &CatalogRow) -> Result<Self> {
        let column = row.text("COLUMN_NAME").unwrap_or_default();
        let position = match row.get("POSITION").map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw.parse().map_err(|_| CatalogError::MalformedFacet {
                column: column.clone(),
                facet: "position",
                value: raw.to_string(),
            })?,
        };
        Ok(Self {
            column,
            position,
            foreign_schema: row.text("SCHEMA_REF"),
            foreign_table: row.text("TABLE_REF"),
            foreign_column: row.text("COLUMN_REF"),
            delete_rule: row.text("DELETE_RULE"),
            search_condition: row.text("SEARCH_CONDITION"),
        })
    }
}

/// Group normalized constraint rows of `table` into typed constraints.
pub fn resolve_constraints(table: &ResolvedName, rows: &[CatalogRow]) -> Result<TableConstraints> {
    let mut groups: IndexMap<(ConstraintKind, String), Vec<ConstraintColumn>> = IndexMap::new();

    for row in rows {
        let (Some(name), Some(tag)) = (row.get("CONSTRAINT_NAME"), row.get("CONSTRAINT_TYPE")) else {
            log::warn!("Skipping constraint row of {} without name or type", table.full_name);
            continue;
        };
        let Some(kind) = ConstraintKind::from_tag(tag) else {
            log::warn!(
                "Skipping constraint {} of {}: unsupported type tag {:?}",
                name,
                table.full_name,
                tag
            );
            continue;
        };
        groups
            .entry((kind, name.to_string()))
            .or_default()
            .push(ConstraintColumn::from_row(row)?);
    }

    let primary_keys: Vec<String> = groups
        .keys()
        .filter(|(kind, _)| *kind == ConstraintKind::PrimaryKey)
        .map(|(_, name)| name.clone())
        .collect();
    if primary_keys.len() > 1 {
        return Err(CatalogError::AmbiguousPrimaryKey {
            table: table.full_name.clone(),
            names: primary_keys,
        });
    }

    let mut constraints = TableConstraints::default();
    for ((kind, name), mut members) in groups {
        members.sort_by_key(|m| m.position);
        constraints.push(build_constraint(kind, name, table, members)?);
    }
    Ok(constraints)
}

fn build_constraint(
    kind: ConstraintKind,
    name: String,
    table: &ResolvedName,
    members: Vec<ConstraintColumn>,
) -> Result<Constraint> {
    let columns: Vec<String> = members.iter().map(|m| m.column.clone()).collect();
    Ok(match kind {
        ConstraintKind::PrimaryKey => Constraint::PrimaryKey(KeyConstraint { name, columns }),
        ConstraintKind::Unique => Constraint::Unique(KeyConstraint { name, columns }),
        ConstraintKind::Check => {
            let expression = members
                .first()
                .and_then(|m| m.search_condition.clone())
                .unwrap_or_default();
            Constraint::Check(CheckConstraint {
                name,
                columns,
                expression,
            })
        }
        ConstraintKind::ForeignKey => Constraint::ForeignKey(build_foreign_key(name, table, columns, &members)?),
    })
}

fn build_foreign_key(
    name: String,
    table: &ResolvedName,
    columns: Vec<String>,
    members: &[ConstraintColumn],
) -> Result<ForeignKeyDescriptor> {
    let Some(first) = members.first() else {
        return Err(CatalogError::inconsistent_fk(name, "no columns"));
    };
    let Some(foreign_table) = first.foreign_table.clone() else {
        return Err(CatalogError::inconsistent_fk(name, "referenced table is missing"));
    };
    let foreign_schema = first
        .foreign_schema
        .clone()
        .unwrap_or_else(|| table.schema.clone());

    let mut foreign_columns = Vec::with_capacity(members.len());
    for member in members {
        if member.foreign_table.as_deref() != Some(foreign_table.as_str())
            || member.foreign_schema.as_deref().unwrap_or(&table.schema) != foreign_schema
        {
            return Err(CatalogError::inconsistent_fk(
                name,
                format!(
                    "column {} references {}.{} instead of {}.{}",
                    member.column,
                    member.foreign_schema.as_deref().unwrap_or(&table.schema),
                    member.foreign_table.as_deref().unwrap_or("?"),
                    foreign_schema,
                    foreign_table
                ),
            ));
        }
        let Some(foreign_column) = member.foreign_column.clone() else {
            return Err(CatalogError::inconsistent_fk(
                name,
                format!("no referenced column at position {}", member.position),
            ));
        };
        foreign_columns.push(foreign_column);
    }

    Ok(ForeignKeyDescriptor {
        on_delete: first.delete_rule.as_deref().map(ForeignKeyAction::from_rule),
        name,
        columns,
        foreign_schema,
        foreign_table,
        foreign_columns,
    })
}

/// Run the constraints query for `table` and resolve the result.
pub(crate) fn load_constraints<E: CatalogExecutor + ?Sized>(
    fetcher: &Fetcher<'_, E>,
    table: &ResolvedName,
) -> Result<TableConstraints> {
    let rows = fetcher.rows(
        QueryKind::Constraints,
        CONSTRAINTS_SQL,
        &[table.schema.as_str(), table.name.as_str()],
    )?;
    resolve_constraints(table, &rows)
}

/// Flag the primary-key columns and drop any default read for them. Returns the key
/// column names in key order.
pub(crate) fn annotate_primary_key(
    table: &ResolvedName,
    columns: &mut IndexMap<String, ColumnDescriptor>,
    primary_key: &KeyConstraint,
) -> Vec<String> {
    for name in &primary_key.columns {
        match columns.get_mut(name) {
            Some(column) => {
                column.is_primary_key = true;
                column.default_value = None;
            }
            None => log::warn!(
                "Primary key {} of {} names unknown column {}",
                primary_key.name,
                table.full_name,
                name
            ),
        }
    }
    primary_key.columns.clone()
}
