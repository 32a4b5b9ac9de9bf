//! Column DDL fragments in DM syntax.
//!
//! `ColumnSchemaBuilder` renders the part of a `CREATE TABLE` / `ALTER TABLE` statement
//! that follows the column name, e.g. `NUMBER(12,2) DEFAULT 0 NOT NULL`. The order of
//! the pieces depends on the type category:
//!
//! | category    | format                                                    |
//! |-------------|-----------------------------------------------------------|
//! | primary key | `{type}{length}{check}{append}`                           |
//! | numeric     | `{type}{length}{unsigned}{default}{notnull}{check}{append}` |
//! | other       | `{type}{length}{default}{notnull}{check}{append}`           |

use super::default::DefaultValue;
use super::type_mapping::PortableType;
use super::ColumnDescriptor;
use std::fmt;

/// Rendering category of a column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    PrimaryKey,
    Numeric,
    String,
    Time,
    Other,
}

impl From<PortableType> for TypeCategory {
    fn from(portable: PortableType) -> Self {
        match portable {
            PortableType::Integer | PortableType::Double | PortableType::Decimal => {
                TypeCategory::Numeric
            }
            PortableType::String | PortableType::Text => TypeCategory::String,
            PortableType::Timestamp => TypeCategory::Time,
            PortableType::Binary => TypeCategory::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchemaBuilder {
    type_name: String,
    category: TypeCategory,
    length: Option<String>,
    not_null: Option<bool>,
    default: Option<DefaultValue>,
    check: Option<String>,
    append: Option<String>,
    unsigned: bool,
}

impl ColumnSchemaBuilder {
    pub fn new(type_name: impl Into<String>, category: TypeCategory) -> Self {
        Self {
            type_name: type_name.into(),
            category,
            length: None,
            not_null: None,
            default: None,
            check: None,
            append: None,
            unsigned: false,
        }
    }

    /// Builder reproducing an introspected column.
    pub fn for_column(column: &ColumnDescriptor) -> Self {
        let category = if column.is_primary_key {
            TypeCategory::PrimaryKey
        } else {
            column.portable_type.into()
        };
        let mut builder = Self::new(column.db_type.clone(), category);

        let length = match column.portable_type {
            PortableType::Decimal => column
                .precision
                .zip(column.scale)
                .map(|(p, s)| format!("{p},{s}")),
            PortableType::Integer if column.db_type.to_uppercase().contains("NUMBER") => {
                column.precision.map(|p| p.to_string())
            }
            PortableType::String => column.size.map(|s| s.to_string()),
            _ => None,
        };
        if let Some(length) = length {
            builder = builder.length(length);
        }

        builder.not_null = Some(!column.nullable);
        builder.default = column.default_value.clone();
        builder
    }

    /// Length or `precision,scale` rendered inside parentheses.
    pub fn length(mut self, length: impl Into<String>) -> Self {
        self.length = Some(length.into());
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = Some(true);
        self
    }

    pub fn null(mut self) -> Self {
        self.not_null = Some(false);
        self
    }

    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Default computed by the server, rendered verbatim.
    pub fn default_expression(mut self, expression: impl Into<String>) -> Self {
        self.default = Some(DefaultValue::Expression(expression.into()));
        self
    }

    pub fn check(mut self, expression: impl Into<String>) -> Self {
        self.check = Some(expression.into());
        self
    }

    /// Raw SQL appended after everything else.
    pub fn append(mut self, sql: impl Into<String>) -> Self {
        self.append = Some(sql.into());
        self
    }

    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    pub fn category(&self) -> TypeCategory {
        self.category
    }

    fn length_string(&self) -> String {
        match self.length.as_deref() {
            Some(length) if !length.is_empty() => format!("({length})"),
            _ => String::new(),
        }
    }

    fn not_null_string(&self) -> &'static str {
        match self.not_null {
            Some(true) => " NOT NULL",
            Some(false) => " NULL",
            None => "",
        }
    }

    fn unsigned_string(&self) -> &'static str {
        if self.unsigned {
            " UNSIGNED"
        } else {
            ""
        }
    }

    fn default_string(&self) -> String {
        let Some(default) = &self.default else {
            return String::new();
        };
        let literal = match default {
            DefaultValue::Integer(v) => v.to_string(),
            DefaultValue::Double(v) => v.to_string(),
            DefaultValue::Decimal(v) => v.to_string(),
            DefaultValue::String(v) => quote_value(v),
            DefaultValue::Timestamp(v) => quote_value(&v.format("%Y-%m-%d %H:%M:%S").to_string()),
            DefaultValue::Expression(expr) => expr.clone(),
        };
        format!(" DEFAULT {literal}")
    }

    fn check_string(&self) -> String {
        self.check
            .as_deref()
            .map(|expr| format!(" CHECK ({expr})"))
            .unwrap_or_default()
    }

    fn append_string(&self) -> String {
        self.append
            .as_deref()
            .map(|sql| format!(" {sql}"))
            .unwrap_or_default()
    }
}

fn quote_value(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl fmt::Display for ColumnSchemaBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)?;
        f.write_str(&self.length_string())?;
        match self.category {
            TypeCategory::PrimaryKey => {}
            TypeCategory::Numeric => {
                f.write_str(self.unsigned_string())?;
                f.write_str(&self.default_string())?;
                f.write_str(self.not_null_string())?;
            }
            _ => {
                f.write_str(&self.default_string())?;
                f.write_str(self.not_null_string())?;
            }
        }
        f.write_str(&self.check_string())?;
        f.write_str(&self.append_string())
    }
}
