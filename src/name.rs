//! Table name resolution.
//!
//! Turns a possibly qualified, possibly quoted name (`"SALES"."ORDERS"`, `SALES.ORDERS`,
//! `ORDERS`) into a [`ResolvedName`] against the session's default schema.

use serde::Serialize;
use std::fmt;

/// Identifier quote character of the DM dialect.
pub const QUOTE: char = '"';

/// A (schema, name) pair plus its display form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedName {
    pub schema: String,
    pub name: String,
    /// `name` alone when `schema` is the default schema, `schema.name` otherwise.
    pub full_name: String,
}

impl fmt::Display for ResolvedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// Resolves raw names against one default schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameResolver {
    default_schema: String,
}

impl NameResolver {
    pub fn new(default_schema: impl Into<String>) -> Self {
        Self {
            default_schema: default_schema.into(),
        }
    }

    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    /// Resolve `raw` into schema and local name.
    ///
    /// Quote characters are dropped and the name is split on its first `.`. A bare name
    /// lands in the default schema.
    ///
    /// ```
    /// use dm_catalog::NameResolver;
    ///
    /// let resolver = NameResolver::new("ADMIN");
    /// let bare = resolver.resolve("T");
    /// assert_eq!((bare.schema.as_str(), bare.name.as_str()), ("ADMIN", "T"));
    /// assert_eq!(bare.full_name, "T");
    ///
    /// let qualified = resolver.resolve("\"OTHER\".\"T\"");
    /// assert_eq!(qualified.full_name, "OTHER.T");
    /// ```
    pub fn resolve(&self, raw: &str) -> ResolvedName {
        let unquoted = raw.replace(QUOTE, "");
        let (schema, name) = match unquoted.split_once('.') {
            Some((schema, name)) => (schema.to_string(), name.to_string()),
            None => (self.default_schema.clone(), unquoted),
        };
        let full_name = self.display_name(&schema, &name);
        ResolvedName {
            schema,
            name,
            full_name,
        }
    }

    /// Display form of `schema.name`, omitting the default schema.
    pub fn display_name(&self, schema: &str, name: &str) -> String {
        if schema == self.default_schema {
            name.to_string()
        } else {
            format!("{schema}.{name}")
        }
    }
}

/// Quote a table name that carries no schema part.
///
/// Names that already contain a quote are assumed to be quoted and returned unchanged.
pub fn quote_simple_table_name(name: &str) -> String {
    if name.contains(QUOTE) {
        name.to_string()
    } else {
        format!("{QUOTE}{name}{QUOTE}")
    }
}

/// Quote a possibly qualified table name, part by part.
pub fn quote_table_name(name: &str) -> String {
    name.split('.')
        .map(quote_simple_table_name)
        .collect::<Vec<_>>()
        .join(".")
}
