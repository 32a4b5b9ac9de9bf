//! Default-value extraction and portable casting.

use super::type_mapping::PortableType;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// Expression DM stores for "now" defaults on timestamp columns.
pub const CURRENT_TIMESTAMP: &str = "CURRENT_TIMESTAMP";

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// A column default, cast to its portable representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum DefaultValue {
    Integer(i64),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Timestamp(NaiveDateTime),
    /// Computed by the server at write time rather than a literal
    Expression(String),
}

impl DefaultValue {
    pub fn is_expression(&self) -> bool {
        matches!(self, DefaultValue::Expression(_))
    }
}

/// Extract the default of a column from the catalog's raw default text.
///
/// Primary-key columns never carry a default. A timestamp column whose default is
/// exactly `CURRENT_TIMESTAMP` gets the expression marker. Any other text mentioning
/// `timestamp` (in any case) is treated as absent. Otherwise one pair of enclosing
/// single quotes is stripped (only when the text is longer than two characters),
/// or surrounding whitespace is trimmed, and the result is cast.
pub fn extract_default(
    raw: Option<&str>,
    portable: PortableType,
    is_primary_key: bool,
) -> Option<DefaultValue> {
    if is_primary_key {
        return None;
    }
    let raw = raw?;
    if portable == PortableType::Timestamp && raw.trim() == CURRENT_TIMESTAMP {
        return Some(DefaultValue::Expression(CURRENT_TIMESTAMP.to_string()));
    }
    if raw.to_ascii_lowercase().contains("timestamp") {
        return None;
    }
    cast(portable, unquote(raw))
}

fn unquote(raw: &str) -> &str {
    if raw.len() > 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        &raw[1..raw.len() - 1]
    } else {
        raw.trim()
    }
}

/// Cast default text through the rule of `portable`.
///
/// Empty text is absent except for string-like categories. Text that does not parse
/// for a numeric or timestamp category is kept as a string.
pub fn cast(portable: PortableType, text: &str) -> Option<DefaultValue> {
    if text.is_empty() && !portable.keeps_empty_text() {
        return None;
    }
    let fallback = || DefaultValue::String(text.to_string());
    let value = match portable {
        PortableType::Integer => text
            .parse::<i64>()
            .map(DefaultValue::Integer)
            .unwrap_or_else(|_| fallback()),
        PortableType::Double => text
            .parse::<f64>()
            .map(DefaultValue::Double)
            .unwrap_or_else(|_| fallback()),
        PortableType::Decimal => Decimal::from_str(text)
            .map(DefaultValue::Decimal)
            .unwrap_or_else(|_| fallback()),
        PortableType::Timestamp => parse_timestamp(text)
            .map(DefaultValue::Timestamp)
            .unwrap_or_else(fallback),
        PortableType::String | PortableType::Text | PortableType::Binary => fallback(),
    };
    Some(value)
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
