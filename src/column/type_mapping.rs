//! Type mapping between DM catalog types and portable column types.
//!
//! [`map_type`] classifies a raw catalog type and parses its numeric facets;
//! [`apply_portable_type`] goes the other way, configuring a `SeaQuery` `ColumnDef`
//! so an introspected column can be replayed into DDL by migration tooling.

use sea_query::ColumnDef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dialect-independent column category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortableType {
    Integer,
    Double,
    Decimal,
    String,
    Text,
    Binary,
    Timestamp,
}

impl PortableType {
    pub fn as_str(self) -> &'static str {
        match self {
            PortableType::Integer => "integer",
            PortableType::Double => "double",
            PortableType::Decimal => "decimal",
            PortableType::String => "string",
            PortableType::Text => "text",
            PortableType::Binary => "binary",
            PortableType::Timestamp => "timestamp",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            PortableType::Integer | PortableType::Double | PortableType::Decimal
        )
    }

    /// Categories whose empty default text is a real (empty) value rather than absent.
    pub fn keeps_empty_text(self) -> bool {
        matches!(
            self,
            PortableType::String | PortableType::Text | PortableType::Binary
        )
    }
}

impl fmt::Display for PortableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Size, precision and scale of a column. `None` means the catalog left it blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    pub size: Option<i64>,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
}

/// A facet that was neither blank nor an integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedFacet {
    pub facet: &'static str,
    pub value: String,
}

/// Output of [`map_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedType {
    pub portable: PortableType,
    pub facets: Facets,
}

/// Parse one numeric facet as the catalog reports it.
///
/// Blank or whitespace-only text (and `NULL`) is absent. Anything else must be an
/// integer; the value is not range-checked.
pub fn parse_facet(facet: &'static str, raw: Option<&str>) -> Result<Option<i64>, MalformedFacet> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    text.parse::<i64>().map(Some).map_err(|_| MalformedFacet {
        facet,
        value: text.to_string(),
    })
}

/// Classify a raw catalog type.
///
/// Checks run in a fixed order and the first match wins: `FLOAT`/`DOUBLE`, then
/// `NUMBER` (decimal when the scale is positive), `INTEGER`, `BLOB`, `CLOB`,
/// `TIMESTAMP`, and finally string. A type mentioning both `NUMBER` and `TIMESTAMP`
/// is therefore numeric.
pub fn classify(raw_type: &str, scale: Option<i64>) -> PortableType {
    let raw = raw_type.to_uppercase();
    if raw.contains("FLOAT") || raw.contains("DOUBLE") {
        PortableType::Double
    } else if raw.contains("NUMBER") {
        if scale.is_some_and(|s| s > 0) {
            PortableType::Decimal
        } else {
            PortableType::Integer
        }
    } else if raw.contains("INTEGER") {
        PortableType::Integer
    } else if raw.contains("BLOB") {
        PortableType::Binary
    } else if raw.contains("CLOB") {
        PortableType::Text
    } else if raw.contains("TIMESTAMP") {
        PortableType::Timestamp
    } else {
        PortableType::String
    }
}

/// Map a raw catalog type and its facet strings to a portable type and parsed facets.
pub fn map_type(
    raw_type: &str,
    precision: Option<&str>,
    scale: Option<&str>,
    length: Option<&str>,
) -> Result<MappedType, MalformedFacet> {
    let facets = Facets {
        size: parse_facet("length", length)?,
        precision: parse_facet("precision", precision)?,
        scale: parse_facet("scale", scale)?,
    };
    Ok(MappedType {
        portable: classify(raw_type, facets.scale),
        facets,
    })
}

/// Configure `def` with the `SeaQuery` column type matching `portable` and `facets`.
///
/// - integer → `.integer()` when the precision fits nine digits, `.big_integer()` otherwise
/// - double → `.double()`
/// - decimal → `.decimal_len(p, s)` when both facets are known, `.decimal()` otherwise
/// - string → `.string_len(n)` when the size is known, `.string()` otherwise
/// - text → `.text()`, binary → `.binary()`, timestamp → `.timestamp()`
pub(crate) fn apply_portable_type(portable: PortableType, facets: &Facets, def: &mut ColumnDef) {
    let as_u32 = |v: Option<i64>| v.and_then(|v| u32::try_from(v).ok());
    match portable {
        PortableType::Integer => {
            if facets.precision.is_some_and(|p| p <= 9) {
                def.integer();
            } else {
                def.big_integer();
            }
        }
        PortableType::Double => {
            def.double();
        }
        PortableType::Decimal => match (as_u32(facets.precision), as_u32(facets.scale)) {
            (Some(precision), Some(scale)) => {
                def.decimal_len(precision, scale);
            }
            _ => {
                def.decimal();
            }
        },
        PortableType::String => match as_u32(facets.size) {
            Some(size) => {
                def.string_len(size);
            }
            None => {
                def.string();
            }
        },
        PortableType::Text => {
            def.text();
        }
        PortableType::Binary => {
            def.binary();
        }
        PortableType::Timestamp => {
            def.timestamp();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_order() {
        assert_eq!(classify("FLOAT", None), PortableType::Double);
        assert_eq!(classify("DOUBLE PRECISION", None), PortableType::Double);
        assert_eq!(classify("NUMBER", Some(0)), PortableType::Integer);
        assert_eq!(classify("NUMBER", None), PortableType::Integer);
        assert_eq!(classify("NUMBER", Some(2)), PortableType::Decimal);
        assert_eq!(classify("INTEGER", None), PortableType::Integer);
        assert_eq!(classify("BLOB", None), PortableType::Binary);
        assert_eq!(classify("CLOB", None), PortableType::Text);
        assert_eq!(classify("TIMESTAMP(6)", None), PortableType::Timestamp);
        assert_eq!(classify("VARCHAR2", None), PortableType::String);
        assert_eq!(classify("DATE", None), PortableType::String);
    }

    #[test]
    fn test_number_wins_over_timestamp() {
        assert_eq!(classify("NUMBER_TIMESTAMP", None), PortableType::Integer);
        assert_eq!(classify("TIMESTAMP_NUMBER", Some(3)), PortableType::Decimal);
    }

    #[test]
    fn test_float_wins_over_number() {
        assert_eq!(classify("FLOAT_NUMBER", Some(2)), PortableType::Double);
    }

    #[test]
    fn test_parse_facet_blank_is_absent() {
        assert_eq!(parse_facet("length", None), Ok(None));
        assert_eq!(parse_facet("length", Some("")), Ok(None));
        assert_eq!(parse_facet("length", Some("   ")), Ok(None));
        assert_eq!(parse_facet("length", Some(" 32 ")), Ok(Some(32)));
    }

    #[test]
    fn test_parse_facet_not_range_checked() {
        assert_eq!(parse_facet("scale", Some("-84")), Ok(Some(-84)));
    }

    #[test]
    fn test_parse_facet_malformed() {
        assert_eq!(
            parse_facet("precision", Some("ten")),
            Err(MalformedFacet {
                facet: "precision",
                value: "ten".to_string()
            })
        );
    }

    #[test]
    fn test_map_type_uses_parsed_scale() {
        let mapped = map_type("NUMBER", Some("12"), Some("2"), Some("22")).unwrap();
        assert_eq!(mapped.portable, PortableType::Decimal);
        assert_eq!(
            mapped.facets,
            Facets {
                size: Some(22),
                precision: Some(12),
                scale: Some(2)
            }
        );
    }

    #[test]
    fn test_map_type_reports_malformed_scale() {
        let err = map_type("NUMBER", None, Some("x"), None).unwrap_err();
        assert_eq!(err.facet, "scale");
    }

    #[test]
    fn test_portable_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PortableType::Timestamp).unwrap(),
            "\"timestamp\""
        );
        assert_eq!(PortableType::Decimal.to_string(), "decimal");
    }
}
