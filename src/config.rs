//! Introspection configuration.
//!
//! [`CatalogConfig`] is read from the `[catalog]` section of `config/config.toml`
//! (optional) with `DM_CATALOG__CATALOG__*` environment variables layered on top, e.g.
//! `DM_CATALOG__CATALOG__DEFAULT_SCHEMA=ADMIN`.

use crate::row::RowCase;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "config/config.toml";
const ENV_PREFIX: &str = "DM_CATALOG";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct CatalogConfig {
    /// Schema assumed for unqualified names. Used verbatim when set; otherwise derived
    /// from the session identity.
    #[serde(default)]
    pub default_schema: Option<String>,
    /// Identity to fall back on when the executor cannot report one.
    #[serde(default)]
    pub username: Option<String>,
    /// Overrides the row-key case the driver reports.
    #[serde(default)]
    pub row_case: Option<RowCase>,
    /// Connection string for the ODBC executor.
    #[serde(default)]
    pub odbc_connection_string: Option<String>,
}

impl CatalogConfig {
    /// Load the catalog configuration from `config/config.toml`, falling back to env vars.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load the catalog configuration from `path` (optional) and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let builder = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if path.exists() {
                    log::warn!(
                        "Failed to load {}, falling back to environment: {}",
                        path.display(),
                        err
                    );
                }
                Config::builder()
                    .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        match settings.get::<CatalogConfig>("catalog") {
            Ok(cfg) => Ok(cfg),
            // No `[catalog]` section anywhere: every field is optional.
            Err(ConfigError::NotFound(_)) => Ok(CatalogConfig::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "Catalog configuration is invalid: {}",
                e
            ))),
        }
    }

    /// Resolve the default schema from this configuration and a session identity.
    ///
    /// An explicit `default_schema` is used as is. Otherwise the identity (or the
    /// configured `username`) is upper-cased. With neither, the default schema is empty
    /// and callers must qualify every name.
    pub fn resolve_default_schema(&self, identity: Option<&str>) -> String {
        if let Some(schema) = &self.default_schema {
            return schema.clone();
        }
        identity
            .filter(|id| !id.is_empty())
            .or(self.username.as_deref())
            .map(str::to_uppercase)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CatalogConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, CatalogConfig::default());
    }

    #[test]
    fn test_load_catalog_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[catalog]\ndefault_schema = \"SALES\"\nusername = \"app\"\nrow_case = \"lower\""
        )
        .unwrap();

        let cfg = CatalogConfig::load_from(&path).unwrap();
        assert_eq!(cfg.default_schema.as_deref(), Some("SALES"));
        assert_eq!(cfg.username.as_deref(), Some("app"));
        assert_eq!(cfg.row_case, Some(RowCase::Lower));
        assert_eq!(cfg.odbc_connection_string, None);
    }

    #[test]
    fn test_explicit_default_schema_wins() {
        let cfg = CatalogConfig {
            default_schema: Some("Mixed".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.resolve_default_schema(Some("sysdba")), "Mixed");
    }

    #[test]
    fn test_default_schema_from_identity_is_upper_cased() {
        let cfg = CatalogConfig::default();
        assert_eq!(cfg.resolve_default_schema(Some("admin")), "ADMIN");
    }

    #[test]
    fn test_default_schema_falls_back_to_username() {
        let cfg = CatalogConfig {
            username: Some("report".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.resolve_default_schema(None), "REPORT");
        assert_eq!(cfg.resolve_default_schema(Some("")), "REPORT");
    }

    #[test]
    fn test_no_identity_yields_empty_default_schema() {
        assert_eq!(CatalogConfig::default().resolve_default_schema(None), "");
    }
}
