//! Per-session introspection context.
//!
//! The default schema and the row-key case are settled once, when the session is
//! established, and then only read. Nothing below re-detects either per query or per row.

use crate::config::CatalogConfig;
use crate::executor::CatalogExecutor;
use crate::name::NameResolver;
use crate::row::RowCase;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Immutable session context threaded through every loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    resolver: NameResolver,
    row_case: RowCase,
}

impl Session {
    pub fn new(default_schema: impl Into<String>, row_case: RowCase) -> Self {
        Self {
            resolver: NameResolver::new(default_schema),
            row_case,
        }
    }

    /// Settle the session context from the executor and configuration.
    pub fn establish<E: CatalogExecutor + ?Sized>(executor: &E, config: &CatalogConfig) -> Self {
        let identity = executor.session_identity();
        let default_schema = config.resolve_default_schema(identity.as_deref());
        if default_schema.is_empty() {
            log::warn!("No session identity available; unqualified table names resolve to an empty schema");
        }
        let row_case = config.row_case.unwrap_or_else(|| executor.active_row_case());
        log::debug!(
            "Catalog session established (default schema {:?}, row case {:?})",
            default_schema,
            row_case
        );
        Self::new(default_schema, row_case)
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    pub fn default_schema(&self) -> &str {
        self.resolver.default_schema()
    }

    pub fn row_case(&self) -> RowCase {
        self.row_case
    }
}

/// Cooperative cancellation flag shared between a caller and an in-flight load.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
