//! Memoized table descriptors.
//!
//! [`SchemaCache`] keys descriptors by resolved full name. Only found tables are stored:
//! a lookup of a missing table is repeated against the catalog every time, so a table
//! created later becomes visible without a refresh.

use crate::error::{CatalogError, Result};
use crate::executor::CatalogExecutor;
use crate::schema::CatalogSchema;
use crate::table::TableDescriptor;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

pub struct SchemaCache<E> {
    schema: CatalogSchema<E>,
    tables: RwLock<HashMap<String, Arc<TableDescriptor>>>,
}

impl<E: CatalogExecutor> SchemaCache<E> {
    pub fn new(schema: CatalogSchema<E>) -> Self {
        Self {
            schema,
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn schema(&self) -> &CatalogSchema<E> {
        &self.schema
    }

    /// Descriptor of `raw_name`, loading it on a miss or when `refresh` is set.
    pub fn table_schema(&self, raw_name: &str, refresh: bool) -> Result<Option<Arc<TableDescriptor>>> {
        let key = self.schema.resolve_table_name(raw_name).full_name;
        if !refresh {
            let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(table) = tables.get(&key) {
                return Ok(Some(Arc::clone(table)));
            }
        }

        let loaded = self.schema.load_table(raw_name)?.map(Arc::new);
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        match &loaded {
            Some(table) => {
                tables.insert(key, Arc::clone(table));
            }
            None => {
                tables.remove(&key);
            }
        }
        Ok(loaded)
    }

    /// Drop the cached descriptor of `raw_name`.
    pub fn refresh_table(&self, raw_name: &str) {
        let key = self.schema.resolve_table_name(raw_name).full_name;
        if self
            .tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
            .is_some()
        {
            log::debug!("Dropped cached schema of {}", key);
        }
    }

    /// Drop every cached descriptor.
    pub fn refresh(&self) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        log::debug!("Dropping {} cached table schemas", tables.len());
        tables.clear();
    }

    /// Full names currently cached, sorted.
    pub fn cached_names(&self) -> Vec<String> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: CatalogExecutor + Send + Sync + 'static> SchemaCache<E> {
    /// Load `names` concurrently, one coroutine per table, and cache what exists.
    ///
    /// Returns the number of tables found. The first failure is returned after every
    /// coroutine has finished; tables loaded by the others stay cached.
    pub fn warm(self: &Arc<Self>, names: &[&str]) -> Result<usize> {
        let handles: Vec<_> = names
            .iter()
            .map(|name| {
                let cache = Arc::clone(self);
                let name = name.to_string();
                let handle = {
                    let name = name.clone();
                    may::go!(move || cache.table_schema(&name, false))
                };
                (name, handle)
            })
            .collect();

        let mut found = 0;
        let mut first_error = None;
        for (name, handle) in handles {
            let outcome = handle.join().unwrap_or_else(|_| {
                log::error!("Schema warm-up of {} panicked", name);
                Err(CatalogError::WarmupPanicked { table: name })
            });
            match outcome {
                Ok(Some(_)) => found += 1,
                Ok(None) => {}
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        log::info!("Warmed schema cache: {} of {} tables found", found, names.len());
        match first_error {
            Some(e) => Err(e),
            None => Ok(found),
        }
    }
}
