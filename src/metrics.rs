//! Catalog metrics and tracing spans.
//!
//! Metrics are exported in Prometheus text format through [`CatalogMetrics::encode`].

#[cfg(feature = "metrics")]
pub use self::prom::{CatalogMetrics, METRICS};

#[cfg(feature = "metrics")]
mod prom {
    use once_cell::sync::Lazy;
    use opentelemetry::{
        global,
        metrics::{Counter, Histogram, Meter, MeterProvider as _},
        KeyValue,
    };
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use prometheus::{Encoder, Registry, TextEncoder};
    use std::time::Duration;

    pub static METRICS: Lazy<CatalogMetrics> = Lazy::new(CatalogMetrics::init);

    pub struct CatalogMetrics {
        registry: Registry,
        pub queries_total: Counter<u64>,
        pub query_duration: Histogram<f64>,
        pub tables_loaded: Counter<u64>,
        pub tables_not_found: Counter<u64>,
    }

    impl CatalogMetrics {
        pub fn init() -> Self {
            let registry = Registry::new();
            let meter = match opentelemetry_prometheus::exporter()
                .with_registry(registry.clone())
                .build()
            {
                Ok(exporter) => {
                    let provider = SdkMeterProvider::builder().with_reader(exporter).build();
                    global::set_meter_provider(provider.clone());
                    provider.meter("dm_catalog")
                }
                Err(e) => {
                    log::warn!("Prometheus exporter unavailable, catalog metrics are not exported: {}", e);
                    global::meter("dm_catalog")
                }
            };
            Self::with_meter(registry, &meter)
        }

        fn with_meter(registry: Registry, meter: &Meter) -> Self {
            let queries_total = meter
                .u64_counter("catalog_queries_total")
                .with_description("Catalog queries issued, by query kind and outcome")
                .build();

            let query_duration = meter
                .f64_histogram("catalog_query_duration_seconds")
                .with_description("Duration of catalog queries")
                .build();

            let tables_loaded = meter
                .u64_counter("tables_loaded_total")
                .with_description("Table descriptors assembled")
                .build();

            let tables_not_found = meter
                .u64_counter("tables_not_found_total")
                .with_description("Table lookups that found no such table")
                .build();

            Self {
                registry,
                queries_total,
                query_duration,
                tables_loaded,
                tables_not_found,
            }
        }

        pub fn record_query(&self, kind: &str, elapsed: Duration, ok: bool) {
            let attrs = [
                KeyValue::new("kind", kind.to_string()),
                KeyValue::new("outcome", if ok { "ok" } else { "error" }),
            ];
            self.queries_total.add(1, &attrs);
            self.query_duration.record(elapsed.as_secs_f64(), &attrs[..1]);
        }

        pub fn record_table_loaded(&self) {
            self.tables_loaded.add(1, &[]);
        }

        pub fn record_table_not_found(&self) {
            self.tables_not_found.add(1, &[]);
        }

        /// Current metric values in Prometheus text exposition format.
        pub fn encode(&self) -> String {
            let mut buffer = Vec::new();
            if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
                log::warn!("Failed to encode catalog metrics: {}", e);
                return String::new();
            }
            String::from_utf8(buffer).unwrap_or_default()
        }
    }

}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{info_span, Span};

    /// Span covering one full table assembly.
    pub fn load_table_span(schema: &str, table: &str) -> Span {
        info_span!("dm_catalog.load_table", schema = %schema, table = %table)
    }

    /// Span covering one catalog round trip.
    pub fn catalog_query_span(query: &str) -> Span {
        info_span!("dm_catalog.catalog_query", query = %query)
    }

}
