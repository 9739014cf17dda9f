// src/ingest/mod.rs
pub mod client;
pub mod config;
pub mod error;
pub mod providers;
pub mod types;

use crate::ingest::types::SourceAdapter;
use crate::product::Product;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_adapter_products_total",
            "Products returned per adapter."
        );
        describe_counter!(
            "ingest_adapter_errors_total",
            "Adapter searches that failed and were skipped."
        );
        describe_counter!(
            "ingest_template_errors_total",
            "Discovery templates (or general searches) that failed and were skipped."
        );
        describe_counter!("http_retries_total", "HTTP attempts retried after a failure.");
        describe_histogram!("ingest_parse_ms", "Discovery result parse time in milliseconds.");
        describe_gauge!(
            "ingest_pipeline_last_run_ts",
            "Unix ts when the aggregator last ran."
        );
    });
}

/// What one adapter contributed to an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterOutcome {
    pub adapter: &'static str,
    pub collected: usize,
    pub error: Option<String>,
}

/// Query every adapter in order and concatenate the results.
///
/// A failing adapter is logged and contributes nothing; it never aborts the
/// others. Output order follows adapter order, then each adapter's own order.
pub async fn run_once(
    adapters: &[Box<dyn SourceAdapter>],
    query: &str,
    region_code: &str,
    max_results: usize,
) -> (Vec<Product>, Vec<AdapterOutcome>) {
    ensure_metrics_described();

    let mut all = Vec::new();
    let mut outcomes = Vec::with_capacity(adapters.len());
    for a in adapters {
        match a.search(query, region_code, max_results).await {
            Ok(mut v) => {
                tracing::info!(adapter = a.name(), count = v.len(), "adapter results");
                counter!("ingest_adapter_products_total", "adapter" => a.name()).increment(v.len() as u64);
                outcomes.push(AdapterOutcome {
                    adapter: a.name(),
                    collected: v.len(),
                    error: None,
                });
                all.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, adapter = a.name(), "adapter error");
                counter!("ingest_adapter_errors_total", "adapter" => a.name()).increment(1);
                outcomes.push(AdapterOutcome {
                    adapter: a.name(),
                    collected: 0,
                    error: Some(format!("{e:#}")),
                });
            }
        }
    }

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    gauge!("ingest_pipeline_last_run_ts").set(now as f64);

    (all, outcomes)
}
