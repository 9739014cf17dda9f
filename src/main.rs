//! product-ranker: binary entrypoint
//! Loads configuration, runs the pipeline once, prints the ranked list as JSON.
//!
//! Positional arguments, if any, replace the configured query.

use product_ranker::config::load_pipeline_config_default;
use product_ranker::ingest::config::Credentials;
use product_ranker::pipeline::Pipeline;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("product_ranker=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let mut config = load_pipeline_config_default()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        config.query = args.join(" ");
    }

    let pipeline = Pipeline::from_config(config, &Credentials::from_env())?;
    let report = pipeline.run().await;

    if report.collected == 0 {
        tracing::error!(query = %report.query, "no products collected from any source");
        std::process::exit(1);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
