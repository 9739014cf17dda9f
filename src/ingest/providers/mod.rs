// src/ingest/providers/mod.rs
pub mod amazon;
pub mod bestbuy;
pub mod catalog;
pub mod discovery;
mod seed;
pub mod walmart;

use std::sync::Arc;

use crate::ingest::client::Transport;
use crate::ingest::config::Credentials;
use crate::ingest::error::IngestError;
use crate::ingest::types::{OperatingMode, SourceAdapter};

pub use amazon::AmazonAdapter;
pub use bestbuy::BestBuyAdapter;
pub use catalog::CatalogAdapter;
pub use discovery::DiscoveryAdapter;
pub use walmart::WalmartAdapter;

/// Adapter names accepted by [`build_adapter`].
pub const AVAILABLE: &[&str] = &["amazon", "bestbuy", "walmart", "nimble"];

/// Construct a named adapter. Configuration problems (unknown name, online
/// mode without credentials) fail here, before any search runs.
pub fn build_adapter(
    name: &str,
    mode: OperatingMode,
    creds: &Credentials,
    transport: Arc<dyn Transport>,
) -> Result<Box<dyn SourceAdapter>, IngestError> {
    let adapter: Box<dyn SourceAdapter> = match name.trim().to_ascii_lowercase().as_str() {
        "amazon" => Box::new(AmazonAdapter::new(mode, creds)?),
        "bestbuy" => Box::new(BestBuyAdapter::new(mode, creds, transport)?),
        "walmart" => Box::new(WalmartAdapter::new(mode, creds, transport)?),
        "nimble" => Box::new(DiscoveryAdapter::new(mode, creds, transport)?),
        _ => {
            return Err(IngestError::UnknownAdapter {
                name: name.to_string(),
                available: AVAILABLE.iter().map(|s| s.to_string()).collect(),
            })
        }
    };
    Ok(adapter)
}
