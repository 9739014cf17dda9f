// src/ingest/providers/amazon.rs
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::ingest::config::Credentials;
use crate::ingest::error::IngestError;
use crate::ingest::providers::seed;
use crate::ingest::types::{CredentialSpec, OperatingMode, SourceAdapter, SourceMode};
use crate::product::Product;

pub const SOURCE_SITE: &str = "Amazon";

pub const CREDENTIALS: CredentialSpec = CredentialSpec {
    adapter: "amazon",
    env_vars: &["AMAZON_ACCESS_KEY", "AMAZON_SECRET_KEY", "AMAZON_PARTNER_TAG"],
    setup_url: Some("https://webservices.amazon.com/paapi5/documentation/"),
};

/// Amazon listings from the curated sample set. Scraping is off the table and
/// signed Product Advertising API requests are not wired up, so live mode
/// (all three PA-API values present) logs that and serves the same set.
pub struct AmazonAdapter {
    mode: SourceMode,
}

impl AmazonAdapter {
    /// All three PA-API values are required for live mode.
    pub fn new(mode: OperatingMode, creds: &Credentials) -> Result<Self, IngestError> {
        let present = creds.has_all(CREDENTIALS.env_vars);
        let mode = CREDENTIALS.resolve(mode, present)?;
        Ok(Self { mode })
    }

    pub fn source_mode(&self) -> SourceMode {
        self.mode
    }
}

#[async_trait]
impl SourceAdapter for AmazonAdapter {
    async fn search(&self, query: &str, region_code: &str, max_results: usize) -> Result<Vec<Product>> {
        if self.mode == SourceMode::Live {
            info!(adapter = self.name(), "PA-API search not implemented, serving sample data");
        }
        let out = seed::products(seed::AMAZON, SOURCE_SITE, query, region_code, max_results);
        info!(adapter = self.name(), count = out.len(), "sample listings");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "amazon"
    }
}
