// src/pipeline.rs
//! End-to-end run: adapters -> aggregate -> filter -> dedup/score/rank -> boost.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::ingest::client::{ReqwestTransport, Transport};
use crate::ingest::config::Credentials;
use crate::ingest::error::IngestError;
use crate::ingest::providers::{build_adapter, CatalogAdapter};
use crate::ingest::types::SourceAdapter;
use crate::ingest::{run_once, AdapterOutcome};
use crate::scoring::generator::{build_generator, resolve_profile, DynGenerator};
use crate::scoring::preferences::apply_preferences;
use crate::scoring::profile::{load_profile_file, RawProfile, ScoringProfile};
use crate::scoring::rank::{rank_products, Ranked};

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub query: String,
    pub profile: RawProfile,
    pub collected: usize,
    pub filtered: usize,
    pub adapters: Vec<AdapterOutcome>,
    pub ranked: Vec<Ranked>,
}

pub struct Pipeline {
    config: PipelineConfig,
    adapters: Vec<Box<dyn SourceAdapter>>,
    generator: DynGenerator,
}

impl Pipeline {
    /// Build adapters over the real HTTP transport.
    pub fn from_config(config: PipelineConfig, creds: &Credentials) -> Result<Self, IngestError> {
        let transport: Arc<dyn Transport> =
            Arc::new(ReqwestTransport::new(Duration::from_secs(config.http_timeout_secs.max(1))));
        Self::with_transport(config, creds, transport)
    }

    /// Configuration errors (unknown adapter, online mode without credentials)
    /// are returned here, before anything runs.
    pub fn with_transport(
        config: PipelineConfig,
        creds: &Credentials,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, IngestError> {
        let mut adapters = Vec::with_capacity(config.adapters.len() + 1);
        for name in &config.adapters {
            adapters.push(build_adapter(name, config.mode, creds, transport.clone())?);
        }
        if let Some(path) = &config.catalog_path {
            adapters.push(Box::new(CatalogAdapter::new(Some(path.clone()))) as Box<dyn SourceAdapter>);
        }
        let generator = build_generator(&config.generator);
        Ok(Self {
            config,
            adapters,
            generator,
        })
    }

    /// Assemble from parts (tests, embedding applications).
    pub fn from_parts(
        config: PipelineConfig,
        adapters: Vec<Box<dyn SourceAdapter>>,
        generator: DynGenerator,
    ) -> Self {
        Self {
            config,
            adapters,
            generator,
        }
    }

    /// Profile file first, then the generator, then the default profile.
    pub async fn profile(&self) -> ScoringProfile {
        if let Some(path) = &self.config.profile_path {
            match load_profile_file(path) {
                Ok(p) => return p,
                Err(e) => warn!(error = ?e, "profile file unusable, falling back"),
            }
        }
        resolve_profile(self.generator.as_ref(), &self.config.query).await
    }

    pub async fn run(&self) -> PipelineReport {
        let cfg = &self.config;
        let profile = self.profile().await;

        let (products, outcomes) = run_once(&self.adapters, &cfg.query, &cfg.region_code, cfg.max_results).await;
        let collected = products.len();

        let products = cfg.filters.apply(products);
        let filtered = products.len();
        if filtered < collected {
            info!(collected, filtered, "filters applied");
        }

        let mut ranked = rank_products(products, &profile, cfg.top_n, cfg.deduplicate);
        if let Some(prefs) = cfg.preferences.as_deref() {
            ranked = apply_preferences(&ranked, prefs, &profile.preference_haystack());
        }
        info!(query = %cfg.query, collected, ranked = ranked.len(), category = %profile.category, "pipeline finished");

        PipelineReport {
            query: cfg.query.clone(),
            profile: profile.to_raw(),
            collected,
            filtered,
            adapters: outcomes,
            ranked,
        }
    }
}
