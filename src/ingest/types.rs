// src/ingest/types.rs
use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use tracing::info;

use crate::ingest::error::IngestError;
use crate::product::Product;

/// Requested operating mode for a source adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    /// Live source only; missing credentials is a construction error.
    Online,
    /// Bundled sample data only; never touches the network.
    #[serde(alias = "offline")]
    Seed,
    /// Live when credentials exist, otherwise sample data.
    #[default]
    Auto,
}

impl FromStr for OperatingMode {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "seed" | "offline" => Ok(Self::Seed),
            "auto" => Ok(Self::Auto),
            other => Err(IngestError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Online => "online",
            Self::Seed => "seed",
            Self::Auto => "auto",
        })
    }
}

/// What an adapter actually does after mode resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Live,
    Fallback,
}

/// Credential requirements of one adapter, used to resolve its mode.
#[derive(Debug, Clone, Copy)]
pub struct CredentialSpec {
    pub adapter: &'static str,
    pub env_vars: &'static [&'static str],
    pub setup_url: Option<&'static str>,
}

impl CredentialSpec {
    /// online + missing => error; seed => fallback; auto => live iff present.
    pub fn resolve(&self, mode: OperatingMode, present: bool) -> Result<SourceMode, IngestError> {
        match mode {
            OperatingMode::Online if present => Ok(SourceMode::Live),
            OperatingMode::Online => Err(IngestError::missing_credentials(
                self.adapter,
                self.env_vars,
                self.setup_url,
            )),
            OperatingMode::Seed => Ok(SourceMode::Fallback),
            OperatingMode::Auto if present => {
                info!(adapter = self.adapter, "credentials found, using live source");
                Ok(SourceMode::Live)
            }
            OperatingMode::Auto => {
                info!(adapter = self.adapter, "no credentials, using sample data");
                Ok(SourceMode::Fallback)
            }
        }
    }
}

/// A product source. Implementations are isolated from each other by the
/// aggregator: an `Err` here only drops this adapter's contribution.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn search(&self, query: &str, region_code: &str, max_results: usize) -> Result<Vec<Product>>;
    fn name(&self) -> &'static str;
}
