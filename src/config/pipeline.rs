// src/config/pipeline.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::generator::GeneratorConfig;
use crate::filters::Filters;
use crate::ingest::types::OperatingMode;

pub const ENV_PATH: &str = "PIPELINE_CONFIG_PATH";

/// Everything one pipeline run needs. Every field has a default, so an empty
/// file (or no file) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub query: String,
    pub mode: OperatingMode,
    pub adapters: Vec<String>,
    pub region_code: String,
    pub max_results: usize,
    pub top_n: usize,
    pub deduplicate: bool,
    pub preferences: Option<String>,
    /// Adds the catalog adapter when set.
    pub catalog_path: Option<PathBuf>,
    pub filters: Filters,
    /// JSON scoring profile; takes precedence over generation.
    pub profile_path: Option<PathBuf>,
    pub generator: GeneratorConfig,
    pub http_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            query: "ergonomic mechanical keyboard".to_string(),
            mode: OperatingMode::Auto,
            adapters: vec!["amazon".into(), "bestbuy".into(), "walmart".into()],
            region_code: "11201".to_string(),
            max_results: 100,
            top_n: 10,
            deduplicate: true,
            preferences: None,
            catalog_path: None,
            filters: Filters::default(),
            profile_path: None,
            generator: GeneratorConfig::default(),
            http_timeout_secs: 30,
        }
    }
}

/// Load the pipeline config from an explicit path. Supports TOML or JSON formats.
pub fn load_pipeline_config_from(path: &Path) -> Result<PipelineConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading pipeline config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_pipeline_config(&content, ext.as_str())
        .with_context(|| format!("parsing pipeline config {}", path.display()))
}

/// Load the pipeline config using env var + fallbacks:
/// 1) $PIPELINE_CONFIG_PATH
/// 2) config/pipeline.toml
/// 3) config/pipeline.json
/// 4) built-in defaults
pub fn load_pipeline_config_default() -> Result<PipelineConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_pipeline_config_from(&pb);
        } else {
            return Err(anyhow!("{ENV_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/pipeline.toml");
    if toml_p.exists() {
        return load_pipeline_config_from(&toml_p);
    }
    let json_p = PathBuf::from("config/pipeline.json");
    if json_p.exists() {
        return load_pipeline_config_from(&json_p);
    }
    Ok(PipelineConfig::default())
}

fn parse_pipeline_config(s: &str, hint_ext: &str) -> Result<PipelineConfig> {
    let cfg = match hint_ext {
        "toml" => toml::from_str::<PipelineConfig>(s)?,
        "json" => serde_json::from_str::<PipelineConfig>(s)?,
        _ => match serde_json::from_str::<PipelineConfig>(s) {
            Ok(c) => c,
            Err(_) => toml::from_str::<PipelineConfig>(s).map_err(|_| anyhow!("unsupported pipeline config format"))?,
        },
    };
    Ok(sanitize(cfg))
}

fn sanitize(mut cfg: PipelineConfig) -> PipelineConfig {
    cfg.adapters = {
        let mut seen: Vec<String> = Vec::new();
        for a in cfg.adapters {
            let a = a.trim().to_ascii_lowercase();
            if !a.is_empty() && !seen.contains(&a) {
                seen.push(a);
            }
        }
        seen
    };
    cfg.query = cfg.query.trim().to_string();
    cfg.preferences = cfg.preferences.filter(|p| !p.trim().is_empty());
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_and_json_parse_with_defaults() {
        let toml = r#"
query = "split keyboard"
mode = "seed"
adapters = [" Amazon ", "walmart", "amazon", ""]
top_n = 5

[filters]
budget = 200.0
wireless = "yes"
"#;
        let cfg = parse_pipeline_config(toml, "toml").unwrap();
        assert_eq!(cfg.query, "split keyboard");
        assert_eq!(cfg.mode, OperatingMode::Seed);
        assert_eq!(cfg.adapters, vec!["amazon".to_string(), "walmart".to_string()]);
        assert_eq!(cfg.top_n, 5);
        assert_eq!(cfg.max_results, 100);
        assert_eq!(cfg.filters.budget, Some(200.0));
        assert!(cfg.deduplicate);

        let json = r#"{"region_code": "94105", "preferences": "  ", "generator": {"enabled": false}}"#;
        let cfg = parse_pipeline_config(json, "json").unwrap();
        assert_eq!(cfg.region_code, "94105");
        assert_eq!(cfg.preferences, None);
        assert!(!cfg.generator.enabled);
        assert_eq!(cfg.query, "ergonomic mechanical keyboard");
    }

    #[test]
    fn bad_mode_is_rejected() {
        assert!(parse_pipeline_config(r#"mode = "turbo""#, "toml").is_err());
    }
}
