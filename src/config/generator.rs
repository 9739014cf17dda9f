// src/config/generator.rs
use serde::{Deserialize, Serialize};
use std::env;

pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

fn default_enabled() -> bool {
    true
}
fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_max_tokens() -> u32 {
    2048
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_model")]
    pub model: String,
    /// "ENV" means: read from ANTHROPIC_API_KEY
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            model: default_model(),
            api_key: default_api_key(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl GeneratorConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(|k| env::var(k).ok())
    }

    /// Literal key, or the `ANTHROPIC_API_KEY` lookup when set to "ENV".
    pub fn api_key_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = self.api_key.trim();
        let key = if raw.eq_ignore_ascii_case("env") {
            lookup(API_KEY_VAR)?
        } else {
            raw.to_string()
        };
        let key = key.trim().to_string();
        (!key.is_empty()).then_some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_placeholder_resolves_through_lookup() {
        let cfg = GeneratorConfig::default();
        assert_eq!(cfg.api_key_with(|_| None), None);
        assert_eq!(cfg.api_key_with(|_| Some("  ".into())), None);
        assert_eq!(
            cfg.api_key_with(|k| (k == API_KEY_VAR).then(|| "sk-test".to_string())),
            Some("sk-test".to_string())
        );

        let literal = GeneratorConfig {
            api_key: "sk-literal".into(),
            ..GeneratorConfig::default()
        };
        assert_eq!(literal.api_key_with(|_| None), Some("sk-literal".to_string()));
    }
}
