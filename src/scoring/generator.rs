// src/scoring/generator.rs
//! Optional profile generation: ask a language model for a scoring profile
//! that fits the query. Every failure path yields `None`, and callers fall
//! back to the default profile.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::generator::GeneratorConfig;
use crate::scoring::profile::{default_profile, parse_profile_json, ScoringProfile};

pub const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

const PROMPT: &str = r#"You are a product scoring expert. Given a search query, generate a scoring profile that determines how to evaluate and rank products in that category.

Search query: "{query}"

Return a JSON object with this exact structure:
{
  "category": "<short category name>",
  "dimensions": [
    {
      "name": "<snake_case identifier>",
      "weight": <float 0.0-1.0>,
      "display_name": "<Human Readable Name>",
      "scoring_type": "<keyword | formula_reviews | formula_value>",
      "description": "<what this dimension measures>",
      "rules": [
        {"keyword": "<term to find>", "points": <int>, "field": "<product field to search>"}
      ]
    }
  ],
  "category_fields": ["<field1>", "<field2>"],
  "preference_fields": ["<field1>", "<field2>"]
}

Rules:
- 3-6 dimensions total
- Weights MUST sum to 1.0
- Exactly ONE dimension must have scoring_type "formula_reviews" (rating_avg and rating_count)
- Exactly ONE dimension must have scoring_type "formula_value" (price_usd, lower price = higher score)
- Remaining dimensions use scoring_type "keyword" with rules
- For keyword rules, "field" can be any product field: product_title, brand, ergonomic_features, switch_type, connectivity, programmable, category, or "extra.<key>" for source-specific data
- Points can be negative (penalties) or positive (bonuses), typically -30 to +30
- Each keyword dimension is scored 0-100 (clamped)
- "category_fields" lists the most important product fields for this category
- "preference_fields" lists fields to search when matching user preference keywords (always include brand, product_title, category)

Return ONLY the JSON object, no other text."#;

pub fn render_prompt(query: &str) -> String {
    PROMPT.replace("{query}", query)
}

/// Parse a model reply into a profile; malformed replies are logged and dropped.
pub fn profile_from_reply(text: &str) -> Option<ScoringProfile> {
    match parse_profile_json(text) {
        Ok(p) if !p.dimensions().is_empty() => Some(p),
        Ok(_) => {
            warn!("generated profile has no dimensions, ignoring");
            None
        }
        Err(e) => {
            warn!(error = ?e, "generated profile is malformed, ignoring");
            None
        }
    }
}

pub trait ProfileGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        query: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<ScoringProfile>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

pub type DynGenerator = Arc<dyn ProfileGenerator>;

/// Anthropic Messages API backed generator.
pub struct AnthropicProfileGenerator {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicProfileGenerator {
    pub fn new(api_key: &str, model: &str, max_tokens: u32) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("product-ranker/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
        }
    }

    async fn generate_impl(&self, query: &str) -> Option<ScoringProfile> {
        if self.api_key.is_empty() {
            return None;
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: u32,
            messages: Vec<Msg<'a>>,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            content: Vec<Block>,
        }
        #[derive(Deserialize)]
        struct Block {
            #[serde(default)]
            text: Option<String>,
        }

        let prompt = render_prompt(query);
        let req = Req {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Msg {
                role: "user",
                content: &prompt,
            }],
        };

        let resp = match self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&req)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "profile generation request failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            warn!(status = resp.status().as_u16(), "profile generation returned an error status");
            return None;
        }
        let body: Resp = resp.json().await.ok()?;
        let text = body.content.into_iter().find_map(|b| b.text)?;

        let profile = profile_from_reply(&text)?;
        let names: Vec<&str> = profile.dimensions().iter().map(|d| d.name.as_str()).collect();
        info!(query, category = %profile.category, dimensions = ?names, "generated scoring profile");
        Some(profile)
    }
}

impl ProfileGenerator for AnthropicProfileGenerator {
    fn generate<'a>(
        &'a self,
        query: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<ScoringProfile>> + Send + 'a>> {
        Box::pin(self.generate_impl(query))
    }
    fn name(&self) -> &'static str {
        "anthropic"
    }
}

/// Returns `None` always; used when generation is disabled or unconfigured.
pub struct DisabledGenerator;

impl ProfileGenerator for DisabledGenerator {
    fn generate<'a>(
        &'a self,
        _query: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<ScoringProfile>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Replays a fixed model reply through the normal parsing path.
#[derive(Clone)]
pub struct MockGenerator {
    pub reply: String,
}

impl ProfileGenerator for MockGenerator {
    fn generate<'a>(
        &'a self,
        _query: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<ScoringProfile>> + Send + 'a>> {
        let reply = self.reply.clone();
        Box::pin(async move { profile_from_reply(&reply) })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Build a generator from config; anything short of enabled-with-a-key is disabled.
pub fn build_generator(config: &GeneratorConfig) -> DynGenerator {
    if !config.enabled {
        return Arc::new(DisabledGenerator);
    }
    match config.api_key() {
        Some(key) => Arc::new(AnthropicProfileGenerator::new(&key, &config.model, config.max_tokens)),
        None => {
            debug!("profile generation enabled but no API key, disabling");
            Arc::new(DisabledGenerator)
        }
    }
}

/// Generated profile if one is available, otherwise the default profile.
pub async fn resolve_profile(generator: &dyn ProfileGenerator, query: &str) -> ScoringProfile {
    match generator.generate(query).await {
        Some(p) => p,
        None => {
            info!(generator = generator.name(), "using default scoring profile");
            default_profile()
        }
    }
}
