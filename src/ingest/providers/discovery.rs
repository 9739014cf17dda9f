// src/ingest/providers/discovery.rs
//! Discovery adapter over a web-data platform (Nimble) that exposes many
//! retailer search templates behind one API.
//!
//! The template list is fetched once per adapter instance and cached. Each
//! e-commerce listing template is executed independently, followed by one
//! general shopping search. A failing template is logged and skipped; the
//! remaining templates and the general search still run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::ingest::client::{HttpRequest, ResilientClient, RetryPolicy, Transport};
use crate::ingest::config::Credentials;
use crate::ingest::error::IngestError;
use crate::ingest::types::{CredentialSpec, OperatingMode, SourceAdapter, SourceMode};
use crate::normalize::{normalize_count, normalize_price, normalize_rating, normalize_text, value_text};
use crate::product::Product;

pub const DEFAULT_BASE_URL: &str = "https://sdk.nimbleway.com";
pub const GENERAL_SOURCE: &str = "Nimble Shopping";
const MIN_INTERVAL: Duration = Duration::from_millis(500);

pub const CREDENTIALS: CredentialSpec = CredentialSpec {
    adapter: "nimble",
    env_vars: &["NIMBLE_API_KEY"],
    setup_url: Some("https://docs.nimbleway.com/"),
};

/// Template name -> display name of the retailer it scrapes.
const SOURCE_LABELS: &[(&str, &str)] = &[
    ("amazon_serp", "Amazon"),
    ("walmart_serp", "Walmart"),
    ("walmart_ca_serp", "Walmart Canada"),
    ("target_serp", "Target"),
    ("b_and_h_serp", "B&H"),
    ("homedepot_serp", "Home Depot"),
    ("staples_serp", "Staples"),
    ("office_depot_serp", "Office Depot"),
    ("asos_serp", "ASOS"),
    ("footlocker_serp", "Foot Locker"),
    ("kroger_serp", "Kroger"),
    ("slickdeals_serp", "Slickdeals"),
    ("sams_club_plp", "Sam's Club"),
];

/// Keys under which result lists may be nested, probed in order.
const CONTAINER_KEYS: &[&str] = &["results", "items", "products", "data"];

/// An ordered list of alternative keys for one canonical field.
/// The first key holding a non-empty, non-zero value wins.
pub struct FieldProbe {
    pub keys: &'static [&'static str],
}

pub const TITLE: FieldProbe = FieldProbe {
    keys: &["product_name", "name", "title", "product_title"],
};
pub const PRICE: FieldProbe = FieldProbe {
    keys: &["price", "sale_price", "current_price", "price_current"],
};
pub const RATING: FieldProbe = FieldProbe {
    keys: &["rating", "rating_avg", "stars"],
};
pub const RATING_COUNT: FieldProbe = FieldProbe {
    keys: &["review_count", "rating_count", "reviews_count", "num_reviews"],
};
pub const URL: FieldProbe = FieldProbe {
    keys: &["product_url", "url", "link"],
};
pub const IMAGE: FieldProbe = FieldProbe {
    keys: &["image_url", "image", "thumbnail"],
};
pub const BRAND: FieldProbe = FieldProbe {
    keys: &["brand", "brand_name", "manufacturer"],
};

const PROBES: &[&FieldProbe] = &[&TITLE, &PRICE, &RATING, &RATING_COUNT, &URL, &IMAGE, &BRAND];

fn is_present(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        // placeholder zeros defer to the next alias
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Bool(b) => *b,
    }
}

impl FieldProbe {
    pub fn first<'a>(&self, item: &'a Map<String, Value>) -> Option<&'a Value> {
        self.keys
            .iter()
            .filter_map(|k| item.get(*k))
            .find(|v| is_present(v))
    }
}

/// Descriptor of one template as listed by the platform.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vertical: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub data_source: Option<String>,
    #[serde(default, rename = "is_localization_supported")]
    pub localization_supported: Option<bool>,
    #[serde(default)]
    pub input_properties: Vec<InputProperty>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InputProperty {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "is_required")]
    pub required: Option<bool>,
}

impl Template {
    /// E-commerce vertical, listing-style entity type (SERP, search, PLP).
    pub fn is_listing(&self) -> bool {
        let vertical = self.vertical.as_deref().unwrap_or_default().to_lowercase();
        let entity = self.entity_type.as_deref().unwrap_or_default().to_lowercase();
        vertical == "ecommerce" && ["serp", "search", "plp"].iter().any(|k| entity.contains(k))
    }

    /// First required input, else the first input, else `"keyword"`.
    pub fn input_field(&self) -> &str {
        self.input_properties
            .iter()
            .find(|p| p.required.unwrap_or(false))
            .or_else(|| self.input_properties.first())
            .map(|p| p.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("keyword")
    }

    pub fn supports_localization(&self) -> bool {
        self.localization_supported.unwrap_or(false)
    }

    /// Display label: known table, else the descriptor's data source, else the name.
    pub fn source_label(&self) -> String {
        SOURCE_LABELS
            .iter()
            .find(|(name, _)| *name == self.name)
            .map(|(_, label)| label.to_string())
            .or_else(|| self.data_source.clone().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| self.name.clone())
    }

    /// Parameters for one run: the query under the input field, plus the
    /// region code only when the template supports it and one was given.
    pub fn run_params(&self, query: &str, region_code: &str) -> Value {
        let mut params = Map::new();
        params.insert(self.input_field().to_string(), json!(query));
        if self.supports_localization() && !region_code.is_empty() {
            params.insert("zip_code".to_string(), json!(region_code));
        }
        Value::Object(params)
    }
}

/// Pull the item list out of a response: a bare array, or the first array
/// found under one of the container keys. Anything else is empty.
pub fn extract_items(data: Value) -> Vec<Value> {
    match data {
        Value::Array(items) => items,
        Value::Object(mut obj) => CONTAINER_KEYS
            .iter()
            .find_map(|k| match obj.remove(*k) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Normalize raw result items. Items without a title are dropped; fields no
/// probe consumed are kept in `extra`.
pub fn parse_items(items: Vec<Value>, source_site: &str) -> Vec<Product> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(obj) = item else { continue };

        let title = normalize_text(&value_text(TITLE.first(&obj)));
        if title.is_empty() {
            continue;
        }

        let brand = match value_text(BRAND.first(&obj)).trim() {
            "" => title.split_whitespace().next().unwrap_or_default().to_string(),
            b => b.to_string(),
        };

        let mut extra = Map::new();
        for (k, v) in &obj {
            let consumed = k == "availability" || PROBES.iter().any(|p| p.keys.contains(&k.as_str()));
            if !consumed {
                extra.insert(k.clone(), v.clone());
            }
        }

        out.push(Product {
            source_site: source_site.to_string(),
            price_usd: normalize_price(PRICE.first(&obj)),
            rating_avg: normalize_rating(RATING.first(&obj)),
            rating_count: normalize_count(RATING_COUNT.first(&obj)),
            product_url: value_text(URL.first(&obj)),
            image_url: value_text(IMAGE.first(&obj)),
            availability: value_text(obj.get("availability")),
            product_title: title,
            brand,
            extra,
            ..Default::default()
        });
    }
    out
}

struct Live {
    client: ResilientClient,
    api_key: String,
    base_url: String,
}

pub struct DiscoveryAdapter {
    live: Option<Live>,
    templates: OnceCell<Vec<Template>>,
}

impl DiscoveryAdapter {
    pub fn new(
        mode: OperatingMode,
        creds: &Credentials,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, IngestError> {
        let key = creds.get("NIMBLE_API_KEY");
        let live = match (CREDENTIALS.resolve(mode, key.is_some())?, key) {
            (SourceMode::Live, Some(k)) => Some(Live {
                client: ResilientClient::new("nimble", transport, MIN_INTERVAL),
                api_key: k.to_string(),
                base_url: creds
                    .get("NIMBLE_BASE_URL")
                    .unwrap_or(DEFAULT_BASE_URL)
                    .trim_end_matches('/')
                    .to_string(),
            }),
            _ => None,
        };
        Ok(Self {
            live,
            templates: OnceCell::new(),
        })
    }

    /// Swap the retry policy used for every platform call.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        if let Some(live) = self.live.take() {
            self.live = Some(Live {
                client: live.client.with_policy(policy),
                ..live
            });
        }
        self
    }

    pub fn source_mode(&self) -> SourceMode {
        if self.live.is_some() {
            SourceMode::Live
        } else {
            SourceMode::Fallback
        }
    }

    /// Listing templates, fetched on first use and cached for this instance.
    /// A failed fetch is not cached.
    pub async fn templates(&self) -> Result<&[Template], IngestError> {
        let Some(live) = &self.live else {
            return Ok(&[]);
        };
        let templates = self
            .templates
            .get_or_try_init(|| async {
                let req = HttpRequest::get(format!("{}/v1/agents", live.base_url)).bearer(&live.api_key);
                let rsp = live.client.send(&req).await?;
                let listing: Vec<Value> = rsp.json("template listing")?;
                let templates: Vec<Template> = listing
                    .into_iter()
                    .filter_map(|v| match serde_json::from_value::<Template>(v) {
                        Ok(t) => Some(t),
                        Err(e) => {
                            debug!(error = %e, "skipping malformed template descriptor");
                            None
                        }
                    })
                    .filter(Template::is_listing)
                    .collect();
                let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
                info!(count = templates.len(), templates = ?names, "discovered listing templates");
                Ok::<_, IngestError>(templates)
            })
            .await?;
        Ok(templates.as_slice())
    }

    async fn run_template(
        &self,
        live: &Live,
        template: &Template,
        query: &str,
        region_code: &str,
    ) -> Result<Vec<Value>, IngestError> {
        let params = template.run_params(query, region_code);
        debug!(template = %template.name, params = %params, "running template");
        let body = json!({ "agent_name": template.name, "params": params });
        let req = HttpRequest::post_json(format!("{}/v1/agents/run", live.base_url), body).bearer(&live.api_key);
        let data: Value = live.client.send(&req).await?.json(&template.name)?;
        Ok(extract_items(data))
    }

    async fn search_general(&self, live: &Live, query: &str) -> Result<Vec<Value>, IngestError> {
        let body = json!({ "query": query, "focus": "shopping" });
        let req = HttpRequest::post_json(format!("{}/v1/search", live.base_url), body).bearer(&live.api_key);
        let data: Value = live.client.send(&req).await?.json("general search")?;
        Ok(extract_items(data))
    }
}

fn timed_parse(items: Vec<Value>, source: &str) -> Vec<Product> {
    let t0 = Instant::now();
    let out = parse_items(items, source);
    histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1000.0);
    out
}

#[async_trait]
impl SourceAdapter for DiscoveryAdapter {
    async fn search(&self, query: &str, region_code: &str, max_results: usize) -> Result<Vec<Product>> {
        let Some(live) = &self.live else {
            info!(adapter = self.name(), "no API key, contributing nothing");
            return Ok(Vec::new());
        };

        let mut all = Vec::new();

        let templates: &[Template] = match self.templates().await {
            Ok(t) => t,
            Err(e) => {
                warn!(adapter = self.name(), error = ?e, "template discovery failed");
                counter!("ingest_template_errors_total").increment(1);
                &[]
            }
        };

        for template in templates {
            let source = template.source_label();
            match self.run_template(live, template, query, region_code).await {
                Ok(items) => {
                    let products = timed_parse(items, &source);
                    info!(adapter = self.name(), template = %template.name, count = products.len(), "template results");
                    all.extend(products);
                }
                Err(e) => {
                    warn!(adapter = self.name(), template = %template.name, error = ?e, "template failed, skipping");
                    counter!("ingest_template_errors_total").increment(1);
                }
            }
        }

        match self.search_general(live, query).await {
            Ok(items) => {
                let products = timed_parse(items, GENERAL_SOURCE);
                info!(adapter = self.name(), count = products.len(), "general search results");
                all.extend(products);
            }
            Err(e) => {
                warn!(adapter = self.name(), error = ?e, "general search failed, skipping");
                counter!("ingest_template_errors_total").increment(1);
            }
        }

        all.truncate(max_results);
        Ok(all)
    }

    fn name(&self) -> &'static str {
        "nimble"
    }
}
