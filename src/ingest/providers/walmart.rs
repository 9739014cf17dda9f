// src/ingest/providers/walmart.rs
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::ingest::client::{HttpRequest, ResilientClient, Transport};
use crate::ingest::config::Credentials;
use crate::ingest::error::IngestError;
use crate::ingest::providers::seed;
use crate::ingest::types::{CredentialSpec, OperatingMode, SourceAdapter, SourceMode};
use crate::normalize::{normalize_count, normalize_price, normalize_rating, normalize_text};
use crate::product::Product;

pub const SOURCE_SITE: &str = "Walmart";
const SEARCH_URL: &str = "https://developer.api.walmart.com/api-proxy/service/affil/product/v2/search";
const MIN_INTERVAL: Duration = Duration::from_secs(1);

pub const CREDENTIALS: CredentialSpec = CredentialSpec {
    adapter: "walmart",
    env_vars: &["WALMART_API_KEY"],
    setup_url: Some("https://walmart.io/"),
};

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    items: Vec<WalmartItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalmartItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    brand_name: Option<String>,
    #[serde(default)]
    sale_price: Option<Value>,
    #[serde(default)]
    customer_rating: Option<Value>,
    #[serde(default)]
    num_reviews: Option<Value>,
    #[serde(default)]
    available_online: Option<bool>,
    #[serde(default)]
    product_url: Option<String>,
    #[serde(default)]
    thumbnail_image: Option<String>,
    #[serde(default)]
    short_description: Option<String>,
}

impl WalmartItem {
    fn into_product(self, region_code: &str) -> Product {
        Product {
            source_site: SOURCE_SITE.to_string(),
            product_title: normalize_text(self.name.as_deref().unwrap_or_default()),
            brand: self.brand_name.unwrap_or_default(),
            price_usd: normalize_price(self.sale_price.as_ref()),
            rating_avg: normalize_rating(self.customer_rating.as_ref()),
            rating_count: normalize_count(self.num_reviews.as_ref()),
            availability: match self.available_online {
                Some(true) => "In Stock".to_string(),
                _ => "Out of Stock".to_string(),
            },
            ship_to_zip: region_code.to_string(),
            product_url: self.product_url.unwrap_or_default(),
            image_url: self.thumbnail_image.unwrap_or_default(),
            ergonomic_features: normalize_text(self.short_description.as_deref().unwrap_or_default()),
            category: SOURCE_SITE.to_string(),
            ..Default::default()
        }
    }
}

enum Mode {
    Seed,
    Live { client: ResilientClient, api_key: String },
}

pub struct WalmartAdapter {
    mode: Mode,
}

impl WalmartAdapter {
    pub fn new(
        mode: OperatingMode,
        creds: &Credentials,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, IngestError> {
        let key = creds.get("WALMART_API_KEY");
        let mode = match (CREDENTIALS.resolve(mode, key.is_some())?, key) {
            (SourceMode::Live, Some(k)) => Mode::Live {
                client: ResilientClient::new("walmart", transport, MIN_INTERVAL),
                api_key: k.to_string(),
            },
            _ => Mode::Seed,
        };
        Ok(Self { mode })
    }

    pub fn source_mode(&self) -> SourceMode {
        match self.mode {
            Mode::Seed => SourceMode::Fallback,
            Mode::Live { .. } => SourceMode::Live,
        }
    }
}

async fn search_live(
    client: &ResilientClient,
    api_key: &str,
    query: &str,
    region_code: &str,
    max_results: usize,
) -> Result<Vec<Product>, IngestError> {
    // the affiliate API caps numItems at 25
    let num_items = max_results.clamp(1, 25);
    let req = HttpRequest::get(SEARCH_URL)
        .query("query", query)
        .query("numItems", num_items.to_string())
        .header("WM_SEC.ACCESS_TOKEN", api_key);
    let page: SearchPage = client.get_json(&req).await?;
    Ok(page
        .items
        .into_iter()
        .map(|item| item.into_product(region_code))
        .filter(|p| !p.product_title.is_empty())
        .take(max_results)
        .collect())
}

#[async_trait]
impl SourceAdapter for WalmartAdapter {
    async fn search(&self, query: &str, region_code: &str, max_results: usize) -> Result<Vec<Product>> {
        if let Mode::Live { client, api_key } = &self.mode {
            match search_live(client, api_key, query, region_code, max_results).await {
                Ok(out) => {
                    info!(adapter = self.name(), count = out.len(), "live listings");
                    return Ok(out);
                }
                Err(e) => warn!(adapter = self.name(), error = ?e, "live search failed, serving sample data"),
            }
        }
        let out = seed::products(seed::WALMART, SOURCE_SITE, query, region_code, max_results);
        info!(adapter = self.name(), count = out.len(), "sample listings");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "walmart"
    }
}
