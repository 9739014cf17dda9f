// src/ingest/providers/bestbuy.rs
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

pub const SOURCE_SITE: &str = "Best Buy";
const API_BASE: &str = "https://api.bestbuy.com/v1/products";
const SHOW_FIELDS: &str = "sku,name,manufacturer,salePrice,url,image,customerReviewAverage,customerReviewCount,shortDescription,onlineAvailability";
const MIN_INTERVAL: Duration = Duration::from_millis(500);

pub const CREDENTIALS: CredentialSpec = CredentialSpec {
    adapter: "bestbuy",
    env_vars: &["BESTBUY_API_KEY"],
    setup_url: Some("https://developer.bestbuy.com/"),
};

#[derive(Debug, Deserialize)]
struct ProductsPage {
    #[serde(default)]
    products: Vec<BestBuyItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BestBuyItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    manufacturer: Option<String>,
    #[serde(default)]
    sale_price: Option<Value>,
    #[serde(default)]
    customer_review_average: Option<Value>,
    #[serde(default)]
    customer_review_count: Option<Value>,
    #[serde(default)]
    online_availability: Option<bool>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    short_description: Option<String>,
}

enum Mode {
    Seed,
    Live { client: ResilientClient, api_key: String },
}

pub struct BestBuyAdapter {
    mode: Mode,
}

impl BestBuyAdapter {
    pub fn new(
        mode: OperatingMode,
        creds: &Credentials,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, IngestError> {
        let key = creds.get("BESTBUY_API_KEY");
        let mode = match (CREDENTIALS.resolve(mode, key.is_some())?, key) {
            (SourceMode::Live, Some(k)) => Mode::Live {
                client: ResilientClient::new("bestbuy", transport, MIN_INTERVAL),
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

    /// Best Buy's path-embedded search: `products(search=a&search=b)`.
    fn search_url(query: &str) -> String {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
            .filter(|w| !w.is_empty())
            .map(|w| format!("search={w}"))
            .collect();
        if terms.is_empty() {
            API_BASE.to_string()
        } else {
            format!("{API_BASE}({})", terms.join("&"))
        }
    }

    async fn search_live(
        &self,
        client: &ResilientClient,
        api_key: &str,
        query: &str,
        region_code: &str,
        max_results: usize,
    ) -> Result<Vec<Product>, IngestError> {
        let page_size = max_results.clamp(1, 100);
        let req = HttpRequest::get(Self::search_url(query))
            .query("apiKey", api_key)
            .query("format", "json")
            .query("show", SHOW_FIELDS)
            .query("pageSize", page_size.to_string())
            .query("page", "1");
        let page: ProductsPage = client.get_json(&req).await?;

        Ok(page
            .products
            .into_iter()
            .map(|item| item.into_product(region_code))
            .filter(|p| !p.product_title.is_empty())
            .take(max_results)
            .collect())
    }
}

impl BestBuyItem {
    fn into_product(self, region_code: &str) -> Product {
        Product {
            source_site: SOURCE_SITE.to_string(),
            product_title: normalize_text(self.name.as_deref().unwrap_or_default()),
            brand: self.manufacturer.unwrap_or_default(),
            price_usd: normalize_price(self.sale_price.as_ref()),
            rating_avg: normalize_rating(self.customer_review_average.as_ref()),
            rating_count: normalize_count(self.customer_review_count.as_ref()),
            availability: if self.online_availability.unwrap_or(false) {
                "In Stock".to_string()
            } else {
                "Out of Stock".to_string()
            },
            ship_to_zip: region_code.to_string(),
            product_url: self.url.unwrap_or_default(),
            image_url: self.image.unwrap_or_default(),
            ergonomic_features: normalize_text(self.short_description.as_deref().unwrap_or_default()),
            category: SOURCE_SITE.to_string(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl SourceAdapter for BestBuyAdapter {
    async fn search(&self, query: &str, region_code: &str, max_results: usize) -> Result<Vec<Product>> {
        if let Mode::Live { client, api_key } = &self.mode {
            match self.search_live(client, api_key, query, region_code, max_results).await {
                Ok(out) => {
                    info!(adapter = self.name(), count = out.len(), "live listings");
                    return Ok(out);
                }
                Err(e) => {
                    warn!(adapter = self.name(), error = ?e, "live search failed, serving sample data");
                }
            }
        }
        let out = seed::products(seed::BESTBUY, SOURCE_SITE, query, region_code, max_results);
        info!(adapter = self.name(), count = out.len(), "sample listings");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "bestbuy"
    }
}
