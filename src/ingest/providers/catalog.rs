// src/ingest/providers/catalog.rs
//! Bring-your-own catalog: a local CSV (header row, e.g. a spreadsheet
//! export), TOML (`[[products]]`) or JSON file of listings. Values may be
//! loosely typed (`"$129"`, `"4.5 out of 5"`, `"yes"`).

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

use crate::ingest::types::SourceAdapter;
use crate::normalize::{normalize_bool, normalize_count, normalize_price, normalize_rating, normalize_text, value_text};
use crate::product::Product;

pub const DEFAULT_SOURCE: &str = "Catalog";

/// Canonical field -> accepted column names, first present wins.
const ALIASES: &[(&str, &[&str])] = &[
    ("source_site", &["source_site", "store"]),
    ("product_title", &["product_title", "title"]),
    ("price_usd", &["price_usd", "price"]),
    ("rating_avg", &["rating_avg", "rating"]),
    ("layout_size", &["layout_size", "layout"]),
];

pub struct CatalogAdapter {
    path: Option<PathBuf>,
}

impl CatalogAdapter {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

fn pick<'a>(row: &'a Map<String, Value>, canonical: &str) -> Option<&'a Value> {
    let keys: &[&str] = ALIASES
        .iter()
        .find(|(c, _)| *c == canonical)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[]);
    if keys.is_empty() {
        return row.get(canonical);
    }
    keys.iter().filter_map(|k| row.get(*k)).find(|v| !v.is_null())
}

fn text(row: &Map<String, Value>, canonical: &str) -> String {
    value_text(pick(row, canonical)).trim().to_string()
}

const KNOWN: &[&str] = &[
    "source_site", "store", "product_title", "title", "brand", "model", "price_usd", "price",
    "availability", "ship_to_zip", "product_url", "image_url", "layout_size", "layout",
    "switch_type", "switch_brand", "hot_swappable", "connectivity", "programmable",
    "ergonomic_features", "rating_avg", "rating", "rating_count", "category",
];

/// One loosely-typed row into a Product. Rows without a title yield `None`.
pub fn product_from_row(row: &Map<String, Value>, region_code: &str) -> Option<Product> {
    let title = normalize_text(&text(row, "product_title"));
    if title.is_empty() {
        return None;
    }
    let source = text(row, "source_site");
    let zip = text(row, "ship_to_zip");

    let extra: Map<String, Value> = row
        .iter()
        .filter(|(k, _)| !KNOWN.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Some(Product {
        source_site: if source.is_empty() { DEFAULT_SOURCE.to_string() } else { source },
        product_title: title,
        brand: text(row, "brand"),
        model: text(row, "model"),
        price_usd: normalize_price(pick(row, "price_usd")),
        availability: text(row, "availability"),
        ship_to_zip: if zip.is_empty() { region_code.to_string() } else { zip },
        product_url: text(row, "product_url"),
        image_url: text(row, "image_url"),
        layout_size: text(row, "layout_size"),
        switch_type: text(row, "switch_type"),
        switch_brand: text(row, "switch_brand"),
        hot_swappable: normalize_bool(pick(row, "hot_swappable")),
        connectivity: text(row, "connectivity"),
        programmable: text(row, "programmable"),
        ergonomic_features: text(row, "ergonomic_features"),
        rating_avg: normalize_rating(pick(row, "rating_avg")),
        rating_count: normalize_count(pick(row, "rating_count")),
        category: text(row, "category"),
        extra,
    })
}

/// Parse catalog rows. A `csv` extension reads CSV only; otherwise `hint_ext`
/// picks whether TOML or JSON is tried first.
pub fn parse_rows(s: &str, hint_ext: &str) -> Result<Vec<Map<String, Value>>> {
    if hint_ext == "csv" {
        return parse_csv(s);
    }
    let try_toml = hint_ext == "toml" || s.contains("[[products]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported catalog format"))
}

/// Header row names the columns. Blank cells are left out so aliases fall
/// through to the next column.
fn parse_csv(s: &str) -> Result<Vec<Map<String, Value>>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(s.trim_start_matches('\u{feff}').as_bytes());
    let headers = reader.headers().context("reading CSV header")?.clone();
    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("CSV record {}", i + 1))?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn parse_toml(s: &str) -> Result<Vec<Map<String, Value>>> {
    #[derive(serde::Deserialize)]
    struct TomlCatalog {
        #[serde(default)]
        products: Vec<toml::Table>,
    }
    let cat: TomlCatalog = toml::from_str(s)?;
    cat.products
        .into_iter()
        .map(|t| -> Result<Map<String, Value>> {
            match serde_json::to_value(t)? {
                Value::Object(m) => Ok(m),
                _ => Err(anyhow!("catalog row is not a table")),
            }
        })
        .collect()
}

fn parse_json(s: &str) -> Result<Vec<Map<String, Value>>> {
    let rows = match serde_json::from_str::<Value>(s)? {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => match obj.remove("products") {
            Some(Value::Array(rows)) => rows,
            _ => return Err(anyhow!("JSON catalog needs a top-level array or \"products\" array")),
        },
        _ => return Err(anyhow!("JSON catalog needs a top-level array")),
    };
    Ok(rows
        .into_iter()
        .filter_map(|r| match r {
            Value::Object(m) => Some(m),
            _ => None,
        })
        .collect())
}

pub async fn load_catalog(path: &Path, region_code: &str) -> Result<Vec<Product>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading catalog from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let rows = parse_rows(&content, &ext).with_context(|| format!("parsing catalog {}", path.display()))?;
    Ok(rows.iter().filter_map(|r| product_from_row(r, region_code)).collect())
}

#[async_trait]
impl SourceAdapter for CatalogAdapter {
    /// The catalog is the user's own selection; the query does not filter it.
    async fn search(&self, _query: &str, region_code: &str, max_results: usize) -> Result<Vec<Product>> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };
        let mut out = load_catalog(path, region_code).await?;
        out.truncate(max_results);
        info!(adapter = self.name(), path = %path.display(), count = out.len(), "catalog listings");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "catalog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_rows_with_aliases() {
        let s = r#"
[[products]]
title = "Ergodox EZ"
brand = "ZSA"
price = "$324.00"
rating = "4.6 out of 5"
rating_count = "1,024"
layout = "Split Ortholinear"
hot_swappable = "yes"
store = "ZSA Direct"
color = "white"

[[products]]
brand = "Nameless"
"#;
        let rows = parse_rows(s, "toml").unwrap();
        assert_eq!(rows.len(), 2);
        let products: Vec<Product> = rows.iter().filter_map(|r| product_from_row(r, "11201")).collect();
        assert_eq!(products.len(), 1);
        let p = &products[0];
        assert_eq!(p.product_title, "Ergodox EZ");
        assert_eq!(p.source_site, "ZSA Direct");
        assert_eq!(p.price_usd, 324.0);
        assert_eq!(p.rating_avg, 4.6);
        assert_eq!(p.rating_count, 1024);
        assert_eq!(p.layout_size, "Split Ortholinear");
        assert!(p.hot_swappable);
        assert_eq!(p.ship_to_zip, "11201");
        assert_eq!(p.extra.get("color"), Some(&Value::String("white".into())));
    }

    #[test]
    fn json_array_or_products_key() {
        let arr = r#"[{"product_title": "A", "price_usd": 10}, 5]"#;
        let obj = r#"{"products": [{"title": "B", "price": "bad"}]}"#;
        assert_eq!(parse_rows(arr, "json").unwrap().len(), 1);
        let rows = parse_rows(obj, "").unwrap();
        let p = product_from_row(&rows[0], "").unwrap();
        assert_eq!(p.source_site, DEFAULT_SOURCE);
        assert_eq!(p.price_usd, 0.0);
        assert!(parse_rows("neither", "txt").is_err());
    }

    #[test]
    fn csv_rows_with_aliases() {
        let s = "\u{feff}title,brand,price,rating,rating_count,store,hot_swappable,notes
Ergodox EZ,ZSA,\"$324.00\",4.6 out of 5,\"1,024\",ZSA Direct,yes,
  Glove80 , MoErgo ,399,,,,no,ships from EU
,Nameless,10,,,,,
";
        let rows = parse_rows(s, "csv").unwrap();
        assert_eq!(rows.len(), 3);
        let products: Vec<Product> = rows.iter().filter_map(|r| product_from_row(r, "11201")).collect();
        assert_eq!(products.len(), 2);

        let ez = &products[0];
        assert_eq!(ez.product_title, "Ergodox EZ");
        assert_eq!(ez.source_site, "ZSA Direct");
        assert_eq!(ez.price_usd, 324.0);
        assert_eq!(ez.rating_avg, 4.6);
        assert_eq!(ez.rating_count, 1024);
        assert!(ez.hot_swappable);
        assert!(!ez.extra.contains_key("notes"));

        let glove = &products[1];
        assert_eq!(glove.product_title, "Glove80");
        assert_eq!(glove.brand, "MoErgo");
        assert_eq!(glove.source_site, DEFAULT_SOURCE);
        assert!(!glove.hot_swappable);
        assert_eq!(glove.extra.get("notes"), Some(&Value::String("ships from EU".into())));
    }

    #[test]
    fn csv_extension_never_falls_back() {
        // valid JSON, but the extension says CSV
        let rows = parse_rows(r#"[{"title": "A"}]"#, "csv").unwrap();
        assert!(rows.iter().filter_map(|r| product_from_row(r, "")).next().is_none());
    }
}
