// tests/pipeline_e2e.rs
mod common;

use std::io::Write;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use common::ScriptedTransport;
use product_ranker::config::{GeneratorConfig, PipelineConfig};
use product_ranker::ingest::config::Credentials;
use product_ranker::ingest::providers::catalog::load_catalog;
use product_ranker::ingest::providers::build_adapter;
use product_ranker::ingest::run_once;
use product_ranker::scoring::generator::MockGenerator;
use product_ranker::scoring::{dedup_cheapest, DisabledGenerator};
use product_ranker::{OperatingMode, Pipeline, Product, SourceAdapter};

fn seed_config() -> PipelineConfig {
    PipelineConfig {
        mode: OperatingMode::Seed,
        generator: GeneratorConfig::disabled(),
        ..PipelineConfig::default()
    }
}

fn seed_adapters() -> Vec<Box<dyn SourceAdapter>> {
    let t = ScriptedTransport::unreachable();
    ["walmart", "bestbuy", "amazon"]
        .iter()
        .map(|n| build_adapter(n, OperatingMode::Seed, &Credentials::default(), t.clone()).unwrap())
        .collect()
}

fn find<'a>(products: &'a [Product], title: &str) -> &'a Product {
    products.iter().find(|p| p.product_title == title).unwrap()
}

#[tokio::test]
async fn seed_sources_aggregate_and_dedup_to_cheapest() {
    let (raw, outcomes) = run_once(&seed_adapters(), "ergonomic mechanical keyboard", "11201", 100).await;
    let counts: Vec<(&str, usize)> = outcomes.iter().map(|o| (o.adapter, o.collected)).collect();
    assert_eq!(counts, [("walmart", 4), ("bestbuy", 4), ("amazon", 18)]);
    assert_eq!(raw.len(), 26);

    let deduped = dedup_cheapest(raw);
    assert_eq!(deduped.len(), 22);

    let adv = find(&deduped, "Kinesis Advantage360 Professional");
    assert_eq!((adv.source_site.as_str(), adv.price_usd), ("Amazon", 449.0));
    let k860 = find(&deduped, "Logitech Ergo K860");
    assert_eq!((k860.source_site.as_str(), k860.price_usd), ("Walmart", 119.0));
    let sculpt = find(&deduped, "Microsoft Sculpt Ergonomic Keyboard");
    assert_eq!((sculpt.source_site.as_str(), sculpt.price_usd), ("Walmart", 39.0));
}

#[tokio::test]
async fn full_run_ranks_top_n_in_descending_order() {
    let pipeline = Pipeline::from_parts(seed_config(), seed_adapters(), Arc::new(DisabledGenerator));
    let report = pipeline.run().await;

    assert_eq!(report.collected, 26);
    assert_eq!(report.filtered, 26);
    assert_eq!(report.ranked.len(), 10);
    assert_eq!(report.profile.category, "ergonomic keyboards");
    assert!(report
        .ranked
        .windows(2)
        .all(|w| w[0].score.total >= w[1].score.total));
    for r in &report.ranked {
        assert_eq!(r.score.dimensions.len(), 4);
    }

    // one listing per (brand, title) family
    let mut keys: Vec<(&str, &str)> = report.ranked.iter().map(|r| r.product.family_key()).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 10);
}

#[tokio::test]
async fn filters_and_preferences_apply_in_order() {
    let mut cfg = seed_config();
    cfg.filters.budget = Some(150.0);
    cfg.preferences = Some("Logitech".into());
    cfg.top_n = 50;
    let pipeline = Pipeline::from_parts(cfg, seed_adapters(), Arc::new(DisabledGenerator));
    let report = pipeline.run().await;

    assert!(report.filtered < report.collected);
    assert!(report.ranked.iter().all(|r| r.product.price_usd <= 150.0));
    assert!(report
        .ranked
        .windows(2)
        .all(|w| w[0].score.total >= w[1].score.total));
}

struct Broken;

#[async_trait]
impl SourceAdapter for Broken {
    async fn search(&self, _q: &str, _r: &str, _m: usize) -> anyhow::Result<Vec<Product>> {
        Err(anyhow!("upstream exploded"))
    }
    fn name(&self) -> &'static str {
        "broken"
    }
}

#[tokio::test]
async fn failing_adapter_is_isolated() {
    let mut adapters = seed_adapters();
    adapters.insert(1, Box::new(Broken));
    let pipeline = Pipeline::from_parts(seed_config(), adapters, Arc::new(DisabledGenerator));
    let report = pipeline.run().await;

    assert_eq!(report.collected, 26);
    let broken = report.adapters.iter().find(|o| o.adapter == "broken").unwrap();
    assert_eq!(broken.collected, 0);
    assert!(broken.error.as_deref().unwrap().contains("upstream exploded"));
    assert!(report
        .adapters
        .iter()
        .filter(|o| o.adapter != "broken")
        .all(|o| o.error.is_none()));
}

#[tokio::test]
async fn generated_profile_drives_scoring() {
    let reply = r#"{"category": "budget boards", "dimensions": [
        {"name": "value", "weight": 1.0, "scoring_type": "formula_value"}
    ]}"#;
    let pipeline = Pipeline::from_parts(
        seed_config(),
        seed_adapters(),
        Arc::new(MockGenerator { reply: reply.into() }),
    );
    let report = pipeline.run().await;
    assert_eq!(report.profile.category, "budget boards");
    // cheapest listing wins on a pure value profile
    assert_eq!(report.ranked[0].product.product_title, "Microsoft Sculpt Ergonomic Keyboard");
    assert_eq!(report.ranked[0].score.total, 92.2);
}

#[tokio::test]
async fn profile_file_takes_precedence_and_bad_file_falls_back() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"category": "reviews only", "dimensions": [
            {{"name": "reviews", "weight": 2.0, "scoring_type": "formula_reviews"}}
        ]}}"#
    )
    .unwrap();

    let mut cfg = seed_config();
    cfg.profile_path = Some(file.path().to_path_buf());
    let pipeline = Pipeline::from_parts(cfg, seed_adapters(), Arc::new(DisabledGenerator));
    let profile = pipeline.profile().await;
    assert_eq!(profile.category, "reviews only");
    assert_eq!(profile.dimensions()[0].weight, 1.0);

    let mut bad = tempfile::NamedTempFile::new().unwrap();
    write!(bad, "{{ not json").unwrap();
    let mut cfg = seed_config();
    cfg.profile_path = Some(bad.path().to_path_buf());
    let pipeline = Pipeline::from_parts(cfg, seed_adapters(), Arc::new(DisabledGenerator));
    assert_eq!(pipeline.profile().await.category, "ergonomic keyboards");
}

#[tokio::test]
async fn catalog_adapter_joins_the_run() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"[
            {{"title": "Glove80", "brand": "MoErgo", "price": 399, "ergonomic_features": "split, contoured, thumb cluster", "store": "MoErgo"}},
            {{"title": "Untitled", "brand": "", "price": 10}}
        ]"#
    )
    .unwrap();

    let mut cfg = seed_config();
    cfg.adapters = vec![];
    cfg.catalog_path = Some(file.path().to_path_buf());
    let pipeline = Pipeline::with_transport(cfg, &Credentials::default(), ScriptedTransport::unreachable()).unwrap();
    let report = pipeline.run().await;

    assert_eq!(report.adapters.len(), 1);
    assert_eq!(report.adapters[0].adapter, "catalog");
    assert_eq!(report.collected, 2);
    let glove = &report.ranked[0].product;
    assert_eq!(glove.product_title, "Glove80");
    assert_eq!(glove.source_site, "MoErgo");
    assert_eq!(glove.ship_to_zip, "11201");
}

#[tokio::test]
async fn csv_catalog_loads_by_extension() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(
        file,
        "title,brand,price,store,ergonomic_features\n\
         Glove80,MoErgo,$399.00,MoErgo,\"split, contoured\"\n\
         Moonlander,ZSA,365,,split\n"
    )
    .unwrap();

    let products = load_catalog(file.path(), "11201").await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].product_title, "Glove80");
    assert_eq!(products[0].price_usd, 399.0);
    assert_eq!(products[0].source_site, "MoErgo");
    assert_eq!(products[0].ergonomic_features, "split, contoured");
    assert_eq!(products[1].source_site, "Catalog");
    assert_eq!(products[1].ship_to_zip, "11201");
}

#[test]
fn misconfiguration_fails_before_running() {
    let mut cfg = seed_config();
    cfg.adapters = vec!["amazon".into(), "ebay".into()];
    assert!(Pipeline::with_transport(cfg, &Credentials::default(), ScriptedTransport::unreachable()).is_err());

    let mut cfg = seed_config();
    cfg.mode = OperatingMode::Online;
    let err = Pipeline::with_transport(cfg, &Credentials::default(), ScriptedTransport::unreachable())
        .err()
        .unwrap();
    assert!(err.to_string().contains("AMAZON_ACCESS_KEY"));
}
