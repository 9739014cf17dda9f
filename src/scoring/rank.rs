// src/scoring/rank.rs
use std::collections::HashMap;

use serde::Serialize;

use crate::product::Product;
use crate::scoring::engine::{score_product, ScoreBreakdown};
use crate::scoring::profile::ScoringProfile;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked {
    pub product: Product,
    pub score: ScoreBreakdown,
}

/// Collapse listings of the same (brand, title) family to the cheapest one.
///
/// Ties keep the first-seen listing. Output follows first-seen family order.
pub fn dedup_cheapest(products: Vec<Product>) -> Vec<Product> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut out: Vec<Product> = Vec::with_capacity(products.len());
    for p in products {
        let key = (p.brand.clone(), p.product_title.clone());
        match index.get(&key) {
            Some(&i) => {
                if p.price_usd < out[i].price_usd {
                    out[i] = p;
                }
            }
            None => {
                index.insert(key, out.len());
                out.push(p);
            }
        }
    }
    out
}

/// Stable sort by total, highest first.
pub fn sort_by_total(ranked: &mut [Ranked]) {
    ranked.sort_by(|a, b| b.score.total.total_cmp(&a.score.total));
}

/// Optionally dedup, score every product, order by total, keep the top `top_n`.
pub fn rank_products(
    products: Vec<Product>,
    profile: &ScoringProfile,
    top_n: usize,
    deduplicate: bool,
) -> Vec<Ranked> {
    let products = if deduplicate {
        dedup_cheapest(products)
    } else {
        products
    };
    let mut ranked: Vec<Ranked> = products
        .into_iter()
        .map(|product| {
            let score = score_product(&product, profile);
            Ranked { product, score }
        })
        .collect();
    sort_by_total(&mut ranked);
    ranked.truncate(top_n);
    ranked
}
