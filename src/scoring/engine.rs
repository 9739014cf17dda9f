// src/scoring/engine.rs
use std::collections::BTreeMap;

use serde::Serialize;

use crate::product::Product;
use crate::scoring::profile::{ScoringProfile, Strategy};

const KEYWORD_MIN: f64 = 0.0;
const KEYWORD_MAX: f64 = 100.0;

/// Total plus one rounded sub-score per profile dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub total: f64,
    pub dimensions: BTreeMap<String, f64>,
}

impl ScoreBreakdown {
    pub fn get(&self, dimension: &str) -> Option<f64> {
        self.dimensions.get(dimension).copied()
    }

    /// Same sub-scores, different total.
    pub fn with_total(&self, total: f64) -> Self {
        Self {
            total,
            dimensions: self.dimensions.clone(),
        }
    }
}

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// `min(count / 100, 30) + (avg / 5) * 70`
pub fn reviews_score(p: &Product) -> f64 {
    (p.rating_count as f64 / 100.0).min(30.0) + (p.rating_avg / 5.0) * 70.0
}

/// `max(0, 100 - price / 5)`: free scores 100, $500 and up scores 0.
pub fn value_score(p: &Product) -> f64 {
    (100.0 - p.price_usd / 5.0).max(0.0)
}

impl Strategy {
    /// Unrounded sub-score. Keyword sums are clamped to 0..=100.
    pub fn evaluate(&self, p: &Product) -> f64 {
        match self {
            Strategy::KeywordRules(rules) => {
                let sum: i64 = rules
                    .iter()
                    .filter(|r| r.matches(p))
                    .map(|r| i64::from(r.points))
                    .sum();
                (sum as f64).clamp(KEYWORD_MIN, KEYWORD_MAX)
            }
            Strategy::FormulaReviews => reviews_score(p),
            Strategy::FormulaValue => value_score(p),
        }
    }
}

/// Weighted total from unrounded sub-scores, then everything rounded to 0.1.
pub fn score_product(p: &Product, profile: &ScoringProfile) -> ScoreBreakdown {
    let mut total = 0.0;
    let mut dimensions = BTreeMap::new();
    for dim in profile.dimensions() {
        let sub = dim.strategy.evaluate(p);
        total += sub * dim.weight;
        dimensions.insert(dim.name.clone(), round1(sub));
    }
    ScoreBreakdown {
        total: round1(total),
        dimensions,
    }
}
