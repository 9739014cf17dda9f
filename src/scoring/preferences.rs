// src/scoring/preferences.rs
use crate::product::FieldRef;
use crate::scoring::engine::round1;
use crate::scoring::rank::{sort_by_total, Ranked};

pub const BOOST_PER_MATCH: f64 = 5.0;
pub const SCORE_CAP: f64 = 100.0;

/// Comma-separated terms, trimmed and lowercased; blanks and repeats dropped.
pub fn parse_preferences(raw: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for t in raw.split(',') {
        let t = t.trim().to_lowercase();
        if !t.is_empty() && !terms.contains(&t) {
            terms.push(t);
        }
    }
    terms
}

/// Boost each product by `BOOST_PER_MATCH` per preference term found in its
/// haystack fields, capped at `SCORE_CAP`, then re-sort.
///
/// Returns new breakdowns; sub-scores are untouched. With no usable terms the
/// input order and totals come back unchanged.
pub fn apply_preferences(ranked: &[Ranked], preferences: &str, haystack: &[FieldRef]) -> Vec<Ranked> {
    let terms = parse_preferences(preferences);
    if terms.is_empty() {
        return ranked.to_vec();
    }

    let mut boosted: Vec<Ranked> = ranked
        .iter()
        .map(|r| {
            let text = haystack
                .iter()
                .map(|f| r.product.field_text(f))
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            let matches = terms.iter().filter(|t| text.contains(t.as_str())).count();
            let total = round1((r.score.total + matches as f64 * BOOST_PER_MATCH).min(SCORE_CAP));
            Ranked {
                product: r.product.clone(),
                score: r.score.with_total(total),
            }
        })
        .collect();
    sort_by_total(&mut boosted);
    boosted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_are_cleaned() {
        assert_eq!(parse_preferences(" Keychron, ,QMK ,keychron"), vec!["keychron", "qmk"]);
        assert!(parse_preferences(" , ,").is_empty());
        assert!(parse_preferences("").is_empty());
    }
}
