// src/scoring/profile.rs
//! Scoring profiles: named, weighted dimensions, each scored by one strategy.
//!
//! A profile can come from three places: the built-in default (ergonomic
//! keyboards), a JSON file, or a generator. All three go through
//! [`ScoringProfile::new`], which keeps the weights summing to 1.0.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::product::{FieldRef, Product};

/// Boolean-check rules address their field as `__bool__<field>`.
const BOOL_PREFIX: &str = "__bool__";

/// Weight sums further than this from 1.0 get rescaled.
const WEIGHT_TOLERANCE: f64 = 0.01;

/// Default haystack for preference matching.
pub const DEFAULT_PREFERENCE_FIELDS: &[&str] = &[
    "brand",
    "product_title",
    "ergonomic_features",
    "switch_type",
    "switch_brand",
    "programmable",
    "connectivity",
    "category",
];

#[derive(Debug, Clone, PartialEq)]
pub enum RuleTarget {
    /// Case-insensitive substring match on the field text.
    Text(FieldRef),
    /// Exact match of a boolean field rendered as `"true"`/`"false"`.
    Flag { field: FieldRef, expected: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRule {
    pub keyword: String,
    pub points: i32,
    pub target: RuleTarget,
}

impl KeywordRule {
    /// `field` may be a plain field name, `extra.<key>`, or `__bool__<field>`;
    /// for the latter the expected value is the keyword's text after the last `:`.
    pub fn new(keyword: &str, points: i32, field: &str) -> Self {
        let keyword = keyword.trim().to_lowercase();
        let target = match field.trim().strip_prefix(BOOL_PREFIX) {
            Some(name) => {
                let expected = keyword.rsplit(':').next().unwrap_or_default().trim().to_string();
                RuleTarget::Flag {
                    field: FieldRef::parse(name),
                    expected,
                }
            }
            None => RuleTarget::Text(FieldRef::parse(field)),
        };
        Self {
            keyword,
            points,
            target,
        }
    }

    pub fn matches(&self, p: &Product) -> bool {
        match &self.target {
            RuleTarget::Text(field) => p.field_text(field).to_lowercase().contains(&self.keyword),
            RuleTarget::Flag { field, expected } => p.field_text(field).to_lowercase() == *expected,
        }
    }

    fn field_name(&self) -> String {
        match &self.target {
            RuleTarget::Text(field) => field.name().into_owned(),
            RuleTarget::Flag { field, .. } => format!("{BOOL_PREFIX}{}", field.name()),
        }
    }
}

/// How one dimension turns a product into a 0-100-ish sub-score.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    KeywordRules(Vec<KeywordRule>),
    FormulaReviews,
    FormulaValue,
}

impl Strategy {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeywordRules(_) => "keyword",
            Self::FormulaReviews => "formula_reviews",
            Self::FormulaValue => "formula_value",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub display_name: String,
    pub weight: f64,
    pub description: String,
    pub strategy: Strategy,
}

impl Dimension {
    pub fn new(name: &str, weight: f64, strategy: Strategy) -> Self {
        Self {
            name: name.to_string(),
            display_name: title_case(name),
            weight,
            description: String::new(),
            strategy,
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringProfile {
    pub category: String,
    dimensions: Vec<Dimension>,
    pub category_fields: Vec<FieldRef>,
    pub preference_fields: Vec<FieldRef>,
}

impl ScoringProfile {
    /// Build a profile; weights are sanitized and rescaled to sum to 1.0.
    pub fn new(
        category: &str,
        mut dimensions: Vec<Dimension>,
        category_fields: Vec<FieldRef>,
        preference_fields: Vec<FieldRef>,
    ) -> Self {
        normalize_weights(&mut dimensions);
        Self {
            category: category.to_string(),
            dimensions,
            category_fields,
            preference_fields,
        }
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn total_weight(&self) -> f64 {
        self.dimensions.iter().map(|d| d.weight).sum()
    }

    /// Haystack fields for preference matching, defaulting when the profile names none.
    pub fn preference_haystack(&self) -> Vec<FieldRef> {
        if self.preference_fields.is_empty() {
            DEFAULT_PREFERENCE_FIELDS.iter().map(|f| FieldRef::parse(f)).collect()
        } else {
            self.preference_fields.clone()
        }
    }

    pub fn to_raw(&self) -> RawProfile {
        RawProfile {
            category: self.category.clone(),
            dimensions: self
                .dimensions
                .iter()
                .map(|d| RawDimension {
                    name: d.name.clone(),
                    weight: d.weight,
                    display_name: Some(d.display_name.clone()),
                    scoring_type: d.strategy.kind().to_string(),
                    description: d.description.clone(),
                    rules: match &d.strategy {
                        Strategy::KeywordRules(rules) => rules
                            .iter()
                            .map(|r| RawRule {
                                keyword: r.keyword.clone(),
                                points: f64::from(r.points),
                                field: r.field_name(),
                            })
                            .collect(),
                        _ => Vec::new(),
                    },
                })
                .collect(),
            category_fields: self.category_fields.iter().map(|f| f.name().into_owned()).collect(),
            preference_fields: Some(self.preference_fields.iter().map(|f| f.name().into_owned()).collect()),
        }
    }

    pub fn from_raw(raw: RawProfile) -> Result<Self> {
        let mut dimensions = Vec::with_capacity(raw.dimensions.len());
        for d in raw.dimensions {
            if d.name.trim().is_empty() {
                bail!("dimension without a name");
            }
            let strategy = match d.scoring_type.trim().to_ascii_lowercase().as_str() {
                "keyword" => Strategy::KeywordRules(
                    d.rules
                        .iter()
                        .filter(|r| !r.keyword.trim().is_empty())
                        .map(|r| KeywordRule::new(&r.keyword, r.points.round() as i32, &r.field))
                        .collect(),
                ),
                "formula_reviews" => Strategy::FormulaReviews,
                "formula_value" => Strategy::FormulaValue,
                other => bail!("dimension '{}' has unknown scoring_type '{other}'", d.name),
            };
            dimensions.push(Dimension {
                display_name: d
                    .display_name
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| title_case(&d.name)),
                name: d.name,
                weight: d.weight,
                description: d.description,
                strategy,
            });
        }
        let preference_fields = raw
            .preference_fields
            .unwrap_or_else(|| vec!["brand".into(), "product_title".into(), "category".into()]);
        Ok(Self::new(
            &raw.category,
            dimensions,
            raw.category_fields.iter().map(|f| FieldRef::parse(f)).collect(),
            preference_fields.iter().map(|f| FieldRef::parse(f)).collect(),
        ))
    }
}

fn normalize_weights(dims: &mut [Dimension]) {
    for d in dims.iter_mut() {
        if !d.weight.is_finite() || d.weight < 0.0 {
            d.weight = 0.0;
        }
    }
    if dims.is_empty() {
        return;
    }
    let total: f64 = dims.iter().map(|d| d.weight).sum();
    if total <= 0.0 {
        // nothing to scale; share evenly
        let even = 1.0 / dims.len() as f64;
        dims.iter_mut().for_each(|d| d.weight = even);
    } else if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        dims.iter_mut().for_each(|d| d.weight /= total);
    }
}

fn title_case(name: &str) -> String {
    name.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut cs = w.chars();
            match cs.next() {
                Some(first) => first.to_uppercase().chain(cs.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Wire shape of a profile (generator output and profile files).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProfile {
    #[serde(default = "unknown_category")]
    pub category: String,
    #[serde(default)]
    pub dimensions: Vec<RawDimension>,
    #[serde(default)]
    pub category_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preference_fields: Option<Vec<String>>,
}

fn unknown_category() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDimension {
    pub name: String,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub scoring_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RawRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRule {
    pub keyword: String,
    pub points: f64,
    pub field: String,
}

/// Drop a surrounding markdown code fence (```json ... ```), if any.
pub fn strip_code_fences(text: &str) -> &str {
    let t = text.trim();
    if !t.starts_with("```") {
        return t;
    }
    let body = t.split_once('\n').map(|(_, rest)| rest).unwrap_or_default();
    let body = body.trim_end();
    match body.rfind("```") {
        Some(idx) if body.ends_with("```") => body[..idx].trim(),
        _ => body.trim(),
    }
}

/// Parse a profile from JSON text, tolerating a code fence around it.
pub fn parse_profile_json(text: &str) -> Result<ScoringProfile> {
    let raw: RawProfile = serde_json::from_str(strip_code_fences(text)).context("parsing scoring profile JSON")?;
    ScoringProfile::from_raw(raw)
}

pub fn load_profile_file(path: &Path) -> Result<ScoringProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading scoring profile from {}", path.display()))?;
    parse_profile_json(&content).with_context(|| format!("in {}", path.display()))
}

fn rules(field: &str, pairs: &[(&str, i32)]) -> Vec<KeywordRule> {
    pairs.iter().map(|(k, pts)| KeywordRule::new(k, *pts, field)).collect()
}

/// Built-in profile for ergonomic keyboards.
pub fn default_profile() -> ScoringProfile {
    let ergonomics = rules(
        "ergonomic_features",
        &[
            ("split", 30),
            ("tent", 20),
            ("tilt", 10),
            ("negative tilt", 10),
            ("wrist rest", 10),
            ("palm", 10),
            ("contour", 15),
            ("thumb", 10),
            ("ortholinear", 5),
            ("columnar", 5),
        ],
    );

    let mut build = rules("switch_type", &[("membrane", -30)]);
    build.push(KeywordRule::new("hot_swappable:true", 25, "__bool__hot_swappable"));
    build.extend(rules("programmable", &[("qmk", 30), ("via", 30), ("zmk", 30)]));
    build.extend(rules("connectivity", &[("bluetooth", 15), ("2.4", 15)]));
    build.extend(rules("switch_brand", &[("cherry", 15), ("kailh", 15), ("gateron", 15)]));
    build.extend(rules("ergonomic_features", &[("aluminum", 15)]));

    ScoringProfile::new(
        "ergonomic keyboards",
        vec![
            Dimension::new("ergonomics", 0.40, Strategy::KeywordRules(ergonomics))
                .describe("Split, tenting, tilt, contour and thumb-cluster features."),
            Dimension::new("reviews", 0.20, Strategy::FormulaReviews).describe("Rating average and review count."),
            Dimension::new("value", 0.20, Strategy::FormulaValue).describe("Lower price scores higher."),
            Dimension::new("build", 0.20, Strategy::KeywordRules(build))
                .describe("Mechanical switches, hot-swap, open firmware, wireless, materials."),
        ],
        [
            "layout_size",
            "switch_type",
            "switch_brand",
            "hot_swappable",
            "connectivity",
            "programmable",
            "ergonomic_features",
        ]
        .iter()
        .map(|f| FieldRef::parse(f))
        .collect(),
        DEFAULT_PREFERENCE_FIELDS.iter().map(|f| FieldRef::parse(f)).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_shape() {
        let p = default_profile();
        let names: Vec<&str> = p.dimensions().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["ergonomics", "reviews", "value", "build"]);
        assert!((p.total_weight() - 1.0).abs() < 1e-9);
        assert_eq!(p.preference_fields.len(), 8);
        assert_eq!(p.dimensions()[0].display_name, "Ergonomics");
    }

    #[test]
    fn bool_rule_targets_flag() {
        let r = KeywordRule::new("hot_swappable:true", 25, "__bool__hot_swappable");
        assert_eq!(
            r.target,
            RuleTarget::Flag {
                field: FieldRef::HotSwappable,
                expected: "true".into()
            }
        );
        let on = Product { hot_swappable: true, ..Default::default() };
        assert!(r.matches(&on));
        assert!(!r.matches(&Product::default()));
    }

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn title_case_names() {
        assert_eq!(title_case("build_quality"), "Build Quality");
        assert_eq!(title_case("ergonomics"), "Ergonomics");
    }

    #[test]
    fn raw_round_trip_keeps_rules() {
        let p = default_profile();
        let back = ScoringProfile::from_raw(p.to_raw()).unwrap();
        assert_eq!(back, p);
    }
}
