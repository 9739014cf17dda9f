// src/product.rs
//! Canonical product record shared by every adapter, the scorer and the ranker.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// One listing from one source. Text fields default to `""`, numbers to 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub source_site: String,
    pub product_title: String,
    pub brand: String,
    pub model: String,
    pub price_usd: f64,
    pub availability: String,
    pub ship_to_zip: String,
    pub product_url: String,
    pub image_url: String,

    // category-specific attributes
    pub layout_size: String,
    pub switch_type: String,
    pub switch_brand: String,
    pub hot_swappable: bool,
    pub connectivity: String,
    pub programmable: String,
    pub ergonomic_features: String,

    pub rating_avg: f64,
    pub rating_count: u64,
    pub category: String,

    /// Source-specific fields that have no canonical slot.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Identity of a "product family" across sources: exact (brand, title).
    pub fn family_key(&self) -> (&str, &str) {
        (&self.brand, &self.product_title)
    }

    /// Resolve a field reference to text. Booleans render as `"true"`/`"false"`,
    /// unknown fields as `""`.
    pub fn field_text(&self, field: &FieldRef) -> Cow<'_, str> {
        let s: &str = match field {
            FieldRef::SourceSite => &self.source_site,
            FieldRef::ProductTitle => &self.product_title,
            FieldRef::Brand => &self.brand,
            FieldRef::Model => &self.model,
            FieldRef::Availability => &self.availability,
            FieldRef::LayoutSize => &self.layout_size,
            FieldRef::SwitchType => &self.switch_type,
            FieldRef::SwitchBrand => &self.switch_brand,
            FieldRef::Connectivity => &self.connectivity,
            FieldRef::Programmable => &self.programmable,
            FieldRef::ErgonomicFeatures => &self.ergonomic_features,
            FieldRef::Category => &self.category,
            FieldRef::HotSwappable => {
                return Cow::Borrowed(if self.hot_swappable { "true" } else { "false" })
            }
            FieldRef::Extra(key) => {
                return match self.extra.get(key) {
                    Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
                    Some(Value::Null) | None => Cow::Borrowed(""),
                    Some(other) => Cow::Owned(other.to_string()),
                }
            }
            FieldRef::Unknown(_) => "",
        };
        Cow::Borrowed(s)
    }
}

/// A product field addressed by name, as it appears in scoring profiles.
///
/// `extra.<key>` reaches into [`Product::extra`]; names that match nothing
/// resolve to empty text instead of failing the profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldRef {
    SourceSite,
    ProductTitle,
    Brand,
    Model,
    Availability,
    LayoutSize,
    SwitchType,
    SwitchBrand,
    HotSwappable,
    Connectivity,
    Programmable,
    ErgonomicFeatures,
    Category,
    Extra(String),
    Unknown(String),
}

impl FieldRef {
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        match name {
            "source_site" => Self::SourceSite,
            "product_title" | "title" => Self::ProductTitle,
            "brand" => Self::Brand,
            "model" => Self::Model,
            "availability" => Self::Availability,
            "layout_size" => Self::LayoutSize,
            "switch_type" => Self::SwitchType,
            "switch_brand" => Self::SwitchBrand,
            "hot_swappable" => Self::HotSwappable,
            "connectivity" => Self::Connectivity,
            "programmable" => Self::Programmable,
            "ergonomic_features" => Self::ErgonomicFeatures,
            "category" => Self::Category,
            other => match other.strip_prefix("extra.") {
                Some(key) if !key.is_empty() => Self::Extra(key.to_string()),
                _ => Self::Unknown(other.to_string()),
            },
        }
    }

    pub fn name(&self) -> Cow<'_, str> {
        let s = match self {
            Self::SourceSite => "source_site",
            Self::ProductTitle => "product_title",
            Self::Brand => "brand",
            Self::Model => "model",
            Self::Availability => "availability",
            Self::LayoutSize => "layout_size",
            Self::SwitchType => "switch_type",
            Self::SwitchBrand => "switch_brand",
            Self::HotSwappable => "hot_swappable",
            Self::Connectivity => "connectivity",
            Self::Programmable => "programmable",
            Self::ErgonomicFeatures => "ergonomic_features",
            Self::Category => "category",
            Self::Extra(key) => return Cow::Owned(format!("extra.{key}")),
            Self::Unknown(name) => return Cow::Borrowed(name.as_str()),
        };
        Cow::Borrowed(s)
    }
}
