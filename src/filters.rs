// src/filters.rs
//! User filters applied between collection and ranking.

use serde::{Deserialize, Serialize};

use crate::product::Product;

const WIRELESS_MARKERS: &[&str] = &["bluetooth", "2.4"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wireless {
    Yes,
    No,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// Maximum price in USD.
    pub budget: Option<f64>,
    pub wireless: Option<Wireless>,
    /// Substring of the layout or category, case-insensitive.
    pub layout: Option<String>,
    pub min_rating_count: u64,
}

pub fn is_wireless(p: &Product) -> bool {
    let c = p.connectivity.to_lowercase();
    WIRELESS_MARKERS.iter().any(|m| c.contains(m))
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn accepts(&self, p: &Product) -> bool {
        if let Some(budget) = self.budget {
            if p.price_usd > budget {
                return false;
            }
        }
        match self.wireless {
            Some(Wireless::Yes) if !is_wireless(p) => return false,
            Some(Wireless::No) if is_wireless(p) => return false,
            _ => {}
        }
        if let Some(layout) = self.layout.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            let kw = layout.to_lowercase();
            if !p.layout_size.to_lowercase().contains(&kw) && !p.category.to_lowercase().contains(&kw) {
                return false;
            }
        }
        p.rating_count >= self.min_rating_count
    }

    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        if self.is_empty() {
            return products;
        }
        products.into_iter().filter(|p| self.accepts(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb(title: &str, price: f64, conn: &str, layout: &str, reviews: u64) -> Product {
        Product {
            product_title: title.into(),
            price_usd: price,
            connectivity: conn.into(),
            layout_size: layout.into(),
            rating_count: reviews,
            ..Default::default()
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            kb("Advantage360", 449.0, "Bluetooth + USB-C", "Split Contoured", 312),
            kb("Alice98", 109.0, "USB-C (Wired)", "Alice 98%", 380),
            kb("Air75", 129.0, "Bluetooth + 2.4GHz + USB-C", "Standard 75%", 1200),
            kb("Sculpt", 44.0, "USB Receiver", "Split Dome Full", 18000),
        ]
    }

    fn titles(v: &[Product]) -> Vec<&str> {
        v.iter().map(|p| p.product_title.as_str()).collect()
    }

    #[test]
    fn budget_is_inclusive() {
        let f = Filters { budget: Some(129.0), ..Default::default() };
        assert_eq!(titles(&f.apply(sample())), ["Alice98", "Air75", "Sculpt"]);
    }

    #[test]
    fn wireless_both_ways() {
        let yes = Filters { wireless: Some(Wireless::Yes), ..Default::default() };
        let no = Filters { wireless: Some(Wireless::No), ..Default::default() };
        assert_eq!(titles(&yes.apply(sample())), ["Advantage360", "Air75"]);
        assert_eq!(titles(&no.apply(sample())), ["Alice98", "Sculpt"]);
    }

    #[test]
    fn layout_and_review_floor() {
        let f = Filters {
            layout: Some("SPLIT".into()),
            min_rating_count: 1000,
            ..Default::default()
        };
        assert_eq!(titles(&f.apply(sample())), ["Sculpt"]);
    }

    #[test]
    fn empty_filters_pass_through() {
        assert!(Filters::default().is_empty());
        assert_eq!(Filters::default().apply(sample()).len(), 4);
    }
}
