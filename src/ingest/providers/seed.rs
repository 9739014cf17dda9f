// src/ingest/providers/seed.rs
//! Curated sample listings used when an adapter runs without a live source.

use crate::product::Product;

/// Words that describe the whole curated category rather than one item.
const CATEGORY_VOCABULARY: &[&str] = &[
    "ergonomic",
    "keyboard",
    "keyboards",
    "mechanical",
    "split",
    "wireless",
];

pub(crate) struct SeedItem {
    pub title: &'static str,
    pub brand: &'static str,
    pub price_usd: f64,
    pub rating_avg: f64,
    pub rating_count: u64,
    pub layout_size: &'static str,
    pub switch_type: &'static str,
    pub switch_brand: &'static str,
    pub connectivity: &'static str,
    pub hot_swappable: bool,
    pub programmable: &'static str,
    pub ergonomic_features: &'static str,
    pub product_url: &'static str,
    pub category: &'static str,
}

impl SeedItem {
    pub fn to_product(&self, source_site: &str, region_code: &str) -> Product {
        Product {
            source_site: source_site.to_string(),
            product_title: self.title.to_string(),
            brand: self.brand.to_string(),
            price_usd: self.price_usd,
            availability: "In Stock".to_string(),
            ship_to_zip: region_code.to_string(),
            product_url: self.product_url.to_string(),
            layout_size: self.layout_size.to_string(),
            switch_type: self.switch_type.to_string(),
            switch_brand: self.switch_brand.to_string(),
            hot_swappable: self.hot_swappable,
            connectivity: self.connectivity.to_string(),
            programmable: self.programmable.to_string(),
            ergonomic_features: self.ergonomic_features.to_string(),
            rating_avg: self.rating_avg,
            rating_count: self.rating_count,
            category: self.category.to_string(),
            ..Default::default()
        }
    }
}

/// Keep an item when the query is empty, names only the category itself,
/// or shares any word with the item title.
pub(crate) fn matches_query(title: &str, query: &str) -> bool {
    let query = query.to_lowercase();
    let tokens: Vec<&str> = query.split_whitespace().collect();
    if tokens.is_empty() || tokens.iter().all(|t| CATEGORY_VOCABULARY.contains(t)) {
        return true;
    }
    let title = title.to_lowercase();
    tokens.iter().any(|t| title.contains(t))
}

/// Query-filtered, truncated sample listings for one source.
pub(crate) fn products(
    items: &[SeedItem],
    source_site: &str,
    query: &str,
    region_code: &str,
    max_results: usize,
) -> Vec<Product> {
    items
        .iter()
        .filter(|item| matches_query(item.title, query))
        .take(max_results)
        .map(|item| item.to_product(source_site, region_code))
        .collect()
}

pub(crate) const AMAZON: &[SeedItem] = &[
    SeedItem {
        title: "Kinesis Advantage360 Professional",
        brand: "Kinesis",
        price_usd: 449.0,
        rating_avg: 4.4,
        rating_count: 312,
        layout_size: "Split Contoured",
        switch_type: "Cherry MX Brown",
        switch_brand: "Cherry",
        connectivity: "Bluetooth + USB-C",
        hot_swappable: true,
        programmable: "ZMK (Open Source)",
        ergonomic_features: "Split, Tented, Contoured keywells, Thumb clusters",
        product_url: "https://www.amazon.com/dp/B0BCHMGZMD",
        category: "Premium Split",
    },
    SeedItem {
        title: "Kinesis Advantage360 (Wired)",
        brand: "Kinesis",
        price_usd: 399.0,
        rating_avg: 4.3,
        rating_count: 198,
        layout_size: "Split Contoured",
        switch_type: "Cherry MX Brown",
        switch_brand: "Cherry",
        connectivity: "USB-C",
        hot_swappable: true,
        programmable: "ZMK (Open Source)",
        ergonomic_features: "Split, Tented, Contoured keywells, Thumb clusters",
        product_url: "https://www.amazon.com/dp/B0BCHFHX6V",
        category: "Premium Split",
    },
    SeedItem {
        title: "Keychron Q10 Pro",
        brand: "Keychron",
        price_usd: 219.0,
        rating_avg: 4.5,
        rating_count: 340,
        layout_size: "Alice 75%",
        switch_type: "Gateron Jupiter Brown",
        switch_brand: "Gateron",
        connectivity: "Bluetooth + USB-C",
        hot_swappable: true,
        programmable: "QMK/VIA",
        ergonomic_features: "Alice curved split, Knob",
        product_url: "https://www.amazon.com/Keychron-Q10-Pro",
        category: "Alice",
    },
    SeedItem {
        title: "Keychron Q11 QMK Split",
        brand: "Keychron",
        price_usd: 209.0,
        rating_avg: 4.4,
        rating_count: 280,
        layout_size: "Split 75%",
        switch_type: "Gateron G Pro Brown",
        switch_brand: "Gateron",
        connectivity: "USB-C (Wired)",
        hot_swappable: true,
        programmable: "QMK/VIA",
        ergonomic_features: "Physical split, Knob, Full aluminum",
        product_url: "https://www.amazon.com/dp/B0C9Q7S8CB",
        category: "Split",
    },
    SeedItem {
        title: "Feker Alice98",
        brand: "Feker/MechLands",
        price_usd: 109.0,
        rating_avg: 4.3,
        rating_count: 380,
        layout_size: "Alice 98%",
        switch_type: "Various (Hot-swap)",
        switch_brand: "Various",
        connectivity: "USB-C (Wired)",
        hot_swappable: true,
        programmable: "VIA",
        ergonomic_features: "Alice split with numpad, Knob, 5-layer padding",
        product_url: "https://www.amazon.com/dp/B0DF2CZZ8Z",
        category: "Alice",
    },
    SeedItem {
        title: "Kinesis mWave Ergonomic Keyboard (Mac)",
        brand: "Kinesis",
        price_usd: 199.0,
        rating_avg: 4.3,
        rating_count: 98,
        layout_size: "Wave Full",
        switch_type: "Gateron Low-Profile Brown",
        switch_brand: "Gateron",
        connectivity: "Bluetooth + USB-C",
        hot_swappable: false,
        programmable: "Kinesis SmartSet",
        ergonomic_features: "Tented center, Negative tilt, Padded wrist rest, Wave layout",
        product_url: "https://www.amazon.com/dp/B0DYLB3YBJ",
        category: "Wave/Ergo",
    },
    SeedItem {
        title: "Logitech Ergo K860",
        brand: "Logitech",
        price_usd: 129.0,
        rating_avg: 4.4,
        rating_count: 12500,
        layout_size: "Wave Split Full",
        switch_type: "Membrane (not mechanical)",
        switch_brand: "Logitech",
        connectivity: "Bluetooth + USB Receiver",
        hot_swappable: false,
        programmable: "Logi Options+",
        ergonomic_features: "Split wave, Tented, Padded wrist rest, Negative tilt",
        product_url: "https://www.amazon.com/Logitech-Wireless-Ergonomic-Keyboard-Wrist/dp/B07ZWK2TQT",
        category: "Wave/Ergo",
    },
    SeedItem {
        title: "Microsoft Sculpt Ergonomic Keyboard",
        brand: "Microsoft",
        price_usd: 44.0,
        rating_avg: 4.3,
        rating_count: 18000,
        layout_size: "Split Dome Full",
        switch_type: "Membrane",
        switch_brand: "Microsoft",
        connectivity: "USB Receiver",
        hot_swappable: false,
        programmable: "No",
        ergonomic_features: "Split dome, Tented, Padded wrist rest, Separate numpad",
        product_url: "https://www.amazon.com/Microsoft-Ergonomic-Keyboard-Business-5KV-00001/dp/B00CYX26BC",
        category: "Budget Ergo",
    },
    SeedItem {
        title: "NuPhy Air75 V2",
        brand: "NuPhy",
        price_usd: 129.0,
        rating_avg: 4.5,
        rating_count: 1200,
        layout_size: "Standard 75%",
        switch_type: "NuPhy Low-Profile",
        switch_brand: "NuPhy",
        connectivity: "Bluetooth + 2.4GHz + USB-C",
        hot_swappable: true,
        programmable: "Software",
        ergonomic_features: "Low-profile, Lightweight, Portable",
        product_url: "https://www.amazon.com/NuPhy-Air75-V2",
        category: "Low-Profile",
    },
    SeedItem {
        title: "Cloud Nine ErgoTKL Split Keyboard",
        brand: "Cloud Nine",
        price_usd: 169.0,
        rating_avg: 4.2,
        rating_count: 230,
        layout_size: "Split TKL",
        switch_type: "Cherry MX Brown",
        switch_brand: "Cherry",
        connectivity: "USB",
        hot_swappable: false,
        programmable: "Software",
        ergonomic_features: "Split, Padded wrist rest, Adjustable splay",
        product_url: "https://www.amazon.com/Cloud-Nine-ErgoTKL",
        category: "Split",
    },
    SeedItem {
        title: "EPOMAKER Alice66",
        brand: "EPOMAKER",
        price_usd: 89.0,
        rating_avg: 4.2,
        rating_count: 320,
        layout_size: "Alice 65%",
        switch_type: "Various (Hot-swap)",
        switch_brand: "Various",
        connectivity: "Bluetooth + 2.4GHz + USB-C",
        hot_swappable: true,
        programmable: "Software",
        ergonomic_features: "Alice layout, Wireless, Budget",
        product_url: "https://www.amazon.com/EPOMAKER-Alice66",
        category: "Alice",
    },
    SeedItem {
        title: "Perixx PERIBOARD-535 Ergonomic",
        brand: "Perixx",
        price_usd: 69.0,
        rating_avg: 4.1,
        rating_count: 580,
        layout_size: "Split Wave Full",
        switch_type: "Kailh Brown",
        switch_brand: "Kailh",
        connectivity: "USB",
        hot_swappable: false,
        programmable: "No",
        ergonomic_features: "Split wave, Tented, Low-profile keycaps, Wrist rest",
        product_url: "https://www.amazon.com/Perixx-PERIBOARD-535",
        category: "Budget Ergo",
    },
    SeedItem {
        title: "X-Bows Nature Ergonomic",
        brand: "X-Bows",
        price_usd: 139.0,
        rating_avg: 4.0,
        rating_count: 190,
        layout_size: "Cross-linear TKL",
        switch_type: "Gateron Brown",
        switch_brand: "Gateron",
        connectivity: "USB-C",
        hot_swappable: true,
        programmable: "Software",
        ergonomic_features: "Cross-linear layout, Reduced finger travel, Thumb cluster",
        product_url: "https://www.amazon.com/X-Bows-Nature",
        category: "Ergonomic",
    },
    SeedItem {
        title: "Kinesis Freestyle2 for PC",
        brand: "Kinesis",
        price_usd: 89.0,
        rating_avg: 4.1,
        rating_count: 1100,
        layout_size: "Split Flat Full",
        switch_type: "Membrane",
        switch_brand: "Kinesis",
        connectivity: "USB",
        hot_swappable: false,
        programmable: "SmartSet",
        ergonomic_features: "Split (20in), VIP3 tenting kit, Splay adjustable",
        product_url: "https://www.amazon.com/Kinesis-Freestyle2-Ergonomic-Keyboard-Separation/dp/B0089ZLENA",
        category: "Split",
    },
    SeedItem {
        title: "GMK70 Alice",
        brand: "GMK",
        price_usd: 79.0,
        rating_avg: 4.1,
        rating_count: 450,
        layout_size: "Alice 70%",
        switch_type: "Various (Hot-swap)",
        switch_brand: "Various",
        connectivity: "Bluetooth + 2.4GHz + USB-C",
        hot_swappable: true,
        programmable: "Software",
        ergonomic_features: "Alice layout, Budget-friendly entry",
        product_url: "https://www.amazon.com/GMK70-Alice",
        category: "Alice",
    },
    SeedItem {
        title: "IQUNIX Magi96 Low-Profile",
        brand: "IQUNIX",
        price_usd: 199.0,
        rating_avg: 4.3,
        rating_count: 150,
        layout_size: "Standard 96%",
        switch_type: "Low-Profile",
        switch_brand: "IQUNIX",
        connectivity: "Bluetooth + USB-C",
        hot_swappable: true,
        programmable: "Software",
        ergonomic_features: "Ultra-slim 11mm, Aircraft aluminum, Low-profile",
        product_url: "https://www.amazon.com/IQUNIX-Magi96",
        category: "Low-Profile",
    },
    SeedItem {
        title: "ZSA Moonlander Mark I",
        brand: "ZSA",
        price_usd: 365.0,
        rating_avg: 4.6,
        rating_count: 420,
        layout_size: "Split Columnar",
        switch_type: "Kailh Box Brown",
        switch_brand: "Kailh",
        connectivity: "USB-C",
        hot_swappable: true,
        programmable: "QMK (Oryx)",
        ergonomic_features: "Split, Tented, Columnar, Thumb clusters, Palm rest",
        product_url: "https://www.amazon.com/ZSA-Moonlander",
        category: "Premium Split",
    },
    SeedItem {
        title: "Dygma Defy",
        brand: "Dygma",
        price_usd: 369.0,
        rating_avg: 4.4,
        rating_count: 150,
        layout_size: "Split Columnar",
        switch_type: "Gateron Brown",
        switch_brand: "Gateron",
        connectivity: "Bluetooth + 2.4GHz + USB-C",
        hot_swappable: true,
        programmable: "Bazecor",
        ergonomic_features: "Split, Tented, Columnar, Thumb clusters, Wrist rest",
        product_url: "https://www.amazon.com/Dygma-Defy",
        category: "Premium Split",
    },
];

pub(crate) const BESTBUY: &[SeedItem] = &[
    SeedItem {
        title: "Logitech Ergo K860",
        brand: "Logitech",
        price_usd: 129.0,
        rating_avg: 4.4,
        rating_count: 890,
        layout_size: "Wave Split Full",
        switch_type: "Membrane (not mechanical)",
        switch_brand: "Logitech",
        connectivity: "Bluetooth + USB Receiver",
        hot_swappable: false,
        programmable: "Logi Options+",
        ergonomic_features: "Split wave, Tented, Padded wrist rest, Negative tilt",
        product_url: "https://www.bestbuy.com/site/logitech-ergo-k860/6395346.p",
        category: "Wave/Ergo",
    },
    SeedItem {
        title: "Logitech MX Keys S",
        brand: "Logitech",
        price_usd: 109.0,
        rating_avg: 4.6,
        rating_count: 2100,
        layout_size: "Standard Full",
        switch_type: "Low-Profile Membrane",
        switch_brand: "Logitech",
        connectivity: "Bluetooth + USB Receiver",
        hot_swappable: false,
        programmable: "Logi Options+",
        ergonomic_features: "Low-profile, Backlit, Multi-device",
        product_url: "https://www.bestbuy.com/site/logitech-mx-keys-s/6539505.p",
        category: "Standard",
    },
    SeedItem {
        title: "Corsair K70 RGB Pro",
        brand: "Corsair",
        price_usd: 159.0,
        rating_avg: 4.5,
        rating_count: 650,
        layout_size: "Standard Full",
        switch_type: "Cherry MX Red",
        switch_brand: "Cherry",
        connectivity: "USB",
        hot_swappable: false,
        programmable: "iCUE",
        ergonomic_features: "Wrist rest, Standard layout",
        product_url: "https://www.bestbuy.com/site/corsair-k70-rgb-pro/6502560.p",
        category: "Gaming",
    },
    SeedItem {
        title: "Microsoft Ergonomic Keyboard",
        brand: "Microsoft",
        price_usd: 59.0,
        rating_avg: 4.2,
        rating_count: 1500,
        layout_size: "Split Wave Full",
        switch_type: "Membrane",
        switch_brand: "Microsoft",
        connectivity: "USB",
        hot_swappable: false,
        programmable: "No",
        ergonomic_features: "Split, Tented, Padded wrist rest",
        product_url: "https://www.bestbuy.com/site/microsoft-ergonomic-keyboard/6378567.p",
        category: "Budget Ergo",
    },
];

pub(crate) const WALMART: &[SeedItem] = &[
    SeedItem {
        title: "Kinesis Advantage360 Professional",
        brand: "Kinesis",
        price_usd: 529.0,
        rating_avg: 4.4,
        rating_count: 89,
        layout_size: "Split Contoured",
        switch_type: "Cherry MX Brown",
        switch_brand: "Cherry",
        connectivity: "Bluetooth + USB-C",
        hot_swappable: true,
        programmable: "ZMK (Open Source)",
        ergonomic_features: "Split, Tented, Contoured keywells, Thumb clusters",
        product_url: "https://www.walmart.com/ip/5607615601",
        category: "Premium Split",
    },
    SeedItem {
        title: "Logitech Ergo K860",
        brand: "Logitech",
        price_usd: 119.0,
        rating_avg: 4.5,
        rating_count: 3200,
        layout_size: "Wave Split Full",
        switch_type: "Membrane (not mechanical)",
        switch_brand: "Logitech",
        connectivity: "Bluetooth + USB Receiver",
        hot_swappable: false,
        programmable: "Logi Options+",
        ergonomic_features: "Split wave, Tented, Padded wrist rest, Negative tilt",
        product_url: "https://www.walmart.com/ip/logitech-k860",
        category: "Wave/Ergo",
    },
    SeedItem {
        title: "Microsoft Sculpt Ergonomic Keyboard",
        brand: "Microsoft",
        price_usd: 39.0,
        rating_avg: 4.3,
        rating_count: 5800,
        layout_size: "Split Dome Full",
        switch_type: "Membrane",
        switch_brand: "Microsoft",
        connectivity: "USB Receiver",
        hot_swappable: false,
        programmable: "No",
        ergonomic_features: "Split dome, Tented, Padded wrist rest, Separate numpad",
        product_url: "https://www.walmart.com/ip/microsoft-sculpt",
        category: "Budget Ergo",
    },
    SeedItem {
        title: "Redragon K596 Vishnu TKL",
        brand: "Redragon",
        price_usd: 59.0,
        rating_avg: 4.3,
        rating_count: 410,
        layout_size: "Standard TKL",
        switch_type: "Redragon Brown",
        switch_brand: "Redragon",
        connectivity: "Bluetooth + USB-C",
        hot_swappable: true,
        programmable: "Software",
        ergonomic_features: "Standard TKL, Wireless",
        product_url: "https://www.walmart.com/ip/redragon-k596",
        category: "Standard",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_queries_return_everything() {
        let all = products(AMAZON, "Amazon", "ergonomic mechanical keyboard", "11201", 100);
        assert_eq!(all.len(), 18);
        assert_eq!(products(AMAZON, "Amazon", "", "11201", 100).len(), 18);
        assert!(all.iter().all(|p| p.ship_to_zip == "11201" && p.availability == "In Stock"));
    }

    #[test]
    fn specific_queries_match_titles() {
        let hits = products(AMAZON, "Amazon", "Kinesis", "10001", 100);
        assert_eq!(hits.len(), 4);
        assert!(hits.iter().all(|p| p.brand == "Kinesis"));

        // one non-category word is enough to switch to title matching
        let hits = products(AMAZON, "Amazon", "kinesis keyboard", "10001", 100);
        assert_eq!(hits.len(), 6);

        assert!(products(AMAZON, "Amazon", "trackball", "10001", 100).is_empty());
    }

    #[test]
    fn max_results_truncates() {
        assert_eq!(products(BESTBUY, "Best Buy", "", "11201", 2).len(), 2);
        assert!(products(WALMART, "Walmart", "", "11201", 0).is_empty());
    }
}
