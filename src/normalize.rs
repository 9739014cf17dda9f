// src/normalize.rs
//! Normalizer: loosely-typed raw values (price strings, rating strings,
//! boolean-like strings, comma-formatted counts) into canonical types.
//!
//! Every function here is total: unparsable input degrades to a default
//! (zero / false / empty) instead of failing the item.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::Value;

/// Normalize free text coming from upstream APIs: decode HTML entities,
/// strip tags, straighten typographic quotes, collapse whitespace.
///
/// Anything shaped like a tag is dropped, including literal `<...>` text in a
/// title, and the result is capped at 500 chars. Dedup keys see this form.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // Length cap: 500 chars (listing titles, not articles)
    if out.chars().count() > 500 {
        out = out.chars().take(500).collect();
    }

    out
}

/// Parse a price string like `"$1,129.99"`. `None` if nothing numeric remains.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw.replace(['$', ','], "");
    cleaned.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Parse a rating like `"4.5"` or `"4.5 out of 5"`.
pub fn parse_rating(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let head = match s.find("out of") {
        Some(idx) => &s[..idx],
        None => s,
    };
    head.trim().parse::<f64>().ok().filter(|r| r.is_finite())
}

/// Truthy spellings: `true`, `yes`, `1`, `y` (case-insensitive).
pub fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "1" | "y"
    )
}

/// Parse a review count like `"5,230"`. Non-numeric counts are `None`.
pub fn parse_count(raw: &str) -> Option<u64> {
    raw.replace(',', "").trim().parse::<u64>().ok()
}

/// Price in USD from any JSON value; never negative, 0 when unparsable.
pub fn normalize_price(raw: Option<&Value>) -> f64 {
    let price = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_price(s),
        _ => None,
    };
    price.filter(|p| p.is_finite()).unwrap_or(0.0).max(0.0)
}

/// Average rating from any JSON value; 0 when unparsable.
pub fn normalize_rating(raw: Option<&Value>) -> f64 {
    let rating = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_rating(s),
        _ => None,
    };
    rating.filter(|r| r.is_finite()).unwrap_or(0.0)
}

/// Boolean from any JSON value (`true`, `"yes"`, `1`, ...).
pub fn normalize_bool(raw: Option<&Value>) -> bool {
    match raw {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|x| x == 1.0),
        Some(Value::String(s)) => parse_bool(s),
        _ => false,
    }
}

/// Non-negative rating count; comma-formatted strings accepted, anything else is 0.
pub fn normalize_count(raw: Option<&Value>) -> u64 {
    match raw {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|x| x.is_finite() && *x >= 0.0).map(|x| x as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => parse_count(s).unwrap_or(0),
        _ => 0,
    }
}

/// Render a scalar JSON value as text (`""` for null / containers).
pub fn value_text(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_drops_tag_shaped_spans_and_caps_length() {
        assert_eq!(
            normalize_text("Keychron <b>Q11</b> &amp; \u{201C}Split\u{201D}"),
            "Keychron Q11 & \"Split\""
        );
        // literal angle-bracket text goes too
        assert_eq!(normalize_text("Split Board <75% layout> Pro"), "Split Board Pro");
        // entities decode before stripping
        assert_eq!(normalize_text("Board &lt;TKL&gt;"), "Board");
        assert_eq!(normalize_text(&"a".repeat(600)).chars().count(), 500);
    }

    #[test]
    fn price_strings_and_numbers() {
        assert_eq!(normalize_price(Some(&json!("$129.99"))), 129.99);
        assert_eq!(normalize_price(Some(&json!("1,299.00"))), 1299.0);
        assert_eq!(normalize_price(Some(&json!(79.5))), 79.5);
        assert_eq!(normalize_price(Some(&json!(45))), 45.0);
        assert_eq!(normalize_price(Some(&json!("call for price"))), 0.0);
        assert_eq!(normalize_price(Some(&json!(-3.0))), 0.0);
        assert_eq!(normalize_price(None), 0.0);
    }

    #[test]
    fn rating_out_of_form() {
        assert_eq!(normalize_rating(Some(&json!("4.5 out of 5"))), 4.5);
        assert_eq!(normalize_rating(Some(&json!("4.7"))), 4.7);
        assert_eq!(normalize_rating(Some(&json!(3))), 3.0);
        assert_eq!(normalize_rating(Some(&json!("n/a"))), 0.0);
        assert_eq!(normalize_rating(Some(&Value::Null)), 0.0);
    }

    #[test]
    fn bool_spellings() {
        assert!(normalize_bool(Some(&json!("Yes"))));
        assert!(normalize_bool(Some(&json!("1"))));
        assert!(normalize_bool(Some(&json!(true))));
        assert!(normalize_bool(Some(&json!(1))));
        assert!(!normalize_bool(Some(&json!("no"))));
        assert!(!normalize_bool(Some(&json!(""))));
        assert!(!normalize_bool(None));
    }

    #[test]
    fn counts_with_commas_and_garbage() {
        assert_eq!(normalize_count(Some(&json!("5,230"))), 5230);
        assert_eq!(normalize_count(Some(&json!(1200))), 1200);
        assert_eq!(normalize_count(Some(&json!(12.0))), 12);
        assert_eq!(normalize_count(Some(&json!("lots"))), 0);
        assert_eq!(normalize_count(Some(&json!(-4))), 0);
    }

    #[test]
    fn text_decodes_and_collapses() {
        let s = "  <b>Keychron&nbsp;&nbsp;Q10</b>   Pro \u{201C}Alice\u{201D} ";
        assert_eq!(normalize_text(s), "Keychron Q10 Pro \"Alice\"");
    }
}
