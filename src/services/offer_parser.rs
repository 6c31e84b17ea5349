// src/services/offer_parser.rs

//! Offer text parser.
//!
//! Listing pages embed each product's offer data as a brace-delimited,
//! comma-separated `key: "value"` blob inside a script element. The format
//! is undocumented and site-controlled, so the grammar here is deliberately
//! narrow: any deviation is a [`AppError::MalformedOffer`], never a
//! partially-filled record.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::{CardOffer, normalize_name};

/// Matches the first brace-delimited span in an offer blob.
static BRACE_SPAN: OnceLock<Regex> = OnceLock::new();

fn brace_span() -> &'static Regex {
    BRACE_SPAN.get_or_init(|| Regex::new(r"\{([^{}]*)\}").expect("literal regex"))
}

/// Parse one raw offer blob into a typed [`CardOffer`].
///
/// Grammar: the first `{…}` span, split on `,` into pairs, each pair split
/// on `:` into exactly a key and a value. Keys are normalized by stripping
/// whitespace, line-break artifacts, and quotes; `product_name` and `price`
/// must both be present. The price must be a finite non-negative number
/// after quote stripping.
pub fn parse_offer_blob(blob: &str) -> Result<CardOffer> {
    let span = brace_span()
        .captures(blob)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| AppError::malformed("no brace-delimited span found"))?
        .as_str();

    let mut fields: HashMap<String, &str> = HashMap::new();
    for pair in span.split(',') {
        let parts: Vec<&str> = pair.split(':').collect();
        if parts.len() != 2 {
            return Err(AppError::malformed(format!(
                "expected exactly one ':' in pair '{}'",
                pair.trim()
            )));
        }
        fields.insert(normalize_key(parts[0]), parts[1]);
    }

    let name_raw = fields
        .get("product_name")
        .ok_or_else(|| AppError::malformed("missing key 'product_name'"))?;
    let price_raw = fields
        .get("price")
        .ok_or_else(|| AppError::malformed("missing key 'price'"))?;

    let name = normalize_name(name_raw);
    if name.is_empty() {
        return Err(AppError::malformed("empty product_name"));
    }

    let price_text = price_raw.trim().trim_matches('"').trim();
    let price: f64 = price_text
        .parse()
        .map_err(|_| AppError::malformed(format!("non-numeric price '{price_text}'")))?;
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::malformed(format!(
            "price '{price_text}' is not a finite non-negative number"
        )));
    }

    Ok(CardOffer { name, price })
}

/// Strip whitespace, line-break artifacts, and quotes from a key.
fn normalize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .filter(|c| *c != '"')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_blob() {
        let blob = r#"dataLayer.push({"product_name": "Llanowar Elves", "price": "0.05"});"#;
        let offer = parse_offer_blob(blob).unwrap();
        assert_eq!(offer.name, "Llanowar Elves");
        assert_eq!(offer.price, 0.05);
    }

    #[test]
    fn tolerates_line_breaks_and_spacing_in_keys() {
        let blob = "{ \"product_name\" : \"Card A\",\r\n \"price\" : \"1.00\" }";
        let offer = parse_offer_blob(blob).unwrap();
        assert_eq!(offer.name, "Card A");
        assert_eq!(offer.price, 1.00);
    }

    #[test]
    fn extra_keys_are_ignored() {
        let blob = r#"{"set": "Dominaria", "product_name": "Card B", "price": "2.50"}"#;
        let offer = parse_offer_blob(blob).unwrap();
        assert_eq!(offer.name, "Card B");
    }

    #[test]
    fn rejects_missing_braces() {
        let err = parse_offer_blob("product_name: x, price: 1").unwrap_err();
        assert!(matches!(err, AppError::MalformedOffer { .. }));
    }

    #[test]
    fn rejects_pair_without_colon() {
        let blob = r#"{"product_name" "Card A", "price": "0.05"}"#;
        let err = parse_offer_blob(blob).unwrap_err();
        assert!(matches!(err, AppError::MalformedOffer { .. }));
    }

    #[test]
    fn rejects_pair_with_two_colons() {
        let blob = r#"{"product_name": "Card: A", "price": "0.05"}"#;
        let err = parse_offer_blob(blob).unwrap_err();
        assert!(matches!(err, AppError::MalformedOffer { .. }));
    }

    #[test]
    fn rejects_missing_price_key() {
        let blob = r#"{"product_name": "Card A"}"#;
        let err = parse_offer_blob(blob).unwrap_err();
        assert!(matches!(err, AppError::MalformedOffer { .. }));
    }

    #[test]
    fn rejects_missing_name_key() {
        let blob = r#"{"price": "0.05"}"#;
        let err = parse_offer_blob(blob).unwrap_err();
        assert!(matches!(err, AppError::MalformedOffer { .. }));
    }

    #[test]
    fn rejects_non_numeric_price() {
        let blob = r#"{"product_name": "Card A", "price": "free"}"#;
        let err = parse_offer_blob(blob).unwrap_err();
        assert!(matches!(err, AppError::MalformedOffer { .. }));
    }

    #[test]
    fn rejects_negative_price() {
        let blob = r#"{"product_name": "Card A", "price": "-0.05"}"#;
        let err = parse_offer_blob(blob).unwrap_err();
        assert!(matches!(err, AppError::MalformedOffer { .. }));
    }

    #[test]
    fn rejects_empty_name() {
        let blob = r#"{"product_name": "  ", "price": "0.05"}"#;
        let err = parse_offer_blob(blob).unwrap_err();
        assert!(matches!(err, AppError::MalformedOffer { .. }));
    }
}
