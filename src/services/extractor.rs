// src/services/extractor.rs

//! Offer blob extraction from listing page markup.

use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::SelectorConfig;

/// Extracts raw offer text blobs from a listing page body.
pub struct PageExtractor {
    product_sel: Selector,
    offers_sel: Selector,
    blob_sel: Selector,
}

impl PageExtractor {
    /// Build an extractor from configured selectors.
    pub fn new(selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            product_sel: parse_selector(&selectors.product)?,
            offers_sel: parse_selector(&selectors.offers)?,
            blob_sel: parse_selector(&selectors.blob)?,
        })
    }

    /// Pull one raw offer blob per product container.
    ///
    /// Returns empty when the page has no product containers (the natural
    /// end-of-listing signal) and also when any product lacks the offers
    /// sub-element. A page that is only partially extractable is skipped
    /// whole rather than returned incomplete.
    pub fn extract_offer_blobs(&self, body: &str) -> Vec<String> {
        let document = Html::parse_document(body);

        let mut blobs = Vec::new();
        for product in document.select(&self.product_sel) {
            let Some(offers) = product.select(&self.offers_sel).next() else {
                return Vec::new();
            };
            let Some(blob_elem) = offers.select(&self.blob_sel).next() else {
                return Vec::new();
            };
            blobs.push(blob_elem.text().collect());
        }
        blobs
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> PageExtractor {
        PageExtractor::new(&SelectorConfig::default()).unwrap()
    }

    fn product(blob: &str) -> String {
        format!(
            r#"<div class="product"><div class="product__offers"><script>{blob}</script></div></div>"#
        )
    }

    #[test]
    fn extracts_one_blob_per_product() {
        let body = format!(
            "<html><body>{}{}</body></html>",
            product(r#"{"product_name": "Card A", "price": "0.05"}"#),
            product(r#"{"product_name": "Card B", "price": "1.00"}"#),
        );
        let blobs = extractor().extract_offer_blobs(&body);
        assert_eq!(blobs.len(), 2);
        assert!(blobs[0].contains("Card A"));
        assert!(blobs[1].contains("Card B"));
    }

    #[test]
    fn page_without_products_is_empty() {
        let blobs = extractor().extract_offer_blobs("<html><body><p>No results.</p></body></html>");
        assert!(blobs.is_empty());
    }

    #[test]
    fn product_missing_offers_element_skips_whole_page() {
        let body = format!(
            "<html><body>{}<div class=\"product\"><span>sold out</span></div></body></html>",
            product(r#"{"product_name": "Card A", "price": "0.05"}"#),
        );
        let blobs = extractor().extract_offer_blobs(&body);
        assert!(blobs.is_empty());
    }

    #[test]
    fn offers_without_script_skips_whole_page() {
        let body = r#"<html><body>
            <div class="product"><div class="product__offers"><p>none</p></div></div>
        </body></html>"#;
        let blobs = extractor().extract_offer_blobs(body);
        assert!(blobs.is_empty());
    }

    #[test]
    fn invalid_selector_is_reported() {
        let selectors = SelectorConfig {
            product: "[[invalid".into(),
            ..SelectorConfig::default()
        };
        assert!(PageExtractor::new(&selectors).is_err());
    }
}
