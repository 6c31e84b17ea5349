// src/models/offer.rs

//! Card offer data structure.

use serde::{Deserialize, Serialize};

/// A single card offer extracted from a listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardOffer {
    /// Card name as shown in the listing
    pub name: String,

    /// Lowest offer price in dollars
    pub price: f64,
}

impl CardOffer {
    /// Normalized name used to collapse repeated sightings across pages.
    ///
    /// Strips surrounding whitespace and stray quote characters, then
    /// lowercases. Listings repeat the same card with inconsistent quoting.
    pub fn dedup_key(&self) -> String {
        normalize_name(&self.name).to_lowercase()
    }
}

/// Strip surrounding whitespace and quote characters from a card name.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_strips_quotes_and_case() {
        let a = CardOffer {
            name: "\"Llanowar Elves\"".into(),
            price: 0.05,
        };
        let b = CardOffer {
            name: " llanowar elves ".into(),
            price: 0.25,
        };
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn normalize_name_keeps_inner_quotes() {
        assert_eq!(normalize_name(" \"Ach! Hans, Run!\" "), "Ach! Hans, Run!");
    }
}
