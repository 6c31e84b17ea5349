// src/services/filter.rs

//! Offer filtering by price threshold.

use crate::models::{CardOffer, Comparison};

/// Return the offers whose price satisfies `comparison` against `threshold`.
///
/// Pure and order-preserving.
pub fn matching_offers(
    offers: impl IntoIterator<Item = CardOffer>,
    threshold: f64,
    comparison: Comparison,
) -> Vec<CardOffer> {
    offers
        .into_iter()
        .filter(|offer| comparison.matches(offer.price, threshold))
        .collect()
}
