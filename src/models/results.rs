// src/models/results.rs

//! Deduplicated accumulation of matching offers across a run.

use std::collections::BTreeMap;

use crate::models::{CardOffer, DedupMode};

/// Key an offer dedups under. Price participates only in name+price mode.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct OfferKey {
    name: String,
    price_bits: Option<u64>,
}

/// Set of matching offers, keyed per the configured dedup mode.
///
/// Insertion is commutative and idempotent per key, so pages may complete
/// in any order and the final contents are deterministic. Under name-only
/// dedup, the lowest sighted price wins for each name.
#[derive(Debug)]
pub struct ResultSet {
    mode: DedupMode,
    offers: BTreeMap<OfferKey, CardOffer>,
}

impl ResultSet {
    pub fn new(mode: DedupMode) -> Self {
        Self {
            mode,
            offers: BTreeMap::new(),
        }
    }

    fn key_for(&self, offer: &CardOffer) -> OfferKey {
        OfferKey {
            name: offer.dedup_key(),
            price_bits: match self.mode {
                DedupMode::Name => None,
                DedupMode::NamePrice => Some(offer.price.to_bits()),
            },
        }
    }

    /// Union one offer into the set.
    ///
    /// The lowest price wins for a shared key; equal prices tie-break on
    /// the raw name so the kept entry never depends on page completion
    /// order.
    pub fn insert(&mut self, offer: CardOffer) {
        let key = self.key_for(&offer);
        self.offers
            .entry(key)
            .and_modify(|existing| {
                if offer.price < existing.price
                    || (offer.price == existing.price && offer.name < existing.name)
                {
                    *existing = offer.clone();
                }
            })
            .or_insert(offer);
    }

    /// Union a batch of offers from one page outcome.
    pub fn extend(&mut self, offers: impl IntoIterator<Item = CardOffer>) {
        for offer in offers {
            self.insert(offer);
        }
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// Drain into rows ordered by dedup key, ready for the sink.
    pub fn into_sorted_offers(self) -> Vec<CardOffer> {
        self.offers.into_values().collect()
    }
}
