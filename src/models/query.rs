// src/models/query.rs

//! Scrape query and run-mode enums.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How an offer price is compared against the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Comparison {
    /// Keep offers priced strictly below the threshold
    LessThan,
    /// Keep offers priced strictly above the threshold
    GreaterThan,
    /// Keep offers priced exactly at the threshold
    Equal,
}

impl Comparison {
    /// Apply the comparison to a price and threshold.
    pub fn matches(self, price: f64, threshold: f64) -> bool {
        match self {
            Comparison::LessThan => price < threshold,
            Comparison::GreaterThan => price > threshold,
            Comparison::Equal => price == threshold,
        }
    }

    /// Operator symbol for log output.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::LessThan => "<",
            Comparison::GreaterThan => ">",
            Comparison::Equal => "=",
        }
    }
}

/// Whether page scrapes run in a bounded worker pool or one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchMode {
    Concurrent,
    Sequential,
}

/// How matching offers are collapsed across the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DedupMode {
    /// Distinct card names only; the first sighting's price is kept
    Name,
    /// Distinct name and price pairings; one entry per observed price
    NamePrice,
}

/// Immutable search parameters shared read-only across all page scrapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeQuery {
    /// Card rarity filter (e.g. "Common", "Rare", "Mythic")
    pub rarity: String,

    /// Card color filter (e.g. "Green", "Colorless")
    pub color: String,

    /// Dollar value offers are compared against
    pub price_threshold: f64,

    /// Comparison applied between offer price and threshold
    pub comparison: Comparison,
}

impl ScrapeQuery {
    /// Validate query values for basic sanity.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.rarity.trim().is_empty() {
            return Err(crate::error::AppError::validation("rarity is empty"));
        }
        if self.color.trim().is_empty() {
            return Err(crate::error::AppError::validation("color is empty"));
        }
        if !self.price_threshold.is_finite() || self.price_threshold < 0.0 {
            return Err(crate::error::AppError::validation(
                "price_threshold must be a finite non-negative number",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_matches() {
        assert!(Comparison::LessThan.matches(0.05, 0.06));
        assert!(!Comparison::LessThan.matches(0.06, 0.06));
        assert!(Comparison::GreaterThan.matches(1.50, 0.06));
        assert!(Comparison::Equal.matches(0.06, 0.06));
        assert!(!Comparison::Equal.matches(0.0601, 0.06));
    }

    #[test]
    fn validate_rejects_negative_threshold() {
        let query = ScrapeQuery {
            rarity: "Common".into(),
            color: "Green".into(),
            price_threshold: -1.0,
            comparison: Comparison::LessThan,
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_rarity() {
        let query = ScrapeQuery {
            rarity: "  ".into(),
            color: "Green".into(),
            price_threshold: 0.06,
            comparison: Comparison::LessThan,
        };
        assert!(query.validate().is_err());
    }
}
