// src/models/stats.rs

//! Run statistics for the scrape report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A page that exhausted its retry budget, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFailure {
    pub page: u32,
    pub reason: String,
}

/// Statistics covering one scrape run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,

    /// Pages whose outcome was observed (dispatch may stop early)
    pub pages_scraped: usize,

    /// Pages that returned matching offers (possibly zero after filtering)
    pub pages_matched: usize,

    /// Pages with no extractable offers
    pub pages_empty: usize,

    /// Pages that failed terminally
    pub failures: Vec<PageFailure>,

    /// Distinct offers retained after dedup
    pub offers_kept: usize,
}

impl ScrapeStats {
    pub fn pages_failed(&self) -> usize {
        self.failures.len()
    }

    /// Run duration in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}
