//! Persistence for scrape results.

pub mod csv;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CardOffer, ScrapeQuery, ScrapeStats};

// Re-export for convenience
pub use csv::CsvSink;

/// Metadata about a completed sink write.
#[derive(Debug, Clone)]
pub struct SinkSummary {
    /// Rows written to the result file
    pub offer_count: usize,
    /// Location of the result file
    pub output_path: PathBuf,
    /// Location of the run report, when one was written
    pub report_path: Option<PathBuf>,
}

/// Trait for result persistence backends.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist the final deduplicated offers and the run statistics.
    ///
    /// Repeated runs overwrite the previous output for the same query.
    async fn persist(
        &self,
        offers: &[CardOffer],
        query: &ScrapeQuery,
        stats: &ScrapeStats,
    ) -> Result<SinkSummary>;
}
