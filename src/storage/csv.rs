// src/storage/csv.rs

//! CSV result sink.
//!
//! Writes the deduplicated offers to `<prefix>_<color>_<rarity>.csv` with a
//! header row, plus an optional JSON run report next to it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{CardOffer, OutputConfig, ScrapeQuery, ScrapeStats};
use crate::storage::{ResultSink, SinkSummary};

/// Filesystem-backed CSV sink.
#[derive(Clone)]
pub struct CsvSink {
    output_dir: PathBuf,
    file_prefix: String,
    write_report: bool,
}

impl CsvSink {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            output_dir: PathBuf::from(&config.dir),
            file_prefix: config.file_prefix.clone(),
            write_report: config.write_report,
        }
    }

    /// Result file name for a query: `<prefix>_<color>_<rarity>.csv`.
    fn file_stem(&self, query: &ScrapeQuery) -> String {
        format!("{}_{}_{}", self.file_prefix, query.color, query.rarity)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    fn render_csv(offers: &[CardOffer]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["name", "price"])?;
        for offer in offers {
            writer.write_record([offer.name.as_str(), &offer.price.to_string()])?;
        }
        writer
            .into_inner()
            .map_err(|e| AppError::config(format!("CSV buffer flush failed: {e}")))
    }
}

#[async_trait]
impl ResultSink for CsvSink {
    async fn persist(
        &self,
        offers: &[CardOffer],
        query: &ScrapeQuery,
        stats: &ScrapeStats,
    ) -> Result<SinkSummary> {
        let stem = self.file_stem(query);

        let output_path = self.output_dir.join(format!("{stem}.csv"));
        let csv_bytes = Self::render_csv(offers)?;
        self.write_bytes(&output_path, &csv_bytes).await?;

        let report_path = if self.write_report {
            let path = self.output_dir.join(format!("{stem}_report.json"));
            let report_bytes = serde_json::to_vec_pretty(stats)?;
            self.write_bytes(&path, &report_bytes).await?;
            Some(path)
        } else {
            None
        };

        Ok(SinkSummary {
            offer_count: offers.len(),
            output_path,
            report_path,
        })
    }
}
