// src/pipeline/scrape.rs

//! Scrape orchestration across the page range.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{
    CardOffer, Config, DedupMode, DispatchMode, PageFailure, ResultSet, ScrapeQuery, ScrapeStats,
};
use crate::services::{
    ListingFetcher, PageExtractor, PageFetcher, PageOutcome, PageScraper, RetryPolicy,
};
use crate::storage::ResultSink;
use crate::utils::{http, log};

/// Run-level switches for the orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct ScrapeOptions {
    pub dispatch: DispatchMode,
    pub dedup: DedupMode,
    /// Stop dispatching on the first terminal page failure and persist what
    /// has been accumulated so far
    pub halt_on_failure: bool,
}

/// Drives page scrapes across `1..=max_page` and aggregates the outcomes.
///
/// The aggregation loop is the only writer of the result set; page tasks
/// share nothing but the read-only query inside the scraper.
pub struct ScrapeOrchestrator<F> {
    scraper: PageScraper<F>,
    max_page: u32,
    workers: usize,
    request_delay: Duration,
    max_consecutive_failures: u32,
    show_progress: bool,
    options: ScrapeOptions,
}

impl<F: ListingFetcher> ScrapeOrchestrator<F> {
    pub fn new(scraper: PageScraper<F>, config: &Config, options: ScrapeOptions) -> Self {
        Self {
            scraper,
            max_page: config.site.max_page,
            workers: config.scraper.worker_count(),
            request_delay: Duration::from_millis(config.scraper.request_delay_ms),
            max_consecutive_failures: config.scraper.max_consecutive_failures,
            show_progress: config.logging.show_progress,
            options,
        }
    }

    /// Scrape the full range and return the deduplicated offers with stats.
    pub async fn run(&self) -> (Vec<CardOffer>, ScrapeStats) {
        let start_time = Utc::now();
        let mut results = ResultSet::new(self.options.dedup);
        let mut tally = Tally::default();

        match self.options.dispatch {
            DispatchMode::Concurrent => self.run_concurrent(&mut results, &mut tally).await,
            DispatchMode::Sequential => self.run_sequential(&mut results, &mut tally).await,
        }

        if results.is_empty() {
            log::info("No offers matched the query");
        }

        let stats = ScrapeStats {
            start_time,
            end_time: Utc::now(),
            pages_scraped: tally.scraped,
            pages_matched: tally.matched,
            pages_empty: tally.empty,
            failures: tally.failures,
            offers_kept: results.len(),
        };
        (results.into_sorted_offers(), stats)
    }

    /// Concurrent dispatch: a bounded pool of page tasks drained by this
    /// single loop. Dropping the stream on halt abandons in-flight pages
    /// without touching the accumulated results.
    async fn run_concurrent(&self, results: &mut ResultSet, tally: &mut Tally) {
        let mut outcomes = stream::iter(1..=self.max_page)
            .map(|page| async move { (page, self.scraper.scrape_page(page).await) })
            .buffer_unordered(self.workers);

        while let Some((page, outcome)) = outcomes.next().await {
            let halt = self.aggregate(page, outcome, results, tally);
            if halt {
                log::warn(&format!(
                    "Halting run at page {page}; persisting accumulated results"
                ));
                break;
            }
        }
    }

    /// Sequential dispatch: one page at a time, stopping at the first empty
    /// page since pages past the end of the listing carry no offers.
    async fn run_sequential(&self, results: &mut ResultSet, tally: &mut Tally) {
        for page in 1..=self.max_page {
            let outcome = self.scraper.scrape_page(page).await;
            let reached_end = matches!(outcome, PageOutcome::Empty);
            let halt = self.aggregate(page, outcome, results, tally);
            if halt {
                log::warn(&format!(
                    "Halting run at page {page}; persisting accumulated results"
                ));
                break;
            }
            if reached_end {
                log::info(&format!("Page {page} has no offers; end of listing"));
                break;
            }
            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        }
    }

    /// Fold one page outcome into the result set. Returns true when the run
    /// should halt.
    fn aggregate(
        &self,
        page: u32,
        outcome: PageOutcome,
        results: &mut ResultSet,
        tally: &mut Tally,
    ) -> bool {
        tally.scraped += 1;
        match outcome {
            PageOutcome::Matched(offers) => {
                tally.matched += 1;
                tally.consecutive_failures = 0;
                if self.show_progress {
                    log::debug(&format!("Page {page}: {} matching offers", offers.len()));
                }
                results.extend(offers);
                false
            }
            PageOutcome::Empty => {
                tally.empty += 1;
                tally.consecutive_failures = 0;
                if self.show_progress {
                    log::debug(&format!("Page {page}: no offers"));
                }
                false
            }
            PageOutcome::Failed(err) => {
                log::warn(&format!("Page {page} failed: {err}"));
                tally.failures.push(PageFailure {
                    page,
                    reason: err.to_string(),
                });
                tally.consecutive_failures += 1;
                self.options.halt_on_failure
                    || (self.max_consecutive_failures > 0
                        && tally.consecutive_failures >= self.max_consecutive_failures)
            }
        }
    }
}

#[derive(Default)]
struct Tally {
    scraped: usize,
    matched: usize,
    empty: usize,
    consecutive_failures: u32,
    failures: Vec<PageFailure>,
}

/// Run a full scrape against the configured listing site and persist the
/// results through `sink`.
pub async fn run_scrape(
    config: &Config,
    query: ScrapeQuery,
    options: ScrapeOptions,
    sink: &dyn ResultSink,
) -> Result<()> {
    query.validate()?;

    log::header(&format!(
        "Scraping {} {} cards priced {} {}",
        query.color,
        query.rarity,
        query.comparison.symbol(),
        query.price_threshold
    ));

    let client = http::create_async_client(&config.scraper)?;
    let fetcher = PageFetcher::new(client, &config.site.base_url);
    let extractor = PageExtractor::new(&config.selectors)?;
    let scraper = PageScraper::new(
        fetcher,
        extractor,
        Arc::new(query.clone()),
        RetryPolicy::from_config(&config.retry),
    );

    let orchestrator = ScrapeOrchestrator::new(scraper, config, options);
    let (offers, stats) = orchestrator.run().await;

    let summary = sink.persist(&offers, &query, &stats).await?;

    log::summary(
        "Scrape complete",
        &[
            ("Pages scraped", stats.pages_scraped.to_string()),
            ("Pages with offers", stats.pages_matched.to_string()),
            ("Pages failed", stats.pages_failed().to_string()),
            ("Offers kept", summary.offer_count.to_string()),
            ("Elapsed", format!("{:.1}s", stats.elapsed_secs())),
            ("Output", summary.output_path.display().to_string()),
        ],
    );
    if let Some(report_path) = &summary.report_path {
        log::sub_item(&format!("Run report: {}", report_path.display()));
    }
    for failure in &stats.failures {
        log::sub_item(&format!("Page {} failed: {}", failure.page, failure.reason));
    }

    Ok(())
}
