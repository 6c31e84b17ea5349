// src/services/page.rs

//! Single-page scrape with bounded retry.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::{CardOffer, RetryConfig, ScrapeQuery};
use crate::services::extractor::PageExtractor;
use crate::services::fetcher::ListingFetcher;
use crate::services::filter::matching_offers;
use crate::services::offer_parser::parse_offer_blob;
use crate::utils::log;

/// Outcome of one page scrape after retries are exhausted.
#[derive(Debug)]
pub enum PageOutcome {
    /// Offers passed the filter; the vec may be empty
    Matched(Vec<CardOffer>),
    /// No extractable offers; end-of-listing signal
    Empty,
    /// Terminal failure after the retry budget
    Failed(AppError),
}

/// Bounded retry policy for fetch-like operations.
///
/// Retries transient errors up to `max_attempts` total attempts with a
/// fixed backoff between them. Structural errors pass through unretried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }

    /// Run `op`, retrying while it fails transiently and attempts remain.
    ///
    /// The backoff sleep suspends instead of blocking, so other page tasks
    /// keep running.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    log::warn(&format!(
                        "Attempt {attempt}/{} failed: {err}. Retrying.",
                        self.max_attempts
                    ));
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Scrapes one listing page: fetch, extract, parse, filter.
pub struct PageScraper<F> {
    fetcher: F,
    extractor: PageExtractor,
    query: Arc<ScrapeQuery>,
    policy: RetryPolicy,
}

impl<F: ListingFetcher> PageScraper<F> {
    pub fn new(
        fetcher: F,
        extractor: PageExtractor,
        query: Arc<ScrapeQuery>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            query,
            policy,
        }
    }

    /// Scrape one page, applying the retry policy to transient failures.
    pub async fn scrape_page(&self, page: u32) -> PageOutcome {
        match self.policy.run(|| self.attempt(page)).await {
            Ok(outcome) => outcome,
            Err(err) => PageOutcome::Failed(err),
        }
    }

    /// One attempt: fetch the page, extract blobs, parse and filter offers.
    ///
    /// `Ok(Empty)` and `Ok(Matched)` are final; an `Err` is either transient
    /// (fetch-level) and retried by the caller, or structural (malformed
    /// blob) and terminal.
    async fn attempt(&self, page: u32) -> Result<PageOutcome> {
        let fetched = self.fetcher.fetch_page(&self.query, page).await?;
        if !fetched.status.is_success() {
            return Err(AppError::HttpStatus {
                status: fetched.status.as_u16(),
                url: format!("listing page {page}"),
            });
        }

        let blobs = self.extractor.extract_offer_blobs(&fetched.body);
        if blobs.is_empty() {
            return Ok(PageOutcome::Empty);
        }

        let mut offers = Vec::with_capacity(blobs.len());
        for blob in &blobs {
            offers.push(parse_offer_blob(blob)?);
        }

        Ok(PageOutcome::Matched(matching_offers(
            offers,
            self.query.price_threshold,
            self.query.comparison,
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use reqwest::StatusCode;

    use super::*;
    use crate::models::{Comparison, SelectorConfig};
    use crate::services::fetcher::FetchedPage;

    fn query() -> Arc<ScrapeQuery> {
        Arc::new(ScrapeQuery {
            rarity: "Common".into(),
            color: "Green".into(),
            price_threshold: 0.06,
            comparison: Comparison::LessThan,
        })
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            backoff: Duration::ZERO,
        }
    }

    fn extractor() -> PageExtractor {
        PageExtractor::new(&SelectorConfig::default()).unwrap()
    }

    fn listing_body(blobs: &[&str]) -> String {
        let products: String = blobs
            .iter()
            .map(|blob| {
                format!(
                    r#"<div class="product"><div class="product__offers"><script>{blob}</script></div></div>"#
                )
            })
            .collect();
        format!("<html><body>{products}</body></html>")
    }

    /// Fetcher stub that fails the first `fail_first` calls, then serves `body`.
    struct FlakyFetcher {
        calls: AtomicU32,
        fail_first: u32,
        body: String,
    }

    impl FlakyFetcher {
        fn new(fail_first: u32, body: String) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_first,
                body,
            }
        }
    }

    #[async_trait]
    impl ListingFetcher for FlakyFetcher {
        async fn fetch_page(&self, _query: &ScrapeQuery, _page: u32) -> Result<FetchedPage> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err(AppError::HttpStatus {
                    status: 503,
                    url: "stub".into(),
                });
            }
            Ok(FetchedPage {
                status: StatusCode::OK,
                body: self.body.clone(),
            })
        }
    }

    #[tokio::test]
    async fn retries_once_then_succeeds() {
        let body = listing_body(&[r#"{"product_name": "Card A", "price": "0.05"}"#]);
        let scraper = PageScraper::new(FlakyFetcher::new(1, body), extractor(), query(), policy());

        let outcome = scraper.scrape_page(1).await;
        match outcome {
            PageOutcome::Matched(offers) => {
                assert_eq!(offers.len(), 1);
                assert_eq!(offers[0].name, "Card A");
            }
            other => panic!("expected Matched, got {other:?}"),
        }
        assert_eq!(scraper.fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_two_attempts() {
        let scraper = PageScraper::new(
            FlakyFetcher::new(u32::MAX, String::new()),
            extractor(),
            query(),
            policy(),
        );

        let outcome = scraper.scrape_page(1).await;
        assert!(matches!(outcome, PageOutcome::Failed(_)));
        assert_eq!(scraper.fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn malformed_blob_fails_without_retry() {
        let body = listing_body(&[r#"{"product_name" "Card A", "price": "0.05"}"#]);
        let scraper = PageScraper::new(FlakyFetcher::new(0, body), extractor(), query(), policy());

        let outcome = scraper.scrape_page(1).await;
        match outcome {
            PageOutcome::Failed(err) => {
                assert!(matches!(err, AppError::MalformedOffer { .. }))
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(scraper.fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn page_without_offers_is_empty_not_failed() {
        let body = r#"<html><body>
            <div class="product"><span>no offers here</span></div>
        </body></html>"#;
        let scraper = PageScraper::new(
            FlakyFetcher::new(0, body.to_string()),
            extractor(),
            query(),
            policy(),
        );

        let outcome = scraper.scrape_page(1).await;
        assert!(matches!(outcome, PageOutcome::Empty));
    }

    #[tokio::test]
    async fn empty_after_filter_is_still_matched() {
        let body = listing_body(&[r#"{"product_name": "Card B", "price": "9.99"}"#]);
        let scraper = PageScraper::new(FlakyFetcher::new(0, body), extractor(), query(), policy());

        let outcome = scraper.scrape_page(1).await;
        match outcome {
            PageOutcome::Matched(offers) => assert!(offers.is_empty()),
            other => panic!("expected Matched, got {other:?}"),
        }
    }

    /// Non-2xx responses come back as `Ok` from the fetcher and must still
    /// consume the retry budget.
    struct ErrorStatusFetcher {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ListingFetcher for ErrorStatusFetcher {
        async fn fetch_page(&self, _query: &ScrapeQuery, _page: u32) -> Result<FetchedPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchedPage {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "<html></html>".into(),
            })
        }
    }

    #[tokio::test]
    async fn error_status_is_retried_then_terminal() {
        let scraper = PageScraper::new(
            ErrorStatusFetcher {
                calls: AtomicU32::new(0),
            },
            extractor(),
            query(),
            policy(),
        );

        let outcome = scraper.scrape_page(1).await;
        match outcome {
            PageOutcome::Failed(AppError::HttpStatus { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected Failed(HttpStatus), got {other:?}"),
        }
        assert_eq!(scraper.fetcher.calls.load(Ordering::SeqCst), 2);
    }
}
