// src/services/fetcher.rs

//! Listing page retrieval.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::Result;
use crate::models::ScrapeQuery;

/// One fetched listing page.
///
/// A non-2xx status is reported here rather than as an error so the caller
/// can distinguish "server responded badly" from "could not reach server."
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: StatusCode,
    pub body: String,
}

/// Fetches one listing page for a query. Implemented over HTTP in
/// production and by stubs in tests.
#[async_trait]
pub trait ListingFetcher: Send + Sync {
    async fn fetch_page(&self, query: &ScrapeQuery, page: u32) -> Result<FetchedPage>;
}

/// HTTP-backed page fetcher.
pub struct PageFetcher {
    client: Client,
    base_url: String,
}

impl PageFetcher {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Build the listing URL for a page of the query's search results.
    pub fn listing_url(&self, query: &ScrapeQuery, page: u32) -> Result<Url> {
        let url = Url::parse_with_params(
            &format!("{}/product/show", self.base_url.trim_end_matches('/')),
            &[
                ("newSearch", "false"),
                ("Color", query.color.as_str()),
                ("Type", "Cards"),
                ("Rarity", query.rarity.as_str()),
                ("orientation", "list"),
                ("PageNumber", &page.to_string()),
            ],
        )?;
        Ok(url)
    }
}

#[async_trait]
impl ListingFetcher for PageFetcher {
    async fn fetch_page(&self, query: &ScrapeQuery, page: u32) -> Result<FetchedPage> {
        let url = self.listing_url(query, page)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(FetchedPage { status, body })
    }
}
