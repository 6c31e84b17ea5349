//! Pipeline entry points for scraper operations.
//!
//! - `run_scrape`: Fetch, filter, and persist matching card offers
//! - `run_validate`: Check the configuration file

pub mod scrape;
pub mod validate;

pub use scrape::{ScrapeOptions, ScrapeOrchestrator, run_scrape};
pub use validate::run_validate;
