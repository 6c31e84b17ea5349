// src/pipeline/validate.rs

//! Configuration validation entry point.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;
use crate::utils::log;

/// Validate the configuration file and print the effective settings.
pub fn run_validate(config_path: &Path) -> Result<()> {
    log::header("Validating configuration");

    let config = Config::load(config_path)?;
    match config.validate() {
        Ok(()) => {
            log::success("Configuration is valid");
            log::sub_item(&format!("User agent: {}", config.scraper.user_agent));
            log::sub_item(&format!("Timeout: {}s", config.scraper.timeout_secs));
            log::sub_item(&format!("Workers: {}", config.scraper.worker_count()));
            log::sub_item(&format!(
                "Retry: {} attempts, {}ms backoff",
                config.retry.max_attempts, config.retry.backoff_ms
            ));
            log::sub_item(&format!("Base URL: {}", config.site.base_url));
            log::sub_item(&format!("Page ceiling: {}", config.site.max_page));
            log::sub_item(&format!("Output dir: {}", config.output.dir));
            Ok(())
        }
        Err(e) => {
            log::error(&format!("Configuration is invalid: {e}"));
            Err(e)
        }
    }
}
