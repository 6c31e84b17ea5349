// src/main.rs

//! cardscout: TCGPlayer card offer scraper CLI.
//!
//! Fetches paginated listing pages, extracts embedded offer data, filters by
//! a price threshold, and writes the deduplicated matches to a CSV file.

mod error;
mod models;
mod pipeline;
mod services;
mod storage;
mod utils;

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::models::{Comparison, Config, DedupMode, DispatchMode, ScrapeQuery};
use crate::pipeline::{ScrapeOptions, run_scrape, run_validate};
use crate::storage::CsvSink;
use crate::utils::log;

#[derive(Parser, Debug)]
#[command(
    name = "cardscout",
    version = "0.1.0",
    about = "Scrapes TCGPlayer card listings for offers matching a price threshold"
)]

/// CLI Arguments
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

/// CLI Commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape listings and write matching offers to CSV
    Scrape {
        /// Card rarity (Common, Uncommon, Rare, Mythic, ...)
        #[arg(long, default_value = "Common")]
        rarity: String,

        /// Card color (White, Blue, Black, Red, Green, Colorless)
        #[arg(long, default_value = "Green")]
        color: String,

        /// Dollar value offers are compared against
        #[arg(short, long, default_value_t = 0.06)]
        threshold: f64,

        /// How offer prices are compared to the threshold
        #[arg(long, value_enum, default_value = "less-than")]
        comparison: Comparison,

        /// Dispatch page scrapes concurrently or one at a time
        #[arg(long, value_enum, default_value = "concurrent")]
        dispatch: DispatchMode,

        /// Collapse matches by name, or keep every name+price pairing
        #[arg(long, value_enum, default_value = "name")]
        dedup: DedupMode,

        /// Stop the run on the first page that exhausts its retries
        #[arg(long)]
        halt_on_failure: bool,

        /// Output directory override
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Validate the configuration file
    Validate,
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config);

    if cli.quiet {
        config.logging.level = "error".to_string();
        config.logging.show_progress = false;
    }

    // Initialize logging system
    log::init(&config.logging.level);

    match cli.command {
        Command::Scrape {
            rarity,
            color,
            threshold,
            comparison,
            dispatch,
            dedup,
            halt_on_failure,
            output,
        } => {
            if let Some(dir) = output {
                config.output.dir = dir;
            }
            config.validate()?;

            let query = ScrapeQuery {
                rarity,
                color,
                price_threshold: threshold,
                comparison,
            };
            let options = ScrapeOptions {
                dispatch,
                dedup,
                halt_on_failure,
            };
            let sink = CsvSink::new(&config.output);
            run_scrape(&config, query, options, &sink).await?;
        }
        Command::Validate => run_validate(Path::new(&cli.config))?,
    }

    Ok(())
}
