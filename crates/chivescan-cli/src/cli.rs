//! CLI argument definitions for chivescan.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Published achievement data set.
pub const CATALOG_URL: &str =
    "https://github.com/hashblen/HSRAchievementData/raw/main/output/processed_data.json";

#[derive(Parser)]
#[command(name = "chivescan")]
#[command(about = "Honkai: Star Rail achievement scanner", version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan the in-game achievement list
    Scan(ScanArgs),
    /// Fetch or search the achievement catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(ClapArgs)]
pub struct ScanArgs {
    /// Output directory for scan results
    #[arg(short, long, default_value = "StarRailData")]
    pub output: PathBuf,

    /// Extra settle time after each cursor step, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub scan_delay: u64,

    /// Extra settle time after each tab switch, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub nav_delay: u64,

    /// Page-boundary detection strategy (sequential, batched)
    #[arg(long, default_value = "sequential")]
    pub strategy: String,

    /// OCR backend (tesseract)
    #[arg(long, default_value = "tesseract")]
    pub ocr: String,

    /// OCR language code
    #[arg(long, default_value = "eng")]
    pub lang: String,

    /// Catalog download URL
    #[arg(long, env = "CHIVESCAN_CATALOG_URL", default_value = CATALOG_URL)]
    pub catalog_url: String,

    /// Load the catalog from a local JSON file instead of the network
    #[arg(long)]
    pub catalog_file: Option<PathBuf>,

    /// Save every captured region as a PNG into this directory
    #[arg(long)]
    pub debug_captures: Option<PathBuf>,

    /// Minimum name similarity to accept a match
    #[arg(long, default_value_t = 0.5)]
    pub match_floor: f64,
}

#[derive(Subcommand)]
pub enum CatalogAction {
    /// Download the catalog JSON to a local file
    Fetch {
        /// Output file path
        #[arg(short, long, default_value = "catalog.json")]
        output: PathBuf,
        /// Catalog download URL
        #[arg(long, env = "CHIVESCAN_CATALOG_URL", default_value = CATALOG_URL)]
        url: String,
    },
    /// Fuzzy-search catalog entries by title
    Search {
        /// Search query
        query: String,
        /// Catalog download URL
        #[arg(long, env = "CHIVESCAN_CATALOG_URL", default_value = CATALOG_URL)]
        url: String,
        /// Load the catalog from a local JSON file instead of the network
        #[arg(long)]
        catalog_file: Option<PathBuf>,
        /// Maximum number of results to print
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
}
