//! pharma-scan - Medicine price comparison CLI for Brazilian pharmacies
//!
//! Drives a pharmacy aggregation backend: searches every configured store,
//! compares brand prices, and requests per-brand positioning analyses.

use anyhow::Result;
use clap::{Parser, Subcommand};
use pharma_scan::catalog::SortKey;
use pharma_scan::commands::{AnalyzeCommand, SearchCommand, SearchOptions};
use pharma_scan::config::{Config, OutputFormat};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pharma-scan",
    version,
    about = "Medicine price comparison CLI for Brazilian pharmacies",
    long_about = "Searches a pharmacy aggregation backend, compares brand prices across stores, and requests per-brand positioning analyses."
)]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = "PHARMA_API_URL")]
    api_url: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "PHARMA_PROXY")]
    proxy: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "PHARMA_TIMEOUT")]
    timeout: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a medicine across pharmacies
    #[command(alias = "s")]
    Search {
        /// Medicine description to search for
        description: String,

        /// Ordering of the results list
        #[arg(long)]
        sort: Option<SortKey>,

        /// Show only this pharmacy
        #[arg(long)]
        pharmacy: Option<String>,

        /// Show only this brand
        #[arg(long)]
        brand: Option<String>,

        /// Select a brand for highlighting and comparison
        #[arg(long)]
        select: Option<String>,

        /// Page to show (1-based)
        #[arg(long, default_value = "1")]
        page: usize,

        /// Products per page
        #[arg(long)]
        page_size: Option<usize>,

        /// Write the full filtered listing to a CSV file
        #[arg(long)]
        export: bool,

        /// Export destination (defaults to a timestamped name)
        #[arg(long, requires = "export")]
        output: Option<PathBuf>,
    },

    /// Analyze one brand's market position
    #[command(alias = "a")]
    Analyze {
        /// Medicine description to search for
        description: String,

        /// Brand to analyze
        brand: String,

        /// Refetch even when a cached analysis exists
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    match cli.command {
        Commands::Search {
            description,
            sort,
            pharmacy,
            brand,
            select,
            page,
            page_size,
            export,
            output,
        } => {
            // Apply search-specific config
            if let Some(sort) = sort {
                config.sort = sort;
            }
            if let Some(pharmacy) = pharmacy {
                config.pharmacy = Some(pharmacy);
            }
            if let Some(brand) = brand {
                config.brand = Some(brand);
            }
            if let Some(page_size) = page_size {
                config.page_size = page_size;
            }

            let options = SearchOptions { select, page, export, output };
            let cmd = SearchCommand::new(config, options);
            let output = cmd.execute(&description).await?;
            println!("{}", output);
        }

        Commands::Analyze { description, brand, refresh } => {
            let cmd = AnalyzeCommand::new(config, refresh);
            let output = cmd.execute(&description, &brand).await?;
            println!("{}", output);
        }
    }

    Ok(())
}
