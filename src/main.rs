//! catalog-crawler - Checkpointed product-catalog scraper for tool-supply storefronts
//!
//! Crawls listing pages, extracts product fields with ordered fallback
//! strategies, and writes CSV/JSON catalogs with resume support.

use anyhow::Result;
use catalog_crawler::commands::{ProductCommand, ScrapeCommand};
use catalog_crawler::config::{Config, OutputFormat};
use catalog_crawler::site::Site;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "catalog-crawler",
    version,
    about = "Checkpointed product-catalog scraper for tool-supply storefronts",
    long_about = "Crawls storefront listing pages, follows pagination, extracts structured \
                  product fields, and writes CSV/JSON catalogs with resume-on-interruption."
)]
struct Cli {
    /// Storefront to crawl
    #[arg(short, long, default_value = "als", global = true)]
    site: Site,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "CRAWLER_PROXY")]
    proxy: Option<String>,

    /// Delay between requests in milliseconds
    #[arg(long, default_value = "2000", global = true, env = "CRAWLER_DELAY")]
    delay: u64,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format for product lookups
    #[arg(short, long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the whole catalog to CSV/JSON
    #[command(alias = "run")]
    Scrape {
        /// Category/brand path segment to scope the listing walk
        #[arg(long)]
        category: Option<String>,

        /// Listing page-size query parameter
        #[arg(long, default_value = "100")]
        page_size: u32,

        /// Full start-URL override
        #[arg(long)]
        start_url: Option<String>,

        /// Safety cap on listing pages
        #[arg(long, default_value = "50")]
        max_pages: u32,

        /// Directory for catalog and checkpoint files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Ignore an existing checkpoint and re-scrape everything
        #[arg(long)]
        fresh: bool,

        /// Minimum numeric price filter
        #[arg(long)]
        min_price: Option<f64>,

        /// Maximum numeric price filter
        #[arg(long)]
        max_price: Option<f64>,

        /// Keep only in-stock products in the catalog
        #[arg(long)]
        in_stock_only: bool,

        /// Required keywords in product name (comma-separated)
        #[arg(long, value_delimiter = ',')]
        keywords: Option<Vec<String>>,

        /// Excluded keywords from product name (comma-separated)
        #[arg(long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,
    },

    /// Look up one or more product pages by URL
    #[command(alias = "p")]
    Product {
        /// Product URL(s)
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// List supported storefronts
    Sites,

    /// Run the web UI wrapping the scraper
    #[cfg(feature = "web")]
    Serve {
        /// Address to bind
        #[arg(short, long, default_value = "127.0.0.1:5000")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    config.site = cli.site;
    config.format = cli.format;
    config.delay_ms = cli.delay;

    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Scrape {
            category,
            page_size,
            start_url,
            max_pages,
            output_dir,
            fresh,
            min_price,
            max_price,
            in_stock_only,
            keywords,
            exclude,
        } => {
            // Apply scrape-specific config
            if category.is_some() {
                config.category = category;
            }
            if start_url.is_some() {
                config.start_url = start_url;
            }
            config.page_size = page_size;
            config.max_pages = max_pages;
            config.output_dir = output_dir;
            config.fresh = fresh;
            config.min_price = min_price;
            config.max_price = max_price;
            config.in_stock_only = in_stock_only;

            if let Some(kw) = keywords {
                config.keywords = kw;
            }
            if let Some(ex) = exclude {
                config.exclude_keywords = ex;
            }

            let cmd = ScrapeCommand::new(config);
            let summary = cmd.execute().await?;
            println!("{}", summary);
        }

        Commands::Product { urls } => {
            let cmd = ProductCommand::new(config);

            let output = if urls.len() == 1 {
                cmd.execute(&urls[0]).await?
            } else {
                cmd.execute_batch(&urls).await?
            };

            println!("{}", output);
        }

        Commands::Sites => {
            println!("Supported storefronts:\n");
            println!("{:<10} {:<30} {:<20}", "Code", "Domain", "Default listing");
            println!("{:-<10} {:-<30} {:-<20}", "", "", "");

            for site in Site::all() {
                println!(
                    "{:<10} {:<30} {:<20}",
                    site.to_string(),
                    site.domain(),
                    site.start_url(None, 100)
                );
            }
        }

        #[cfg(feature = "web")]
        Commands::Serve { bind } => {
            use catalog_crawler::commands::serve;
            serve::run(config, &bind).await?;
        }
    }

    Ok(())
}
