//! Full catalog scrape: discovery, checkpointed extraction, and output.

use crate::checkpoint::Checkpoint;
use crate::config::Config;
use crate::filters::FilterChainBuilder;
use crate::output;
use crate::progress::{Phase, Progress, ProgressTracker};
use crate::site::client::{Fetch, FetchOutcome, HttpClient};
use crate::site::models::Catalog;
use crate::site::pagination;
use crate::site::Extractor;
use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Outcome of a completed scrape run.
#[derive(Debug)]
pub struct ScrapeSummary {
    pub discovered: usize,
    pub restored: usize,
    pub extracted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub written: usize,
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
}

impl fmt::Display for ScrapeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Discovered: {} product URLs", self.discovered)?;
        writeln!(f, "Restored:   {} from checkpoint", self.restored)?;
        writeln!(f, "Extracted:  {} this run", self.extracted)?;
        writeln!(f, "Skipped:    {} already done", self.skipped)?;
        writeln!(f, "Failed:     {}", self.failed)?;
        writeln!(f, "Written:    {} records", self.written)?;
        writeln!(f, "CSV:        {}", self.csv_path.display())?;
        write!(f, "JSON:       {}", self.json_path.display())
    }
}

/// Drives the pipeline: discovery via the pagination walker, per-URL
/// fetch+extract with checkpoint updates, then the final catalog write.
/// One bad product never aborts the batch.
pub struct ScrapeCommand {
    config: Config,
    progress: ProgressTracker,
}

impl ScrapeCommand {
    /// Creates a new scrape command.
    pub fn new(config: Config) -> Self {
        Self::with_progress(config, ProgressTracker::new())
    }

    /// Creates a scrape command publishing to an existing tracker (used by
    /// the web wrapper so its poller observes the background run).
    pub fn with_progress(config: Config, progress: ProgressTracker) -> Self {
        Self { config, progress }
    }

    /// Returns a receiver for progress snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Runs the scrape end to end.
    pub async fn execute(&self) -> Result<ScrapeSummary> {
        let client = HttpClient::new(&self.config).context("Failed to create HTTP client")?;
        self.execute_with_client(&client).await
    }

    /// Runs the scrape with a provided client (for testing).
    pub async fn execute_with_client(&self, client: &impl Fetch) -> Result<ScrapeSummary> {
        let site = self.config.site;
        let start_url = self.config.start_url();

        // Discovery always replays pagination from the start URL; the
        // checkpoint only suppresses product re-fetches.
        self.progress.phase(Phase::Discovering);
        info!("Discovering products from {}", start_url);
        let urls = pagination::discover(client, site, &start_url, self.config.max_pages).await?;

        let mut checkpoint = if self.config.fresh {
            info!("Ignoring existing checkpoint (fresh run)");
            Checkpoint::empty(self.config.checkpoint_path())
        } else {
            Checkpoint::load(self.config.checkpoint_path())
        };

        let restored = checkpoint.len();
        self.progress.discovered(urls.len(), restored);
        info!("{} product URLs discovered, {} already checkpointed", urls.len(), restored);

        let mut catalog = Catalog::new();
        for record in checkpoint.records() {
            catalog.upsert(record.clone());
        }

        // Extraction
        self.progress.phase(Phase::Extracting);
        let extractor = Extractor::new(site);
        let mut extracted = 0usize;
        let mut skipped = 0usize;
        let mut failed = 0usize;

        for (i, url) in urls.iter().enumerate() {
            if checkpoint.contains(url) {
                debug!("[{}/{}] Skipping (already done): {}", i + 1, urls.len(), url);
                skipped += 1;
                self.progress.skipped();
                continue;
            }

            info!("[{}/{}] Scraping: {}", i + 1, urls.len(), url);
            self.progress.working_on(url);

            match client.fetch(url).await {
                Ok(FetchOutcome::Page(html)) => {
                    let record = extractor.extract(&html, url);
                    checkpoint.append(&record).context("Failed to persist checkpoint")?;
                    catalog.upsert(record);
                    extracted += 1;
                    self.progress.extracted();
                }
                Ok(FetchOutcome::Missing { status }) => {
                    warn!("Product not found ({}): {}", status, url);
                    failed += 1;
                    self.progress.failed();
                }
                Err(e) => {
                    warn!("Skipping {} after fetch failure: {}", url, e);
                    failed += 1;
                    self.progress.failed();
                }
            }
        }

        // Final write: checkpoint-restored plus newly extracted records
        self.progress.phase(Phase::Writing);
        let filters = FilterChainBuilder::new()
            .price_range(self.config.min_price, self.config.max_price)
            .in_stock_only(self.config.in_stock_only)
            .keywords(self.config.keywords.clone())
            .exclude_keywords(self.config.exclude_keywords.clone())
            .build();

        let records = if filters.is_empty() {
            catalog.records().to_vec()
        } else {
            debug!("Active filters: {}", filters.descriptions().join(", "));
            filters.apply(catalog.records().to_vec())
        };

        let csv_path = self.config.csv_path();
        let json_path = self.config.json_path();
        output::write_catalog(&csv_path, &json_path, &records)?;

        self.progress.phase(Phase::Done);

        Ok(ScrapeSummary {
            discovered: urls.len(),
            restored,
            extracted,
            skipped,
            failed,
            written: records.len(),
            csv_path,
            json_path,
        })
    }
}
