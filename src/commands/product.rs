//! Product lookup command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::site::client::{Fetch, FetchOutcome, HttpClient};
use crate::site::models::ProductRecord;
use crate::site::Extractor;
use anyhow::{Context, Result};
use tracing::info;

/// Fetches individual product pages by URL and prints the extracted record.
pub struct ProductCommand {
    config: Config,
}

impl ProductCommand {
    /// Creates a new product command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fetches a product by URL and returns formatted output.
    pub async fn execute(&self, url: &str) -> Result<String> {
        let client = HttpClient::new(&self.config).context("Failed to create HTTP client")?;
        self.execute_with_client(&client, url).await
    }

    /// Fetches a product with a provided client (for testing).
    pub async fn execute_with_client(&self, client: &impl Fetch, url: &str) -> Result<String> {
        let url = url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("Invalid product URL: '{}'. Expected an absolute http(s) URL.", url);
        }

        info!("Looking up product: {}", url);

        let record = self.fetch_record(client, url).await?;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_record(&record))
    }

    /// Fetches multiple products by URL.
    pub async fn execute_batch(&self, urls: &[String]) -> Result<String> {
        let client = HttpClient::new(&self.config).context("Failed to create HTTP client")?;
        self.execute_batch_with_client(&client, urls).await
    }

    /// Fetches multiple products with a provided client (for testing).
    pub async fn execute_batch_with_client(
        &self,
        client: &impl Fetch,
        urls: &[String],
    ) -> Result<String> {
        let mut records: Vec<ProductRecord> = Vec::new();

        for url in urls {
            let url = url.trim();
            if !url.starts_with("http://") && !url.starts_with("https://") {
                eprintln!("Skipping invalid URL: {}", url);
                continue;
            }

            info!("Looking up product: {}", url);

            match self.fetch_record(client, url).await {
                Ok(record) => records.push(record),
                Err(e) => eprintln!("Failed to fetch {}: {}", url, e),
            }
        }

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_records(&records))
    }

    async fn fetch_record(&self, client: &impl Fetch, url: &str) -> Result<ProductRecord> {
        match client.fetch(url).await? {
            FetchOutcome::Page(html) => {
                Ok(Extractor::new(self.config.site).extract(&html, url))
            }
            FetchOutcome::Missing { status } => {
                anyhow::bail!("Product not found ({}) at {}", status, url)
            }
        }
    }
}
