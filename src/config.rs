//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::site::sites::Site;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Storefront to crawl
    #[serde(default)]
    pub site: Site,

    /// Category/brand path segment scoping the listing walk
    #[serde(default)]
    pub category: Option<String>,

    /// Listing page-size query parameter
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Full start-URL override; wins over site/category/page_size
    #[serde(default)]
    pub start_url: Option<String>,

    /// Safety cap on listing pages walked
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay between requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Fetch attempts per URL before giving up
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Base backoff between retries in milliseconds, doubled per attempt
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Directory receiving catalog and checkpoint files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Ignore an existing checkpoint (still appends to it)
    #[serde(default)]
    pub fresh: bool,

    /// Output format for single-product lookups
    #[serde(default)]
    pub format: OutputFormat,

    /// Filter: minimum numeric price
    #[serde(default)]
    pub min_price: Option<f64>,

    /// Filter: maximum numeric price
    #[serde(default)]
    pub max_price: Option<f64>,

    /// Filter: drop out-of-stock products from the catalog
    #[serde(default)]
    pub in_stock_only: bool,

    /// Filter: keywords that must appear in the product name
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Filter: keywords that must NOT appear in the product name
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
}

fn default_page_size() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    50
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: Site::Als,
            category: None,
            page_size: default_page_size(),
            start_url: None,
            max_pages: default_max_pages(),
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: 0,
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            backoff_ms: default_backoff_ms(),
            output_dir: default_output_dir(),
            fresh: false,
            format: OutputFormat::Table,
            min_price: None,
            max_price: None,
            in_stock_only: false,
            keywords: Vec::new(),
            exclude_keywords: Vec::new(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("catalog-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(site) = std::env::var("CRAWLER_SITE") {
            if let Ok(s) = site.parse() {
                self.site = s;
            }
        }

        if let Ok(proxy) = std::env::var("CRAWLER_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("CRAWLER_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        self
    }

    /// The listing URL the walk starts from.
    pub fn start_url(&self) -> String {
        match &self.start_url {
            Some(url) => url.clone(),
            None => self.site.start_url(self.category.as_deref(), self.page_size),
        }
    }

    /// CSV catalog path for the configured site.
    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_catalog.csv", self.site.slug()))
    }

    /// JSON catalog path for the configured site.
    pub fn json_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_catalog.json", self.site.slug()))
    }

    /// Checkpoint log path for the configured site.
    pub fn checkpoint_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_progress.jsonl", self.site.slug()))
    }
}

/// Output format for single-product lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.site, Site::Als);
        assert_eq!(config.delay_ms, 2000);
        assert_eq!(config.delay_jitter_ms, 0);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_pages, 50);
        assert_eq!(config.retries, 3);
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.proxy.is_none());
        assert!(config.start_url.is_none());
        assert!(!config.fresh);
        assert!(!config.in_stock_only);
        assert!(config.keywords.is_empty());
    }

    #[test]
    fn test_start_url_derived_from_site() {
        let config = Config::default();
        assert!(config.start_url().starts_with("https://www.alstapingtools.com/"));
        assert!(config.start_url().contains("limit=100"));
    }

    #[test]
    fn test_start_url_override_wins() {
        let config = Config {
            start_url: Some("http://localhost:9999/listing".to_string()),
            ..Config::default()
        };
        assert_eq!(config.start_url(), "http://localhost:9999/listing");
    }

    #[test]
    fn test_output_paths_use_site_slug() {
        let config = Config { output_dir: PathBuf::from("/tmp/out"), ..Config::default() };
        assert_eq!(config.csv_path(), PathBuf::from("/tmp/out/als_catalog.csv"));
        assert_eq!(config.json_path(), PathBuf::from("/tmp/out/als_catalog.json"));
        assert_eq!(config.checkpoint_path(), PathBuf::from("/tmp/out/als_progress.jsonl"));

        let config = Config { site: Site::Tswfast, ..Config::default() };
        assert_eq!(config.csv_path(), PathBuf::from("./tswfast_catalog.csv"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "invalid".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            site = "tswfast"
            delay_ms = 3000
            max_pages = 10
            in_stock_only = true
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.site, Site::Tswfast);
        assert_eq!(config.delay_ms, 3000);
        assert_eq!(config.max_pages, 10);
        assert!(config.in_stock_only);
        // Unset fields keep defaults
        assert_eq!(config.page_size, 100);
        assert_eq!(config.retries, 3);
    }

    #[test]
    fn test_config_from_toml_all_fields() {
        let toml = r#"
            site = "als"
            category = "taping-tools"
            page_size = 50
            start_url = "https://www.alstapingtools.com/custom/"
            max_pages = 5
            proxy = "socks5://localhost:1080"
            delay_ms = 1500
            delay_jitter_ms = 500
            timeout_secs = 20
            retries = 5
            backoff_ms = 250
            output_dir = "/tmp/catalogs"
            fresh = true
            format = "json"
            min_price = 10.0
            max_price = 500.0
            in_stock_only = true
            keywords = ["taper"]
            exclude_keywords = ["refurbished"]
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.category.as_deref(), Some("taping-tools"));
        assert_eq!(config.page_size, 50);
        assert_eq!(config.start_url.as_deref(), Some("https://www.alstapingtools.com/custom/"));
        assert_eq!(config.proxy.as_deref(), Some("socks5://localhost:1080"));
        assert_eq!(config.delay_jitter_ms, 500);
        assert_eq!(config.timeout_secs, 20);
        assert_eq!(config.retries, 5);
        assert_eq!(config.backoff_ms, 250);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/catalogs"));
        assert!(config.fresh);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.min_price, Some(10.0));
        assert_eq!(config.max_price, Some(500.0));
        assert_eq!(config.keywords, vec!["taper"]);
        assert_eq!(config.exclude_keywords, vec!["refurbished"]);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            site = "tswfast"
            delay_ms = 4000
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.site, Site::Tswfast);
        assert_eq!(config.delay_ms, 4000);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let result = Config::from_file(file.path());
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            max_pages = 2
            "#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.max_pages, 2);
    }

    #[test]
    fn test_config_with_env() {
        let orig_site = std::env::var("CRAWLER_SITE").ok();
        let orig_proxy = std::env::var("CRAWLER_PROXY").ok();
        let orig_delay = std::env::var("CRAWLER_DELAY").ok();

        std::env::set_var("CRAWLER_SITE", "tswfast");
        std::env::set_var("CRAWLER_PROXY", "http://proxy:8080");
        std::env::set_var("CRAWLER_DELAY", "5000");

        let config = Config::new().with_env();
        assert_eq!(config.site, Site::Tswfast);
        assert_eq!(config.proxy, Some("http://proxy:8080".to_string()));
        assert_eq!(config.delay_ms, 5000);

        match orig_site {
            Some(v) => std::env::set_var("CRAWLER_SITE", v),
            None => std::env::remove_var("CRAWLER_SITE"),
        }
        match orig_proxy {
            Some(v) => std::env::set_var("CRAWLER_PROXY", v),
            None => std::env::remove_var("CRAWLER_PROXY"),
        }
        match orig_delay {
            Some(v) => std::env::set_var("CRAWLER_DELAY", v),
            None => std::env::remove_var("CRAWLER_DELAY"),
        }
    }

    #[test]
    fn test_config_with_env_invalid_values() {
        let orig_site = std::env::var("CRAWLER_SITE").ok();
        let orig_delay = std::env::var("CRAWLER_DELAY").ok();

        std::env::set_var("CRAWLER_SITE", "not_a_site");
        std::env::set_var("CRAWLER_DELAY", "not_a_number");

        let config = Config::new().with_env();
        // Invalid values are ignored, keeping defaults
        assert_eq!(config.site, Site::Als);
        assert_eq!(config.delay_ms, 2000);

        match orig_site {
            Some(v) => std::env::set_var("CRAWLER_SITE", v),
            None => std::env::remove_var("CRAWLER_SITE"),
        }
        match orig_delay {
            Some(v) => std::env::set_var("CRAWLER_DELAY", v),
            None => std::env::remove_var("CRAWLER_DELAY"),
        }
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            site: Site::Tswfast,
            category: Some("brand_stabila".to_string()),
            delay_ms: 3000,
            min_price: Some(10.0),
            in_stock_only: true,
            ..Config::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.site, config.site);
        assert_eq!(parsed.category, config.category);
        assert_eq!(parsed.delay_ms, config.delay_ms);
        assert_eq!(parsed.min_price, config.min_price);
        assert_eq!(parsed.in_stock_only, config.in_stock_only);
    }
}
