//! CLI command implementations.

pub mod product;
pub mod scrape;

#[cfg(feature = "web")]
pub mod serve;

pub use product::ProductCommand;
pub use scrape::{ScrapeCommand, ScrapeSummary};
