//! Site-specific crawling: storefront registry, HTTP client, selectors,
//! field extraction, and pagination.

pub mod client;
pub mod extract;
pub mod models;
pub mod pagination;
pub mod selectors;
pub mod sites;
pub mod urls;

pub use client::{Fetch, FetchError, FetchOutcome, HttpClient};
pub use extract::Extractor;
pub use models::{Catalog, ProductRecord};
pub use sites::Site;
