//! Data models for scraped product records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Hard cap on stored image URLs per product.
pub const IMAGE_CAP: usize = 9;

/// A single scraped product. The URL is the unique key; every other field
/// is best-effort and falls back to a typed default when the page doesn't
/// carry it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product page URL (unique key)
    pub url: String,
    /// Product name
    pub name: String,
    /// Stock-keeping unit
    #[serde(default)]
    pub sku: Option<String>,
    /// Universal product code
    #[serde(default)]
    pub upc: Option<String>,
    /// Manufacturer part number
    #[serde(default)]
    pub mpn: Option<String>,
    /// Brand name
    #[serde(default)]
    pub brand: Option<String>,
    /// Price as displayed on the page
    pub price_text: String,
    /// Parsed numeric price, None when unparseable or absent
    #[serde(default)]
    pub price_numeric: Option<f64>,
    /// Availability; true unless the page says otherwise
    pub in_stock: bool,
    /// First paragraph or meta description
    pub description_short: String,
    /// Full description text with block structure as line breaks
    pub description_full: String,
    /// Specification table rows
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    /// Absolute image URLs, discovery order, deduplicated, capped
    #[serde(default)]
    pub images: Vec<String>,
    /// Category from the breadcrumb trail
    #[serde(default)]
    pub category: Option<String>,
    /// When this record was extracted
    pub scraped_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Creates an empty record for a URL with all defaults in place.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: "N/A".to_string(),
            sku: None,
            upc: None,
            mpn: None,
            brand: None,
            price_text: "N/A".to_string(),
            price_numeric: None,
            in_stock: true,
            description_short: String::new(),
            description_full: String::new(),
            specifications: BTreeMap::new(),
            images: Vec::new(),
            category: None,
            scraped_at: Utc::now(),
        }
    }

    /// Adds an image URL, preserving first-seen order. Duplicates are
    /// dropped and the list never grows past [`IMAGE_CAP`]. Returns
    /// whether the URL was stored.
    pub fn push_image(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.images.len() >= IMAGE_CAP || self.images.contains(&url) {
            return false;
        }
        self.images.push(url);
        true
    }

    /// Returns true if the page showed a usable price.
    pub fn has_price(&self) -> bool {
        self.price_numeric.is_some()
    }
}

/// In-memory result set keyed by product URL. Re-inserting a URL replaces
/// the existing record in place instead of appending a duplicate.
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<ProductRecord>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record by URL.
    pub fn upsert(&mut self, record: ProductRecord) {
        match self.index.get(&record.url) {
            Some(&idx) => self.records[idx] = record,
            None => {
                self.index.insert(record.url.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Returns whether a URL is already present.
    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
