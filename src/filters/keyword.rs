//! Keyword-based name filtering.

use super::Filter;
use crate::site::models::ProductRecord;

/// Filters records by keywords in the product name.
pub struct KeywordFilter {
    /// Keywords that must appear in the name.
    required: Vec<String>,
    /// Keywords that must NOT appear in the name.
    excluded: Vec<String>,
}

impl KeywordFilter {
    /// Creates a new keyword filter.
    pub fn new(required: Vec<String>, excluded: Vec<String>) -> Self {
        Self {
            required: required.into_iter().map(|k| k.to_lowercase()).collect(),
            excluded: excluded.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Creates a filter with only required keywords.
    pub fn required(keywords: Vec<String>) -> Self {
        Self::new(keywords, Vec::new())
    }

    /// Creates a filter with only excluded keywords.
    pub fn excluded(keywords: Vec<String>) -> Self {
        Self::new(Vec::new(), keywords)
    }
}

impl Filter for KeywordFilter {
    fn matches(&self, record: &ProductRecord) -> bool {
        let name = record.name.to_lowercase();

        // All required keywords must be present
        for keyword in &self.required {
            if !name.contains(keyword) {
                return false;
            }
        }

        // No excluded keyword may be present
        for keyword in &self.excluded {
            if name.contains(keyword) {
                return false;
            }
        }

        true
    }

    fn description(&self) -> String {
        let mut parts = Vec::new();

        if !self.required.is_empty() {
            parts.push(format!("Must contain: {}", self.required.join(", ")));
        }

        if !self.excluded.is_empty() {
            parts.push(format!("Must not contain: {}", self.excluded.join(", ")));
        }

        if parts.is_empty() {
            "Keywords: any".to_string()
        } else {
            parts.join("; ")
        }
    }
}
