//! Crash-safe resume state: an append-only JSONL log of completed records.
//!
//! One full record per line, keyed by URL. Appending is O(record) instead
//! of rewriting the whole file after every product; on load the last line
//! for a URL wins. A corrupt or missing file is an empty checkpoint, never
//! an error.

use crate::site::models::ProductRecord;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Persisted set of already-processed product URLs with their records.
#[derive(Debug)]
pub struct Checkpoint {
    path: PathBuf,
    records: Vec<ProductRecord>,
    index: HashMap<String, usize>,
}

impl Checkpoint {
    /// Creates an empty checkpoint that will append to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), records: Vec::new(), index: HashMap::new() }
    }

    /// Loads the checkpoint from disk. Unreadable files and corrupt lines
    /// degrade to missing data (a full re-scrape at worst), never to an
    /// error.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut checkpoint = Self::empty(path.clone());

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No checkpoint at {}, starting fresh", path.display());
                return checkpoint;
            }
            Err(e) => {
                warn!("Checkpoint {} unreadable ({}), starting fresh", path.display(), e);
                return checkpoint;
            }
        };

        let mut corrupt = 0usize;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<ProductRecord>(line) {
                Ok(record) => checkpoint.remember(record),
                Err(_) => corrupt += 1,
            }
        }

        if corrupt > 0 {
            warn!("Skipped {} corrupt checkpoint lines in {}", corrupt, path.display());
        }
        debug!("Loaded {} checkpointed records from {}", checkpoint.len(), path.display());

        checkpoint
    }

    /// Whether a product URL has already been processed.
    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    /// Appends a record to the log and remembers it. Called after every
    /// extracted product so an interruption loses at most the in-flight
    /// one. Write failures are fatal: without a durable checkpoint the
    /// resume contract is void.
    pub fn append(&mut self, record: &ProductRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open checkpoint {}", self.path.display()))?;

        let line = serde_json::to_string(record).context("Failed to serialize record")?;
        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;
        file.flush()?;

        self.remember(record.clone());
        Ok(())
    }

    /// Checkpointed records in first-completed order.
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    /// Number of distinct processed URLs.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing has been processed yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Path of the backing log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn remember(&mut self, record: ProductRecord) {
        match self.index.get(&record.url) {
            Some(&idx) => self.records[idx] = record,
            None => {
                self.index.insert(record.url.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }
}
