//! Scrape progress as atomically-swapped immutable snapshots.
//!
//! The orchestrator publishes a fresh [`Progress`] value through a
//! `tokio::sync::watch` channel after every state change; observers (CLI
//! logging, the web UI poller) read the latest snapshot without sharing
//! any mutable fields with the scrape task.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Discovering,
    Extracting,
    Writing,
    Done,
}

/// One immutable view of the pipeline state.
#[derive(Debug, Clone, Serialize, Default)]
pub struct Progress {
    pub phase: Phase,
    /// Product URLs found during discovery
    pub discovered: usize,
    /// Records restored from the checkpoint
    pub restored: usize,
    /// Products extracted this run
    pub extracted: usize,
    /// Products skipped because the checkpoint already had them
    pub skipped: usize,
    /// Products that failed fetch or were missing
    pub failed: usize,
    /// URL currently being processed
    pub current_url: Option<String>,
    /// Seconds since the scrape started
    pub elapsed_secs: u64,
}

/// Publishing side of the progress channel. Cheap to clone; all clones
/// feed the same subscribers.
#[derive(Clone)]
pub struct ProgressTracker {
    tx: Arc<watch::Sender<Progress>>,
    started: Instant,
}

impl ProgressTracker {
    /// Creates a tracker with an idle initial snapshot.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Progress::default());
        Self { tx: Arc::new(tx), started: Instant::now() }
    }

    /// Returns a receiver for the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.tx.subscribe()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Progress {
        self.tx.borrow().clone()
    }

    /// Enters a new phase, clearing the current URL.
    pub fn phase(&self, phase: Phase) {
        self.update(|p| {
            p.phase = phase;
            p.current_url = None;
        });
    }

    /// Records discovery results.
    pub fn discovered(&self, count: usize, restored: usize) {
        self.update(|p| {
            p.discovered = count;
            p.restored = restored;
        });
    }

    /// Marks a product as in flight.
    pub fn working_on(&self, url: &str) {
        let url = url.to_string();
        self.update(|p| p.current_url = Some(url));
    }

    pub fn extracted(&self) {
        self.update(|p| p.extracted += 1);
    }

    pub fn skipped(&self) {
        self.update(|p| p.skipped += 1);
    }

    pub fn failed(&self) {
        self.update(|p| p.failed += 1);
    }

    fn update(&self, apply: impl FnOnce(&mut Progress)) {
        let elapsed = self.started.elapsed().as_secs();
        self.tx.send_modify(|p| {
            apply(p);
            p.elapsed_secs = elapsed;
        });
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
