//! Durable history store
//!
//! Layout under the store root: one `<test-name>.json` document per
//! test holding its full entries, plus `current-run.json` holding one
//! compact summary row per test for the latest run. Documents are
//! plain JSON arrays; added fields stay backward compatible because
//! every record type deserializes with defaults.

use chrono::{DateTime, Duration, Utc};
use faultline_config::HistoryConfig;
use faultline_core::{HistoryEntry, RunSummary};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::HistoryResult;

const CURRENT_RUN_FILE: &str = "current-run.json";

/// Dual retention rule: an entry survives only if it is inside the age
/// window AND among the newest `max_entries` (intersection)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_age: Duration,
    pub max_entries: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::days(30),
            max_entries: 100,
        }
    }
}

impl RetentionPolicy {
    /// Prune `entries` in place; entries are kept in timestamp order
    pub fn apply(&self, entries: &mut Vec<HistoryEntry>, now: DateTime<Utc>) {
        let cutoff = now - self.max_age;
        entries.retain(|entry| entry.timestamp >= cutoff);

        if entries.len() > self.max_entries {
            let excess = entries.len() - self.max_entries;
            entries.drain(..excess);
        }
    }
}

/// Append-only run history on the filesystem
#[derive(Debug, Clone)]
pub struct HistoryStore {
    root: PathBuf,
    retention: RetentionPolicy,
}

impl HistoryStore {
    pub fn new(root: impl Into<PathBuf>, retention: RetentionPolicy) -> Self {
        Self {
            root: root.into(),
            retention,
        }
    }

    /// Build a store from the history config domain
    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::new(
            config.dir.clone(),
            RetentionPolicy {
                max_age: Duration::days(i64::from(config.max_age_days)),
                max_entries: config.max_entries,
            },
        )
    }

    /// Directory holding the history documents
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Append a validated run to its test's history, prune to the
    /// retention policy, and refresh the current-run summary document
    pub async fn record(&self, entry: HistoryEntry) -> HistoryResult<()> {
        fs::create_dir_all(&self.root).await?;

        let mut entries = self.history(&entry.test_name).await?;
        let summary = entry.summary();
        let test_name = entry.test_name.clone();

        entries.push(entry);
        // Storage order is non-decreasing by timestamp even if a
        // backdated entry arrives.
        entries.sort_by_key(|e| e.timestamp);
        self.retention.apply(&mut entries, Utc::now());

        let path = self.test_path(&test_name);
        fs::write(&path, serde_json::to_vec_pretty(&entries)?).await?;
        debug!(
            "Recorded run for '{}' ({} entries retained)",
            test_name,
            entries.len()
        );

        self.update_current_run(summary).await?;
        Ok(())
    }

    /// Full history for one test, oldest first; empty when none exists
    pub async fn history(&self, test_name: &str) -> HistoryResult<Vec<HistoryEntry>> {
        let path = self.test_path(test_name);
        match fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Most recent entry for one test
    pub async fn latest(&self, test_name: &str) -> HistoryResult<Option<HistoryEntry>> {
        Ok(self.history(test_name).await?.into_iter().next_back())
    }

    /// Summary rows for the latest run of every recorded test
    pub async fn current_run(&self) -> HistoryResult<Vec<RunSummary>> {
        let path = self.root.join(CURRENT_RUN_FILE);
        match fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_current_run(&self, summary: RunSummary) -> HistoryResult<()> {
        let mut summaries = self.current_run().await?;
        summaries.retain(|row| row.test_name != summary.test_name);
        summaries.push(summary);

        let path = self.root.join(CURRENT_RUN_FILE);
        fs::write(&path, serde_json::to_vec_pretty(&summaries)?).await?;
        Ok(())
    }

    fn test_path(&self, test_name: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize(test_name)))
    }
}

/// File-name hygiene for test names; anything outside a conservative
/// set becomes a dash
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();

    if cleaned.is_empty() {
        info!("Empty test name sanitized to 'unnamed'");
        "unnamed".to_string()
    } else {
        cleaned
    }
}
