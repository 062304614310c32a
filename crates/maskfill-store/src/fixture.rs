//! Fixture store for tests and local runs without a hosted backend.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use maskfill_core::error::StoreError;
use maskfill_core::model::{ResponseRecord, Sentence, SentenceId};
use maskfill_core::traits::SurveyStore;

/// An in-memory sentence/response store.
///
/// Sentences are grouped by dataset label. Responses are kept with upsert
/// semantics, so a second record with the same `(sentence_id, dataset,
/// round)` replaces the first. Failures can be injected for testing, and
/// responses can be mirrored to a JSON file after every successful upsert.
pub struct FixtureStore {
    datasets: HashMap<String, Vec<Sentence>>,
    responses: Mutex<Vec<ResponseRecord>>,
    fetch_calls: AtomicU32,
    upsert_calls: AtomicU32,
    fail_fetches: bool,
    /// 1-based upsert call numbers that should fail.
    failing_upserts: Vec<u32>,
    fail_all_upserts: bool,
    record_to: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    sentences: Vec<FixtureRow>,
}

#[derive(Debug, Deserialize)]
struct FixtureRow {
    dataset: String,
    id: SentenceId,
    masked: String,
}

impl Default for FixtureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureStore {
    /// An empty store: every dataset fetch returns no sentences.
    pub fn new() -> Self {
        Self {
            datasets: HashMap::new(),
            responses: Mutex::new(Vec::new()),
            fetch_calls: AtomicU32::new(0),
            upsert_calls: AtomicU32::new(0),
            fail_fetches: false,
            failing_upserts: Vec::new(),
            fail_all_upserts: false,
            record_to: None,
        }
    }

    /// Add (or replace) a dataset.
    pub fn with_dataset(mut self, dataset: &str, sentences: Vec<Sentence>) -> Self {
        self.datasets.insert(dataset.to_string(), sentences);
        self
    }

    /// Load datasets from a TOML fixture file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse fixture file: {}", path.display()))
    }

    /// Parse datasets from TOML (a list of `[[sentences]]` rows).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let parsed: FixtureFile = toml::from_str(content)?;
        let mut store = Self::new();
        for row in parsed.sentences {
            store
                .datasets
                .entry(row.dataset)
                .or_default()
                .push(Sentence::new(row.id, row.masked));
        }
        Ok(store)
    }

    /// Mirror recorded responses to `path` (as a JSON array) after each upsert.
    pub fn recording_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.record_to = Some(path.into());
        self
    }

    /// Make every sentence fetch fail.
    pub fn failing_fetches(mut self) -> Self {
        self.fail_fetches = true;
        self
    }

    /// Make the `call`-th upsert (1-based) fail.
    pub fn failing_upsert(mut self, call: u32) -> Self {
        self.failing_upserts.push(call);
        self
    }

    /// Make every upsert fail.
    pub fn failing_all_upserts(mut self) -> Self {
        self.fail_all_upserts = true;
        self
    }

    /// Dataset labels, sorted.
    pub fn datasets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.datasets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Responses currently stored, in first-insert order.
    pub fn responses(&self) -> Vec<ResponseRecord> {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    pub fn upsert_calls(&self) -> u32 {
        self.upsert_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SurveyStore for FixtureStore {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch_sentences(&self, dataset: &str) -> Result<Vec<Sentence>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_fetches {
            return Err(StoreError::Injected("sentence fetch disabled".into()));
        }
        Ok(self.datasets.get(dataset).cloned().unwrap_or_default())
    }

    async fn upsert_response(&self, record: &ResponseRecord) -> Result<(), StoreError> {
        let call = self.upsert_calls.fetch_add(1, Ordering::Relaxed) + 1;
        if self.fail_all_upserts || self.failing_upserts.contains(&call) {
            return Err(StoreError::Injected(format!("upsert #{call} rejected")));
        }

        if let Some(path) = &self.record_to {
            let mut snapshot = self.responses();
            merge_response(&mut snapshot, record);
            let json = serde_json::to_string_pretty(&snapshot)
                .map_err(|e| StoreError::Io(e.to_string()))?;
            tokio::fs::write(path, json)
                .await
                .map_err(|e| StoreError::Io(format!("{}: {e}", path.display())))?;
        }

        let stored = {
            let mut responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
            merge_response(&mut responses, record);
            responses.len()
        };
        debug!(call, stored, "fixture upsert");
        Ok(())
    }
}

/// Insert `record`, replacing any response with the same key.
fn merge_response(responses: &mut Vec<ResponseRecord>, record: &ResponseRecord) {
    match responses.iter_mut().find(|r| r.key() == record.key()) {
        Some(existing) => *existing = record.clone(),
        None => responses.push(record.clone()),
    }
}
