//! Core data model types for maskfill.
//!
//! Sentences come from the store, response records go back to it, and the
//! phase enum drives what the rendering layer shows.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::template;

/// Opaque sentence identifier as assigned by the store.
///
/// Row stores usually hand out integer keys, but text keys are accepted too.
/// Either form is sent back unchanged when a response is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SentenceId {
    Int(i64),
    Text(String),
}

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentenceId::Int(id) => write!(f, "{id}"),
            SentenceId::Text(id) => write!(f, "{id}"),
        }
    }
}

impl From<i32> for SentenceId {
    fn from(id: i32) -> Self {
        SentenceId::Int(i64::from(id))
    }
}

impl From<i64> for SentenceId {
    fn from(id: i64) -> Self {
        SentenceId::Int(id)
    }
}

impl From<&str> for SentenceId {
    fn from(id: &str) -> Self {
        SentenceId::Text(id.to_string())
    }
}

impl From<String> for SentenceId {
    fn from(id: String) -> Self {
        SentenceId::Text(id)
    }
}

/// A sentence with zero or more `[MASK]` blanks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Store-assigned identifier.
    pub id: SentenceId,
    /// Sentence text containing blank markers.
    pub masked: String,
}

impl Sentence {
    pub fn new(id: impl Into<SentenceId>, masked: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            masked: masked.into(),
        }
    }

    /// Number of fill-in slots in this sentence.
    pub fn blank_count(&self) -> usize {
        template::blank_count(&self.masked)
    }

    /// Literal text segments around the blanks; always `blank_count() + 1` long.
    pub fn segments(&self) -> Vec<&str> {
        template::split_segments(&self.masked)
    }
}

/// One submitted answer set, as persisted by the store.
///
/// The store treats `(sentence_id, dataset, round)` as the natural key, so a
/// resubmission for the same key overwrites the previous record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub sentence_id: SentenceId,
    pub dataset: String,
    pub round: String,
    pub response_values: Vec<String>,
}

impl ResponseRecord {
    /// Natural key used for upsert deduplication.
    pub fn key(&self) -> (&SentenceId, &str, &str) {
        (&self.sentence_id, &self.dataset, &self.round)
    }
}

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Collecting the round and dataset labels.
    Setup,
    /// Walking through sentences and collecting answers.
    Collecting,
    /// Terminal. Nothing transitions out of this phase.
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => write!(f, "setup"),
            Phase::Collecting => write!(f, "collecting"),
            Phase::Done => write!(f, "done"),
        }
    }
}
