//! Store and session error types.
//!
//! `StoreError` is what persistence adapters return. The engine catches it at
//! the adapter boundary and reclassifies it as a `SessionError`, so the
//! rendering layer only ever sees session-level failures.

use thiserror::Error;

use crate::model::{Phase, SentenceId};

/// Errors that can occur when talking to a sentence/response store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered with a non-success HTTP status.
    #[error("store error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The store answered but the payload could not be decoded.
    #[error("invalid store payload: {0}")]
    Decode(String),

    /// Local I/O failed (fixture stores mirror responses to disk).
    #[error("store I/O error: {0}")]
    Io(String),

    /// A fault injected by a test or fixture store.
    #[error("injected failure: {0}")]
    Injected(String),
}

/// Errors surfaced by the traversal engine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Sentences could not be fetched, or the dataset is empty.
    #[error("sentence data unavailable for dataset '{dataset}': {reason}")]
    DataUnavailable { dataset: String, reason: String },

    /// A response could not be persisted. Non-fatal.
    #[error("failed to submit response for sentence {sentence_id}: {source}")]
    SubmitFailed {
        sentence_id: SentenceId,
        #[source]
        source: StoreError,
    },

    /// The operation does not apply in the current phase.
    #[error("cannot {operation} while session is in {phase} phase")]
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },

    /// A blank index past the current sentence's blank count.
    #[error("blank {slot} is out of range (sentence has {blanks} blank(s))")]
    SlotOutOfRange { slot: usize, blanks: usize },
}

impl SessionError {
    /// Returns `true` for failures that block the session from collecting.
    pub fn is_blocking(&self) -> bool {
        matches!(self, SessionError::DataUnavailable { .. })
    }
}
