//! Traversal engine: the survey session state machine.
//!
//! A session moves `Setup --confirm--> Collecting --submit*--> Done`. The
//! engine owns the sentence list, the current position, the answer buffer,
//! and a completed counter that alone decides when the session ends.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::buffer::InputBuffer;
use crate::config::{SessionConfig, SessionSetup};
use crate::error::{SessionError, StoreError};
use crate::model::{Phase, ResponseRecord, Sentence};
use crate::traits::SurveyStore;

/// Configuration for the traversal engine.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Give up on the sentence fetch after this long (reported as unavailable data).
    pub fetch_timeout: Option<Duration>,
    /// Give up on a response upsert after this long (reported as a failed submit).
    pub submit_timeout: Option<Duration>,
}

/// What a call to [`TraversalEngine::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to submit: the session is not collecting or has no sentences.
    Ignored,
    /// The response was persisted and the session advanced.
    Saved(ResponseRecord),
    /// Persisting failed; the failure was logged and the session advanced anyway.
    Unsaved(ResponseRecord),
}

/// Drives one survey session from setup to completion.
///
/// Each engine owns an independent session. Starting over means building a
/// new engine; nothing transitions out of [`Phase::Done`].
pub struct TraversalEngine {
    id: Uuid,
    store: Arc<dyn SurveyStore>,
    options: EngineOptions,
    setup: SessionSetup,
    config: Option<SessionConfig>,
    sentences: Vec<Sentence>,
    current_index: usize,
    completed: usize,
    buffer: InputBuffer,
    phase: Phase,
    unavailable: Option<String>,
}

impl TraversalEngine {
    pub fn new(store: Arc<dyn SurveyStore>, options: EngineOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            store,
            options,
            setup: SessionSetup::default(),
            config: None,
            sentences: Vec::new(),
            current_index: 0,
            completed: 0,
            buffer: InputBuffer::default(),
            phase: Phase::Setup,
            unavailable: None,
        }
    }

    /// Pre-fill the setup form (labels and quota) shown before confirmation.
    pub fn with_setup(mut self, setup: SessionSetup) -> Self {
        self.setup = setup;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn setup(&self) -> &SessionSetup {
        &self.setup
    }

    /// The frozen configuration, once setup has been confirmed.
    pub fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    /// Why the session could not start collecting, if it could not.
    pub fn unavailable_reason(&self) -> Option<&str> {
        self.unavailable.as_deref()
    }

    /// The sentence awaiting answers; `None` outside the collecting phase.
    pub fn current_sentence(&self) -> Option<&Sentence> {
        if self.phase != Phase::Collecting {
            return None;
        }
        self.sentences.get(self.current_index)
    }

    /// `completed >= sentences.len()`, independent of index wrap-around.
    pub fn is_complete(&self) -> bool {
        self.completed >= self.sentences.len()
    }

    /// Freeze the setup labels and load the dataset they name.
    ///
    /// Returns the number of sentences in the session. On
    /// [`SessionError::DataUnavailable`] the session never reaches the
    /// collecting phase and ends immediately.
    pub async fn confirm(
        &mut self,
        round: impl Into<String>,
        dataset: impl Into<String>,
    ) -> Result<usize, SessionError> {
        self.ensure_phase(Phase::Setup, "confirm setup")?;
        self.setup.round = round.into();
        self.setup.dataset = dataset.into();

        let config = self.setup.clone().confirm();
        let dataset = config.dataset().to_string();
        info!(
            session = %self.id,
            round = config.round(),
            dataset = %dataset,
            "session setup confirmed"
        );
        self.config = Some(config);

        self.load_sentences(&dataset).await
    }

    /// Fetch the sentence collection for `dataset` and enter the collecting phase.
    ///
    /// Called by [`confirm`](Self::confirm). Only valid once setup has been
    /// frozen and before collection has started.
    pub async fn load_sentences(&mut self, dataset: &str) -> Result<usize, SessionError> {
        let Some(quota) = self.config.as_ref().map(SessionConfig::quota) else {
            return Err(SessionError::InvalidPhase {
                operation: "load sentences before confirming setup",
                phase: self.phase,
            });
        };
        self.ensure_phase(Phase::Setup, "load sentences")?;

        let store = Arc::clone(&self.store);
        let fetched =
            with_timeout(self.options.fetch_timeout, store.fetch_sentences(dataset)).await;

        let mut sentences = match fetched {
            Ok(sentences) => sentences,
            Err(e) => return Err(self.mark_unavailable(dataset, e.to_string())),
        };
        if let Some(limit) = quota {
            sentences.truncate(limit);
        }
        let Some(first) = sentences.first() else {
            return Err(self.mark_unavailable(dataset, "no sentences".to_string()));
        };

        self.buffer = InputBuffer::with_slots(first.blank_count());
        self.current_index = 0;
        self.completed = 0;
        self.sentences = sentences;
        self.phase = Phase::Collecting;
        info!(
            session = %self.id,
            store = self.store.name(),
            dataset,
            count = self.sentences.len(),
            "sentences loaded"
        );
        Ok(self.sentences.len())
    }

    /// Write an answer into a blank of the current sentence.
    ///
    /// Trailing empty answers are dropped from the buffer after every write;
    /// empty answers in the middle stay as placeholders.
    pub fn set_blank(&mut self, slot: usize, value: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_phase(Phase::Collecting, "edit a blank")?;
        if self.buffer.set(slot, value) {
            Ok(())
        } else {
            Err(SessionError::SlotOutOfRange {
                slot,
                blanks: self.buffer.slots(),
            })
        }
    }

    /// Record the current answers and move to the next sentence.
    ///
    /// A store failure is logged and swallowed: the session advances either
    /// way, and the outcome tells the caller whether the record was saved.
    /// State only changes after the store call resolves, so dropping this
    /// future mid-flight leaves the session untouched.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.phase != Phase::Collecting {
            debug!(session = %self.id, phase = %self.phase, "submit ignored");
            return SubmitOutcome::Ignored;
        }
        let (Some(sentence), Some(config)) =
            (self.sentences.get(self.current_index), self.config.as_ref())
        else {
            return SubmitOutcome::Ignored;
        };

        let record = ResponseRecord {
            sentence_id: sentence.id.clone(),
            dataset: config.dataset().to_string(),
            round: config.round().to_string(),
            response_values: self.buffer.values().to_vec(),
        };
        info!(
            session = %self.id,
            sentence_id = %record.sentence_id,
            values = ?record.response_values,
            "submitted values"
        );

        let store = Arc::clone(&self.store);
        let result = with_timeout(self.options.submit_timeout, store.upsert_response(&record)).await;
        let saved = match result {
            Ok(()) => {
                info!(session = %self.id, sentence_id = %record.sentence_id, "response recorded");
                true
            }
            Err(source) => {
                let err = SessionError::SubmitFailed {
                    sentence_id: record.sentence_id.clone(),
                    source,
                };
                error!(session = %self.id, "{err}");
                false
            }
        };

        self.advance();

        if saved {
            SubmitOutcome::Saved(record)
        } else {
            SubmitOutcome::Unsaved(record)
        }
    }

    fn advance(&mut self) {
        let total = self.sentences.len();
        if total == 0 {
            return;
        }
        self.current_index = (self.current_index + 1) % total;
        self.completed += 1;

        // Sized for the sentence at the new index, even when the session just
        // finished and nothing will be shown.
        let blanks = self
            .sentences
            .get(self.current_index)
            .map(Sentence::blank_count)
            .unwrap_or(0);
        self.buffer = InputBuffer::with_slots(blanks);

        if self.is_complete() {
            self.phase = Phase::Done;
            info!(session = %self.id, completed = self.completed, "session complete");
        }
    }

    fn mark_unavailable(&mut self, dataset: &str, reason: String) -> SessionError {
        warn!(session = %self.id, dataset, %reason, "sentence data unavailable");
        self.sentences.clear();
        self.buffer = InputBuffer::default();
        self.unavailable = Some(reason.clone());
        self.phase = Phase::Done;
        SessionError::DataUnavailable {
            dataset: dataset.to_string(),
            reason,
        }
    }

    fn ensure_phase(&self, expected: Phase, operation: &'static str) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidPhase {
                operation,
                phase: self.phase,
            })
        }
    }
}

/// Run a store call, converting an elapsed deadline into [`StoreError::Timeout`].
async fn with_timeout<T>(
    limit: Option<Duration>,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| Err(StoreError::Timeout(limit.as_millis() as u64))),
        None => call.await,
    }
}
