//! Event dispatch from the rendering layer into a session.
//!
//! Renderers emit [`SessionEvent`]s. [`SessionHandle`] is a cloneable front
//! door that serializes them: while a store call is in flight (setup
//! confirmation or a submit), further events are dropped and reported as
//! [`Dispatch::Busy`], so a double-pressed submit cannot record or advance twice.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::engine::{SubmitOutcome, TraversalEngine};
use crate::error::SessionError;
use crate::view::SessionView;

/// Input events emitted by a rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ConfirmSetup { round: String, dataset: String },
    BlankChanged { slot: usize, value: String },
    SubmitPressed,
}

/// Result of dispatching one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Setup confirmed; the session holds this many sentences.
    Confirmed(usize),
    /// A blank was updated.
    BlankSet,
    /// A submit ran (or was ignored).
    Submitted(SubmitOutcome),
    /// Dropped because another event was still being processed.
    Busy,
}

impl TraversalEngine {
    /// Apply a single rendering-layer event.
    pub async fn dispatch(&mut self, event: SessionEvent) -> Result<Dispatch, SessionError> {
        match event {
            SessionEvent::ConfirmSetup { round, dataset } => {
                self.confirm(round, dataset).await.map(Dispatch::Confirmed)
            }
            SessionEvent::BlankChanged { slot, value } => {
                self.set_blank(slot, value).map(|()| Dispatch::BlankSet)
            }
            SessionEvent::SubmitPressed => Ok(Dispatch::Submitted(self.submit().await)),
        }
    }
}

/// Shared, cloneable handle to one session.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<TraversalEngine>>,
}

impl SessionHandle {
    pub fn new(engine: TraversalEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Dispatch an event, or report [`Dispatch::Busy`] if one is in flight.
    pub async fn dispatch(&self, event: SessionEvent) -> Result<Dispatch, SessionError> {
        let Ok(mut engine) = self.inner.try_lock() else {
            debug!(?event, "session busy, event dropped");
            return Ok(Dispatch::Busy);
        };
        engine.dispatch(event).await
    }

    /// Current view, waiting for any in-flight event to finish first.
    pub async fn view(&self) -> SessionView {
        self.inner.lock().await.view()
    }
}
