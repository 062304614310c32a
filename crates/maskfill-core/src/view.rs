//! Read-only snapshot of a session for the rendering layer.
//!
//! Renderers turn a [`SessionView`] into whatever they display; they never
//! reach into the engine directly.

use crate::engine::TraversalEngine;
use crate::model::{Phase, SentenceId};

/// Message shown once every sentence in the session has been answered.
pub const COMPLETION_MESSAGE: &str = "Thanks so much for participating!";

/// A piece of the current sentence: literal text or an input slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Slot { index: usize, value: String },
}

/// The sentence awaiting answers, split into text and slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub sentence_id: SentenceId,
    pub parts: Vec<Part>,
    pub blanks: usize,
}

/// Everything a renderer needs to draw the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionView {
    /// Setup form with its current (possibly default) labels.
    Setup { round: String, dataset: String },
    /// A sentence to fill in, with progress through the session.
    Collecting {
        prompt: Prompt,
        completed: usize,
        total: usize,
    },
    /// Terminal thank-you screen.
    Complete {
        message: &'static str,
        completed: usize,
    },
    /// Blocking message: the session never started collecting.
    Unavailable { message: String },
}

impl SessionView {
    pub fn phase(&self) -> Phase {
        match self {
            SessionView::Setup { .. } => Phase::Setup,
            SessionView::Collecting { .. } => Phase::Collecting,
            SessionView::Complete { .. } | SessionView::Unavailable { .. } => Phase::Done,
        }
    }
}

impl TraversalEngine {
    /// Snapshot the session for display.
    pub fn view(&self) -> SessionView {
        if let Some(reason) = self.unavailable_reason() {
            return SessionView::Unavailable {
                message: format!("Sentence data is unavailable: {reason}"),
            };
        }

        match (self.phase(), self.current_sentence()) {
            (Phase::Setup, _) => SessionView::Setup {
                round: self.setup().round.clone(),
                dataset: self.setup().dataset.clone(),
            },
            (Phase::Collecting, Some(sentence)) => {
                let segments = sentence.segments();
                let last = segments.len() - 1;
                let mut parts = Vec::with_capacity(segments.len() * 2);
                for (index, segment) in segments.into_iter().enumerate() {
                    if !segment.is_empty() {
                        parts.push(Part::Text(segment.to_string()));
                    }
                    if index != last {
                        parts.push(Part::Slot {
                            index,
                            value: self.buffer().get(index).to_string(),
                        });
                    }
                }
                SessionView::Collecting {
                    prompt: Prompt {
                        sentence_id: sentence.id.clone(),
                        parts,
                        blanks: sentence.blank_count(),
                    },
                    completed: self.completed(),
                    total: self.sentences().len(),
                }
            }
            _ => SessionView::Complete {
                message: COMPLETION_MESSAGE,
                completed: self.completed(),
            },
        }
    }
}
