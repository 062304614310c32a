//! maskfill-core: session state machine, data model, and store traits.
//!
//! This crate defines the survey data model, the persistence seam, and the
//! traversal engine that walks a participant through a masked-sentence
//! session.

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
pub mod model;
pub mod template;
pub mod traits;
pub mod view;
