//! Built-in chat backend.
//!
//! The engine answers health questions by matching the visitor's message
//! against a JSON corpus of intents with TF-IDF cosine similarity. Two
//! intents arm a follow-up: the next message in that conversation is read as
//! a `JJ/MM/AAAA` date and answered with a generated pregnancy or child
//! vaccination calendar.
//!
//! # Components
//!
//! - [`Corpus`]: corpus schema and loading
//! - [`IntentEngine`]: matching, dialog state, response selection
//! - [`calendar`]: date-derived reply texts

pub mod calendar;
pub mod corpus;
pub mod engine;

pub use corpus::{Corpus, FollowUp, Intent};
pub use engine::IntentEngine;

/// Errors raised while building the engine. These are startup-fatal only;
/// the engine never fails at request time.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The corpus file could not be read.
    #[error("cannot read corpus {path}: {source}")]
    Io {
        /// Path that failed to load.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The corpus file is not valid JSON of the expected shape.
    #[error("corpus is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// No intent survived validation.
    #[error("corpus contains no usable intents")]
    Empty,
}
