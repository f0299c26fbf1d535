//! The triage pipeline: extract text, classify it, map to a mutation.

pub mod classify;
pub mod extract;
pub mod rules;
pub mod types;

pub use classify::{Classifier, SentimentScorer, VaderScorer};
pub use extract::extract;
pub use rules::Rules;
pub use types::{Action, Category, STARRED_LABEL, TriagedMessage};
