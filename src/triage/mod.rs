//! Symptom triage core: free-text matching, two-round candidate ranking,
//! and the per-session wizard state machine driving the flow.

pub mod matcher;
pub mod ranker;
pub mod wizard;

use thiserror::Error;

use crate::model::ModelError;

#[derive(Error, Debug)]
pub enum TriageError {
    /// User input matched no known symptom. Recoverable: re-prompt.
    #[error("no known symptom matches the input")]
    NoMatch,

    #[error(transparent)]
    Model(#[from] ModelError),
}
