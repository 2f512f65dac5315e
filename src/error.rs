//! Structured error types for the attribution pipeline.

use thiserror::Error;

/// Failure modes surfaced while attributing branch history.
///
/// Every variant is fatal: the pipeline never retries, and an incomplete
/// score is never presented as complete.
#[derive(Debug, Error)]
pub enum AttributionError {
    /// A repository query exited non-zero; carries its raw stderr.
    #[error("{diagnostic}")]
    Query { diagnostic: String },

    /// The `git` binary itself could not be executed.
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    /// Query output did not have the shape the parser expects.
    #[error("unparseable {context}: {text:?}")]
    Parse { context: &'static str, text: String },
}

impl AttributionError {
    pub fn query(diagnostic: impl Into<String>) -> Self {
        Self::Query {
            diagnostic: diagnostic.into(),
        }
    }

    pub fn parse(context: &'static str, text: impl Into<String>) -> Self {
        Self::Parse {
            context,
            text: text.into(),
        }
    }
}
