//! Pipeline error types.

use thiserror::Error;

use crate::pipeline::PipelineState;

/// Errors that can occur while building a feedback report.
#[derive(Debug, Error)]
pub enum TopicsError {
    /// A phase was invoked before its prerequisite phase completed
    #[error("Cannot run '{operation}' while pipeline is {state}")]
    OrderingViolation {
        operation: &'static str,
        state: PipelineState,
    },

    /// Clustering error
    #[error("Clustering error: {0}")]
    Clustering(String),

    /// Sentiment classification error
    #[error("Classification error: {0}")]
    Classification(String),

    /// Text generation error
    #[error("Generation error: {0}")]
    Generation(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from shared types
    #[error(transparent)]
    Types(#[from] feedback_types::FeedbackError),
}
