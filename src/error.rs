//! Error types for the assessment engine

use thiserror::Error;

/// Errors that can occur during metric synthesis, scoring, or aggregation.
///
/// Every failure here is deterministic given the same input; none is
/// transient or retryable.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Input size disagrees with session configuration: {0}")]
    ConfigurationMismatch(String),

    #[error("Too few samples to compute metrics: {0}")]
    InsufficientData(String),

    #[error("Metric referenced by configuration is not present: {0}")]
    UnknownMetric(String),

    #[error("Weight outside [0, 1]: {0}")]
    WeightOutOfRange(String),

    #[error("Assessment is completed and no longer accepts writes: {0}")]
    AssessmentClosed(String),

    #[error("No assessment with id: {0}")]
    UnknownAssessment(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
