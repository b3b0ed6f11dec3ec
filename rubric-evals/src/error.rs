//! Error types for rubric-evals.

use thiserror::Error;

/// Result type for dataset construction.
pub type DatasetResult<T> = std::result::Result<T, DatasetError>;

/// Result type for sampling operations.
pub type SampleResult<T> = std::result::Result<T, SampleError>;

/// Result type for evaluation runs.
pub type EvalResult<T> = std::result::Result<T, EvalError>;

/// Errors raised while building a dataset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    /// Two items share the same id.
    #[error("duplicate item id in dataset: {0}")]
    DuplicateItemId(String),
}

/// Errors raised by the sampler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    /// A required option was not supplied.
    #[error("missing required option: {0}")]
    MissingRequiredOption(&'static str),

    /// Requested more items than the dataset holds.
    #[error("sample size {requested} exceeds dataset size {available}")]
    SampleSizeExceeded { requested: usize, available: usize },

    /// An item does not carry the strata field.
    #[error("strata field '{field}' is missing on item {item_id}")]
    MissingStrataField { field: String, item_id: String },

    /// Fold count outside `2..=len`.
    #[error("invalid fold count {k} for dataset of {len} items")]
    InvalidFoldCount { k: usize, len: usize },

    /// Test size that cannot produce two non-empty partitions.
    #[error("invalid test size: {0}")]
    InvalidTestSize(String),
}

/// Errors raised by the evaluator.
///
/// Both variants abort the run before any item is scored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Predictions reference ids that are not in the dataset.
    #[error("predictions reference unknown item ids: {}", .0.join(", "))]
    InvalidPredictionIds(Vec<String>),

    /// More than one prediction targets the same item.
    #[error("multiple predictions for item ids: {}", .0.join(", "))]
    DuplicatePredictionIds(Vec<String>),
}
