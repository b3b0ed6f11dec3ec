//! Evaluation and sampling engine for rubric.
//!
//! This crate scores model predictions against labeled datasets and
//! partitions datasets for experimentation.
//!
//! # Architecture
//!
//! - **Metrics** ([`metrics`]) are pure functions scoring one prediction
//!   against one or more references
//! - **Sampling** ([`sampling`]) derives new datasets from an immutable one,
//!   reproducibly when seeded
//! - **Evaluator** ([`Evaluator`]) joins predictions to dataset items, runs the
//!   requested [`Metric`]s and aggregates them into an [`EvaluationResult`]
//!
//! The sampler and the evaluator are independent; a sampled [`Dataset`] can be
//! fed straight back into an evaluation.
//!
//! ```
//! use rubric_evals::{Dataset, DatasetItem, Evaluator, Metric, Metadata, Prediction};
//! use serde_json::json;
//!
//! let dataset = Dataset::new(
//!     "arith",
//!     "1.0",
//!     vec![DatasetItem::new("1", json!("2+2"), json!("4"))],
//!     Metadata::new(),
//! )?;
//! let predictions = vec![Prediction::new("1", json!("4"))];
//!
//! let result = Evaluator::default().evaluate(&predictions, &dataset, &[Metric::ExactMatch], "m")?;
//! assert_eq!(result.accuracy(), 1.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod dataset;
mod error;
mod evaluator;
pub mod metrics;
mod result;
pub mod sampling;
mod types;

// Configuration
pub use config::{DEFAULT_CORRECT_THRESHOLD, EvaluatorConfig};

// Data model
pub use dataset::{Dataset, DatasetItem, Prediction};

// Errors
pub use error::{DatasetError, DatasetResult, EvalError, EvalResult, SampleError, SampleResult};

// Evaluator
pub use evaluator::{Evaluator, evaluate};

// Metric selection
pub use metrics::{Metric, MetricFn, MetricOptions};

// Results
pub use result::{EvalWarning, EvaluationResult, ItemResult, MetricScores};

// Sampling
pub use sampling::{
    Fold, SampleMethod, Split, StratifyOptions, TestSize, k_fold, random_sample,
    stratified_sample, train_test_split,
};

// ID and metadata types
pub use types::{Metadata, RunId};
