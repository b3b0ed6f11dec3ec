//! Evaluator configuration.

use serde::{Deserialize, Serialize};

use crate::metrics::MetricOptions;

/// Default minimum primary score for an item to count as correct.
pub const DEFAULT_CORRECT_THRESHOLD: f64 = 1.0;

/// Settings for an evaluation run.
///
/// Deserializes from a partial TOML or JSON table; every missing field takes
/// its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// An item is correct when its primary score is at least this value
    pub correct_threshold: f64,
    /// Score items on the rayon thread pool
    pub parallel: bool,
    /// Options forwarded to the built-in metrics
    pub metrics: MetricOptions,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            correct_threshold: DEFAULT_CORRECT_THRESHOLD,
            parallel: false,
            metrics: MetricOptions::default(),
        }
    }
}
