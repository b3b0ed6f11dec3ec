use rubric_evals::metrics::{BleuOptions, ExactMatchOptions, RougeOptions};
use rubric_evals::{DEFAULT_CORRECT_THRESHOLD, EvaluatorConfig, MetricOptions};
use serde::{Deserialize, Serialize};

/// Metric used when neither the command line nor a config file names one
pub const DEFAULT_METRIC: &str = "exact_match";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRubricConfig {
    #[serde(default)]
    pub evaluation: RawEvaluationConfig,

    #[serde(default)]
    pub sampling: SamplingConfig,

    #[serde(default)]
    pub metrics: RawMetricsConfig,
}

/// Evaluation config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawEvaluationConfig {
    /// Metrics to compute, primary first
    pub metrics: Option<Vec<String>>,

    /// Minimum primary score for an item to count as correct
    pub correct_threshold: Option<f64>,

    /// Score items in parallel
    pub parallel: Option<bool>,

    /// Model name recorded on results
    pub model: Option<String>,
}

/// Metric option tables; a table set in a later layer replaces the earlier one
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawMetricsConfig {
    pub exact_match: Option<ExactMatchOptions>,
    pub bleu: Option<BleuOptions>,
    pub rouge: Option<RougeOptions>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RubricConfig {
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    #[serde(default)]
    pub sampling: SamplingConfig,

    #[serde(default)]
    pub metrics: MetricOptions,
}

impl RubricConfig {
    /// Library evaluator settings for this configuration.
    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            correct_threshold: self.evaluation.correct_threshold,
            parallel: self.evaluation.parallel,
            metrics: self.metrics.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Metrics to compute, primary first
    pub metrics: Vec<String>,

    /// Minimum primary score for an item to count as correct
    pub correct_threshold: f64,

    /// Score items in parallel
    pub parallel: bool,

    /// Model name recorded on results
    pub model: Option<String>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            metrics: vec![DEFAULT_METRIC.to_string()],
            correct_threshold: DEFAULT_CORRECT_THRESHOLD,
            parallel: false,
            model: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SamplingConfig {
    /// Seed used when a sampling command is run without --seed
    pub seed: Option<u64>,
}
