//! Evaluation orchestrator.
//!
//! A run moves through five stages:
//!
//! 1. **Validate** every prediction id against the dataset
//! 2. **Join** predictions to their items by id
//! 3. **Score** each pair with every requested metric
//! 4. **Aggregate** per-item values into means and accuracy
//! 5. **Emit** an immutable [`EvaluationResult`]
//!
//! Validation failures abort the run before anything is scored.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::EvaluatorConfig;
use crate::dataset::{Dataset, DatasetItem, Prediction};
use crate::error::{EvalError, EvalResult};
use crate::metrics::{Metric, MetricOptions, RougeVariant};
use crate::result::{EvalWarning, EvaluationResult, ItemResult, MetricScores, ResultParts};

/// Scores predictions against a dataset.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate `predictions` against `dataset`.
    ///
    /// The first metric is the primary one: its first value is each item's
    /// score and decides correctness. An empty metric list means exact match.
    /// Unknown metric names and unsupported ROUGE variants are scored as 0.0
    /// and reported once in [`EvaluationResult::warnings`]. A metric whose
    /// result keys are already written by an earlier one is skipped.
    pub fn evaluate(
        &self,
        predictions: &[Prediction],
        dataset: &Dataset,
        metrics: &[Metric],
        model_name: &str,
    ) -> EvalResult<EvaluationResult> {
        let started = Instant::now();
        let timestamp = Utc::now();

        let index = validate(predictions, dataset)?;
        let (metrics, mut warnings) = resolve_metrics(metrics, &self.config.metrics);
        let metric_names: Vec<&str> = metrics.iter().map(Metric::name).collect();
        debug!(
            dataset = dataset.name(),
            model = model_name,
            predictions = predictions.len(),
            metrics = ?metric_names,
            parallel = self.config.parallel,
            "starting evaluation"
        );

        warnings.extend(unknown_metric_warnings(&metrics));
        if metrics.iter().any(|metric| matches!(metric, Metric::Rouge)) {
            warnings.extend(unsupported_variant_warnings(&self.config.metrics));
        }

        let score_one = |prediction: &Prediction| {
            // validate() guarantees every id is indexed
            let item = &dataset.items()[index[prediction.id.as_str()]];
            self.score_item(prediction, item, &metrics)
        };
        let item_results: Vec<ItemResult> = if self.config.parallel {
            predictions.par_iter().map(score_one).collect()
        } else {
            predictions.iter().map(score_one).collect()
        };

        let result = EvaluationResult::from_parts(ResultParts {
            dataset_name: dataset.name().to_string(),
            dataset_version: dataset.version().to_string(),
            model: model_name.to_string(),
            metrics: mean_scores(&item_results),
            item_results,
            warnings,
            timestamp,
            duration: started.elapsed(),
        });

        info!(
            run_id = %result.run_id(),
            dataset = result.dataset_name(),
            model = result.model(),
            items = result.total_items(),
            correct = result.correct_items(),
            accuracy = result.accuracy(),
            duration_ms = result.duration().as_millis() as u64,
            "evaluation complete"
        );

        Ok(result)
    }

    fn score_item(
        &self,
        prediction: &Prediction,
        item: &DatasetItem,
        metrics: &[Metric],
    ) -> ItemResult {
        let mut scores = MetricScores::new();
        let mut primary = None;

        for metric in metrics {
            let values = metric.score(&prediction.predicted, item.expected(), &self.config.metrics);
            for (name, value) in values {
                primary.get_or_insert(value);
                scores.insert(name, value);
            }
        }

        let score = primary.unwrap_or(0.0);
        let mut metadata = item.metadata().clone();
        metadata.extend(prediction.metadata.clone());

        ItemResult::new(
            prediction.id.clone(),
            prediction.predicted.clone(),
            item.expected().clone(),
            score >= self.config.correct_threshold,
            score,
            scores,
            metadata,
        )
    }
}

/// Evaluate with a one-off [`Evaluator`].
pub fn evaluate(
    predictions: &[Prediction],
    dataset: &Dataset,
    metrics: &[Metric],
    model_name: &str,
    config: &EvaluatorConfig,
) -> EvalResult<EvaluationResult> {
    Evaluator::new(config.clone()).evaluate(predictions, dataset, metrics, model_name)
}

/// Check prediction ids and index the dataset by id.
fn validate<'a>(
    predictions: &[Prediction],
    dataset: &'a Dataset,
) -> EvalResult<HashMap<&'a str, usize>> {
    let index: HashMap<&str, usize> = dataset
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| (item.id(), i))
        .collect();

    let mut unknown: Vec<String> = Vec::new();
    for prediction in predictions {
        let id = prediction.id.as_str();
        if !index.contains_key(id) && !unknown.iter().any(|seen| seen == id) {
            unknown.push(id.to_string());
        }
    }
    if !unknown.is_empty() {
        return Err(EvalError::InvalidPredictionIds(unknown));
    }

    let mut seen = HashSet::with_capacity(predictions.len());
    let mut duplicates: Vec<String> = Vec::new();
    for prediction in predictions {
        let id = prediction.id.as_str();
        if !seen.insert(id) && !duplicates.iter().any(|dup| dup == id) {
            duplicates.push(id.to_string());
        }
    }
    if !duplicates.is_empty() {
        return Err(EvalError::DuplicatePredictionIds(duplicates));
    }

    Ok(index)
}

/// Apply the exact-match default and drop metrics whose result keys are taken.
///
/// Repeating a built-in metric is silent. Any other collision, such as a
/// custom metric named `rouge1` after `rouge`, keeps the first metric and
/// records [`EvalWarning::ShadowedMetric`].
fn resolve_metrics(
    metrics: &[Metric],
    options: &MetricOptions,
) -> (Vec<Metric>, Vec<EvalWarning>) {
    if metrics.is_empty() {
        return (vec![Metric::ExactMatch], Vec::new());
    }

    let mut resolved: Vec<Metric> = Vec::with_capacity(metrics.len());
    let mut warnings = Vec::new();
    for metric in metrics {
        let names = metric.value_names(options);
        let kept = resolved
            .iter()
            .find(|kept| {
                kept.name() == metric.name()
                    || kept
                        .value_names(options)
                        .iter()
                        .any(|name| names.contains(name))
            })
            .map(|kept| (kept.name().to_string(), kept.is_custom()));

        let Some((by, kept_custom)) = kept else {
            resolved.push(metric.clone());
            continue;
        };
        if by == metric.name() && !kept_custom && !metric.is_custom() {
            continue;
        }
        warn!(metric = metric.name(), by = %by, "metric scores collide, skipping");
        warnings.push(EvalWarning::ShadowedMetric {
            name: metric.name().to_string(),
            by,
        });
    }
    (resolved, warnings)
}

fn unknown_metric_warnings(metrics: &[Metric]) -> Vec<EvalWarning> {
    metrics
        .iter()
        .filter(|metric| metric.is_unknown())
        .map(|metric| {
            warn!(metric = metric.name(), "unknown metric, scoring as 0.0");
            EvalWarning::UnknownMetric {
                name: metric.name().to_string(),
            }
        })
        .collect()
}

fn unsupported_variant_warnings(options: &MetricOptions) -> Vec<EvalWarning> {
    let mut warnings: Vec<EvalWarning> = Vec::new();
    for variant in options.rouge.effective_variants() {
        let RougeVariant::Unsupported(name) = variant else {
            continue;
        };
        if warnings
            .iter()
            .any(|w| matches!(w, EvalWarning::UnsupportedRougeVariant { name: seen } if *seen == name))
        {
            continue;
        }
        warn!(variant = %name, "unsupported ROUGE variant, scoring as 0.0");
        warnings.push(EvalWarning::UnsupportedRougeVariant { name });
    }
    warnings
}

/// Arithmetic mean of each metric value across items.
fn mean_scores(items: &[ItemResult]) -> MetricScores {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for item in items {
        for (name, value) in item.metrics() {
            let entry = sums.entry(name.as_str()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(name, (sum, count))| (name.to_string(), sum / count as f64))
        .collect()
}
