//! Evaluation outputs.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Metadata, RunId};

/// Named metric values, keyed by metric or ROUGE variant name.
pub type MetricScores = BTreeMap<String, f64>;

/// A non-fatal outcome recorded on a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvalWarning {
    /// A requested metric name matched no known metric and scored 0.0.
    UnknownMetric { name: String },
    /// A configured ROUGE variant is not supported and scored 0.0.
    UnsupportedRougeVariant { name: String },
    /// A metric was dropped because `by`, listed earlier, already writes
    /// one of its result keys.
    ShadowedMetric { name: String, by: String },
}

impl fmt::Display for EvalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMetric { name } => write!(f, "unknown metric '{name}' scored as 0.0"),
            Self::UnsupportedRougeVariant { name } => {
                write!(f, "unsupported ROUGE variant '{name}' scored as 0.0")
            }
            Self::ShadowedMetric { name, by } => {
                write!(f, "metric '{name}' skipped; its scores collide with '{by}'")
            }
        }
    }
}

/// Score of a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    id: String,
    predicted: Value,
    expected: Value,
    correct: bool,
    score: f64,
    metrics: MetricScores,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    metadata: Metadata,
}

impl ItemResult {
    pub(crate) fn new(
        id: String,
        predicted: Value,
        expected: Value,
        correct: bool,
        score: f64,
        metrics: MetricScores,
        metadata: Metadata,
    ) -> Self {
        Self {
            id,
            predicted,
            expected,
            correct,
            score,
            metrics,
            metadata,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn predicted(&self) -> &Value {
        &self.predicted
    }

    pub fn expected(&self) -> &Value {
        &self.expected
    }

    /// Whether the primary score reached the correctness threshold.
    pub fn correct(&self) -> bool {
        self.correct
    }

    /// The primary metric's score for this item.
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn metrics(&self) -> &MetricScores {
        &self.metrics
    }

    /// Item metadata overlaid with prediction metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Summary of one evaluation run.
///
/// Built once by the [`Evaluator`](crate::Evaluator) and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    run_id: RunId,
    dataset_name: String,
    dataset_version: String,
    model: String,
    total_items: usize,
    correct_items: usize,
    accuracy: f64,
    metrics: MetricScores,
    item_results: Vec<ItemResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<EvalWarning>,
    timestamp: DateTime<Utc>,
    duration: Duration,
}

/// Fields the evaluator fills in; aggregate counts are derived from them.
pub(crate) struct ResultParts {
    pub dataset_name: String,
    pub dataset_version: String,
    pub model: String,
    pub metrics: MetricScores,
    pub item_results: Vec<ItemResult>,
    pub warnings: Vec<EvalWarning>,
    pub timestamp: DateTime<Utc>,
    pub duration: Duration,
}

impl EvaluationResult {
    pub(crate) fn from_parts(parts: ResultParts) -> Self {
        let total_items = parts.item_results.len();
        let correct_items = parts.item_results.iter().filter(|r| r.correct).count();
        let accuracy = if total_items == 0 {
            0.0
        } else {
            correct_items as f64 / total_items as f64
        };

        Self {
            run_id: RunId::new(),
            dataset_name: parts.dataset_name,
            dataset_version: parts.dataset_version,
            model: parts.model,
            total_items,
            correct_items,
            accuracy,
            metrics: parts.metrics,
            item_results: parts.item_results,
            warnings: parts.warnings,
            timestamp: parts.timestamp,
            duration: parts.duration,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn dataset_version(&self) -> &str {
        &self.dataset_version
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn correct_items(&self) -> usize {
        self.correct_items
    }

    /// Fraction of items marked correct; 0.0 for an empty run.
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Mean of every metric value across items.
    pub fn metrics(&self) -> &MetricScores {
        &self.metrics
    }

    /// Mean value of one metric, if it was computed.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// Per-item results in prediction order.
    pub fn item_results(&self) -> &[ItemResult] {
        &self.item_results
    }

    /// Items that did not reach the correctness threshold.
    pub fn incorrect_items(&self) -> impl Iterator<Item = &ItemResult> {
        self.item_results.iter().filter(|r| !r.correct)
    }

    pub fn warnings(&self) -> &[EvalWarning] {
        &self.warnings
    }

    /// When the run started.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.model, self.dataset_name)?;
        if !self.dataset_version.is_empty() {
            write!(f, "@{}", self.dataset_version)?;
        }
        write!(
            f,
            ": {}/{} correct ({:.1}%)",
            self.correct_items,
            self.total_items,
            self.accuracy * 100.0
        )?;
        for (name, value) in &self.metrics {
            write!(f, ", {name}={value:.4}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str, correct: bool) -> ItemResult {
        let score = if correct { 1.0 } else { 0.0 };
        ItemResult::new(
            id.to_string(),
            json!("p"),
            json!("e"),
            correct,
            score,
            MetricScores::from([("exact_match".to_string(), score)]),
            Metadata::new(),
        )
    }

    fn result(items: Vec<ItemResult>) -> EvaluationResult {
        EvaluationResult::from_parts(ResultParts {
            dataset_name: "qa".to_string(),
            dataset_version: "1.0".to_string(),
            model: "gpt-test".to_string(),
            metrics: MetricScores::from([("exact_match".to_string(), 0.5)]),
            item_results: items,
            warnings: Vec::new(),
            timestamp: Utc::now(),
            duration: Duration::from_millis(12),
        })
    }

    #[test]
    fn from_parts_derives_counts_and_accuracy() {
        let result = result(vec![item("a", true), item("b", false)]);

        assert_eq!(result.total_items(), 2);
        assert_eq!(result.correct_items(), 1);
        assert_eq!(result.accuracy(), 0.5);
    }

    #[test]
    fn from_parts_reports_zero_accuracy_for_empty_runs() {
        let result = result(Vec::new());
        assert_eq!(result.total_items(), 0);
        assert_eq!(result.accuracy(), 0.0);
    }

    #[test]
    fn incorrect_items_filters_correct_results() {
        let result = result(vec![item("a", true), item("b", false), item("c", false)]);
        let ids: Vec<&str> = result.incorrect_items().map(ItemResult::id).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn metric_looks_up_aggregate_by_name() {
        let result = result(vec![item("a", true)]);
        assert_eq!(result.metric("exact_match"), Some(0.5));
        assert_eq!(result.metric("bleu"), None);
    }

    #[test]
    fn display_summarizes_run() {
        let result = result(vec![item("a", true), item("b", false)]);
        assert_eq!(
            result.to_string(),
            "gpt-test on qa@1.0: 1/2 correct (50.0%), exact_match=0.5000"
        );
    }

    #[test]
    fn result_round_trips_through_json() {
        let result = result(vec![item("a", true)]);
        let json = serde_json::to_string(&result).unwrap();
        let parsed: EvaluationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn warning_serializes_with_kind_tag() {
        let warning = EvalWarning::UnknownMetric {
            name: "meteor".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&warning).unwrap(),
            json!({"kind": "unknown_metric", "name": "meteor"})
        );
    }

    #[test]
    fn warning_display_names_the_offender() {
        let unsupported = EvalWarning::UnsupportedRougeVariant {
            name: "rougeW".to_string(),
        };
        let shadowed = EvalWarning::ShadowedMetric {
            name: "rouge1".to_string(),
            by: "rouge".to_string(),
        };

        assert_eq!(
            unsupported.to_string(),
            "unsupported ROUGE variant 'rougeW' scored as 0.0"
        );
        assert_eq!(
            shadowed.to_string(),
            "metric 'rouge1' skipped; its scores collide with 'rouge'"
        );
        assert_eq!(
            serde_json::to_value(&shadowed).unwrap(),
            json!({"kind": "shadowed_metric", "name": "rouge1", "by": "rouge"})
        );
    }
}
