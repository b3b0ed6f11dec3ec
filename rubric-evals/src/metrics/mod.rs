//! Metric library.
//!
//! Every metric is a pure function of a prediction and its reference(s)
//! returning a score in `[0, 1]`. Metrics never fail: malformed input is
//! coerced or scored as zero so one bad item cannot abort a run.
//!
//! ## Available Metrics
//!
//! | Metric | Name | Values |
//! |--------|------|--------|
//! | [`exact_match`] | `exact_match` | `exact_match` |
//! | [`token_f1`] | `token_f1` | `token_f1` |
//! | [`bleu`] | `bleu` | `bleu` |
//! | [`rouge`] | `rouge` | one per variant (`rouge1`, `rouge2`, `rougeL`) |
//!
//! Callers can plug in their own scoring function with [`Metric::custom`].

mod bleu;
mod exact_match;
mod ngram;
mod rouge;
pub mod text;
mod token_f1;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use bleu::{BleuOptions, Smoothing, bleu, bleu_text, brevity_penalty};
pub use exact_match::{DEFAULT_TOLERANCE, ExactMatchOptions, exact_match};
pub use rouge::{
    RougeOptions, RougeScore, RougeScores, RougeVariant, aggregate_rouge, lcs_len, rouge,
    rouge_text,
};
pub use token_f1::{token_f1, token_f1_text};

/// Caller-supplied scoring function: `(predicted, expected) -> score`.
pub type MetricFn = Arc<dyn Fn(&Value, &Value) -> f64 + Send + Sync>;

/// Options forwarded to the built-in metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricOptions {
    pub exact_match: ExactMatchOptions,
    pub bleu: BleuOptions,
    pub rouge: RougeOptions,
}

/// A metric selected for an evaluation run.
#[derive(Clone)]
pub enum Metric {
    ExactMatch,
    TokenF1,
    Bleu,
    Rouge,
    /// A caller-supplied scoring function
    Custom { name: String, func: MetricFn },
    /// A name that matched no built-in metric; always scores 0.0
    Unknown(String),
}

impl Metric {
    /// Resolve a metric by name. Unrecognised names become [`Metric::Unknown`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "exact_match" | "em" | "exact" => Self::ExactMatch,
            "token_f1" | "f1" => Self::TokenF1,
            "bleu" => Self::Bleu,
            "rouge" => Self::Rouge,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Wrap a scoring function as a metric.
    pub fn custom<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &Value) -> f64 + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// The metric's name, used as its key in result maps.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ExactMatch => "exact_match",
            Self::TokenF1 => "token_f1",
            Self::Bleu => "bleu",
            Self::Rouge => "rouge",
            Self::Custom { name, .. } => name,
            Self::Unknown(name) => name,
        }
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }

    /// The keys [`Metric::score`] writes, in order.
    pub fn value_names(&self, options: &MetricOptions) -> Vec<String> {
        match self {
            Self::Rouge => {
                let mut names: Vec<String> = Vec::new();
                for variant in options.rouge.effective_variants() {
                    if !names.iter().any(|seen| seen == variant.as_str()) {
                        names.push(variant.as_str().to_string());
                    }
                }
                names
            }
            other => vec![other.name().to_string()],
        }
    }

    /// Score one prediction.
    ///
    /// Returns the named values this metric produces; the first one is the
    /// metric's score for the item. ROUGE reports its variants in the order
    /// they were requested.
    pub fn score(
        &self,
        predicted: &Value,
        expected: &Value,
        options: &MetricOptions,
    ) -> Vec<(String, f64)> {
        match self {
            Self::ExactMatch => vec![(
                self.name().to_string(),
                exact_match(predicted, expected, &options.exact_match),
            )],
            Self::TokenF1 => vec![(self.name().to_string(), token_f1(predicted, expected))],
            Self::Bleu => vec![(
                self.name().to_string(),
                bleu(predicted, expected, &options.bleu),
            )],
            Self::Rouge => {
                let scores = rouge(predicted, expected, &options.rouge);
                let mut values: Vec<(String, f64)> = Vec::with_capacity(scores.len());
                for variant in options.rouge.effective_variants() {
                    let name = variant.as_str();
                    if values.iter().any(|(seen, _)| seen == name) {
                        continue;
                    }
                    let f1 = scores.get(&variant).map_or(0.0, |score| score.f1);
                    values.push((name.to_string(), f1));
                }
                values
            }
            Self::Custom { name, func } => vec![(name.clone(), clamp_score(func(predicted, expected)))],
            Self::Unknown(name) => vec![(name.clone(), 0.0)],
        }
    }
}

impl From<&str> for Metric {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
            Self::Unknown(name) => f.debug_tuple("Unknown").field(name).finish(),
            Self::ExactMatch => f.write_str("ExactMatch"),
            Self::TokenF1 => f.write_str("TokenF1"),
            Self::Bleu => f.write_str("Bleu"),
            Self::Rouge => f.write_str("Rouge"),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Clamp a score into `[0, 1]`, mapping NaN to zero.
fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
