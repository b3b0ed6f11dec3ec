//! Sentence-level BLEU.
//!
//! Each reference is scored independently and the best score is reported,
//! rather than pooling n-gram counts across references as corpus BLEU does.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::ngram::{clipped_overlap, ngram_counts, ngram_total};
use super::text::{extract_text, references, tokenize};

/// How zero n-gram precisions are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Smoothing {
    /// A zero precision at any order zeroes the score
    #[default]
    None,
    /// Zero clipped counts are replaced by `epsilon`
    AddEpsilon,
    /// `k` is added to every clipped count and its total
    AddK,
}

/// Options for [`bleu`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BleuOptions {
    /// Highest n-gram order used in the geometric mean.
    pub max_n: usize,
    /// Zero-precision handling.
    pub smoothing: Smoothing,
    /// Replacement count for [`Smoothing::AddEpsilon`].
    pub epsilon: f64,
    /// Additive constant for [`Smoothing::AddK`].
    pub k: f64,
}

impl Default for BleuOptions {
    fn default() -> Self {
        Self {
            max_n: 4,
            smoothing: Smoothing::None,
            epsilon: 0.1,
            k: 1.0,
        }
    }
}

/// BLEU of a prediction against the best-matching reference in `expected`.
pub fn bleu(predicted: &Value, expected: &Value, options: &BleuOptions) -> f64 {
    let candidate = extract_text(predicted);
    let refs = references(expected);
    let refs: Vec<&str> = refs.iter().map(String::as_str).collect();
    bleu_text(&candidate, &refs, options)
}

/// BLEU of `candidate` against each of `references`, keeping the maximum.
pub fn bleu_text(candidate: &str, references: &[&str], options: &BleuOptions) -> f64 {
    if options.max_n == 0 {
        warn!("BLEU requested with max_n = 0, scoring as zero");
        return 0.0;
    }

    let candidate = tokenize(candidate);
    if candidate.is_empty() {
        return 0.0;
    }

    references
        .iter()
        .map(|reference| sentence_bleu(&candidate, &tokenize(reference), options))
        .fold(0.0, f64::max)
}

fn sentence_bleu(candidate: &[String], reference: &[String], options: &BleuOptions) -> f64 {
    let max_n = options.max_n;
    let weight = 1.0 / max_n as f64;
    let mut log_sum = 0.0;

    for n in 1..=max_n {
        let candidate_counts = ngram_counts(candidate, n);
        let reference_counts = ngram_counts(reference, n);
        let clipped = clipped_overlap(&candidate_counts, &reference_counts) as f64;
        let total = ngram_total(candidate.len(), n) as f64;

        let precision = match options.smoothing {
            Smoothing::None => {
                if total == 0.0 {
                    0.0
                } else {
                    clipped / total
                }
            }
            Smoothing::AddEpsilon => {
                let numerator = if clipped == 0.0 { options.epsilon } else { clipped };
                numerator / total.max(1.0)
            }
            Smoothing::AddK => (clipped + options.k) / (total + options.k),
        };

        if precision <= 0.0 || !precision.is_finite() {
            return 0.0;
        }
        log_sum += weight * precision.ln();
    }

    let geometric_mean = log_sum.exp();
    let penalty = brevity_penalty(candidate.len(), reference.len());
    (geometric_mean * penalty).clamp(0.0, 1.0)
}

/// `min(1, exp(1 - r/c))` for reference length `r` and candidate length `c`.
pub fn brevity_penalty(candidate_len: usize, reference_len: usize) -> f64 {
    if candidate_len == 0 {
        return 0.0;
    }
    if candidate_len >= reference_len {
        return 1.0;
    }
    (1.0 - reference_len as f64 / candidate_len as f64).exp()
}
