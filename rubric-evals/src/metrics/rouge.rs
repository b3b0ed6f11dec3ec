//! ROUGE-1, ROUGE-2 and ROUGE-L.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ngram::{clipped_overlap, ngram_counts, ngram_total};
use super::text::{extract_text, references, tokenize};

/// A ROUGE variant.
///
/// Names that are not recognised are kept as [`RougeVariant::Unsupported`]
/// and always score zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RougeVariant {
    Rouge1,
    Rouge2,
    RougeL,
    Unsupported(String),
}

impl RougeVariant {
    /// The canonical variant name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rouge1 => "rouge1",
            Self::Rouge2 => "rouge2",
            Self::RougeL => "rougeL",
            Self::Unsupported(name) => name,
        }
    }

    /// Parse a variant name. Never fails; unknown names become `Unsupported`.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "rouge1" | "rouge-1" | "ROUGE-1" => Self::Rouge1,
            "rouge2" | "rouge-2" | "ROUGE-2" => Self::Rouge2,
            "rougeL" | "rougel" | "rouge-l" | "ROUGE-L" => Self::RougeL,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// The three supported variants.
    #[must_use]
    pub fn all() -> Vec<Self> {
        vec![Self::Rouge1, Self::Rouge2, Self::RougeL]
    }
}

impl From<String> for RougeVariant {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<RougeVariant> for String {
    fn from(variant: RougeVariant) -> Self {
        variant.as_str().to_string()
    }
}

impl fmt::Display for RougeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for [`rouge`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RougeOptions {
    /// Variants to compute. An empty list means all supported variants.
    pub variants: Vec<RougeVariant>,
}

impl Default for RougeOptions {
    fn default() -> Self {
        Self {
            variants: RougeVariant::all(),
        }
    }
}

impl RougeOptions {
    /// The variants to compute, with an empty list expanded to all of them.
    pub fn effective_variants(&self) -> Vec<RougeVariant> {
        if self.variants.is_empty() {
            RougeVariant::all()
        } else {
            self.variants.clone()
        }
    }
}

/// Precision, recall and F1 for one variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RougeScore {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl RougeScore {
    /// Build a score from an overlap count and the two sequence sizes.
    fn from_overlap(overlap: usize, candidate_total: usize, reference_total: usize) -> Self {
        if overlap == 0 || candidate_total == 0 || reference_total == 0 {
            return Self::default();
        }
        let precision = overlap as f64 / candidate_total as f64;
        let recall = overlap as f64 / reference_total as f64;
        let f1 = 2.0 * precision * recall / (precision + recall);
        Self {
            precision,
            recall,
            f1,
        }
    }
}

/// Scores per requested variant.
pub type RougeScores = BTreeMap<RougeVariant, RougeScore>;

/// ROUGE of a prediction against the references in `expected`.
pub fn rouge(predicted: &Value, expected: &Value, options: &RougeOptions) -> RougeScores {
    let candidate = extract_text(predicted);
    let refs = references(expected);
    let refs: Vec<&str> = refs.iter().map(String::as_str).collect();
    rouge_text(&candidate, &refs, &options.effective_variants())
}

/// ROUGE of `candidate` against `references`.
///
/// For each variant the reference giving the highest F1 is reported.
pub fn rouge_text(candidate: &str, references: &[&str], variants: &[RougeVariant]) -> RougeScores {
    let candidate = tokenize(candidate);
    let references: Vec<Vec<String>> = references.iter().map(|r| tokenize(r)).collect();

    variants
        .iter()
        .map(|variant| {
            let best = references
                .iter()
                .map(|reference| score_variant(variant, &candidate, reference))
                .fold(RougeScore::default(), |best, score| {
                    if score.f1 > best.f1 { score } else { best }
                });
            (variant.clone(), best)
        })
        .collect()
}

fn score_variant(variant: &RougeVariant, candidate: &[String], reference: &[String]) -> RougeScore {
    match variant {
        RougeVariant::Rouge1 => rouge_n(candidate, reference, 1),
        RougeVariant::Rouge2 => rouge_n(candidate, reference, 2),
        RougeVariant::RougeL => rouge_l(candidate, reference),
        RougeVariant::Unsupported(_) => RougeScore::default(),
    }
}

fn rouge_n(candidate: &[String], reference: &[String], n: usize) -> RougeScore {
    let overlap = clipped_overlap(&ngram_counts(candidate, n), &ngram_counts(reference, n));
    RougeScore::from_overlap(
        overlap,
        ngram_total(candidate.len(), n),
        ngram_total(reference.len(), n),
    )
}

fn rouge_l(candidate: &[String], reference: &[String]) -> RougeScore {
    RougeScore::from_overlap(
        lcs_len(candidate, reference),
        candidate.len(),
        reference.len(),
    )
}

/// Length of the longest common subsequence of two token sequences.
///
/// Fills the `(m+1) × (n+1)` dynamic-programming table row by row, keeping
/// only the previous row.
pub fn lcs_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Average precision, recall and F1 per variant across a batch of
/// `(candidate, references)` pairs.
pub fn aggregate_rouge<'a, I>(pairs: I, variants: &[RougeVariant]) -> RougeScores
where
    I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
{
    let mut sums: RougeScores = variants
        .iter()
        .map(|variant| (variant.clone(), RougeScore::default()))
        .collect();
    let mut count = 0usize;

    for (candidate, references) in pairs {
        count += 1;
        for (variant, score) in rouge_text(candidate, references, variants) {
            let sum = sums.entry(variant).or_default();
            sum.precision += score.precision;
            sum.recall += score.recall;
            sum.f1 += score.f1;
        }
    }

    if count > 0 {
        let n = count as f64;
        for sum in sums.values_mut() {
            sum.precision /= n;
            sum.recall /= n;
            sum.f1 /= n;
        }
    }
    sums
}
