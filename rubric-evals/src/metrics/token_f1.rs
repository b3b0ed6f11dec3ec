//! Set-based token F1.

use std::collections::HashSet;

use serde_json::Value;

use super::text::{extract_text, references, tokenize};

/// Token-level F1 between a prediction and the best-matching reference.
///
/// Tokens are deduplicated, so a repeated word counts once.
pub fn token_f1(predicted: &Value, expected: &Value) -> f64 {
    let candidate = extract_text(predicted);
    references(expected)
        .iter()
        .map(|reference| token_f1_text(&candidate, reference))
        .fold(0.0, f64::max)
}

/// Token F1 between two strings.
pub fn token_f1_text(predicted: &str, expected: &str) -> f64 {
    let predicted: HashSet<String> = tokenize(predicted).into_iter().collect();
    let expected: HashSet<String> = tokenize(expected).into_iter().collect();

    if predicted.is_empty() || expected.is_empty() {
        return 0.0;
    }

    let common = predicted.intersection(&expected).count() as f64;
    let precision = common / predicted.len() as f64;
    let recall = common / expected.len() as f64;

    if precision + recall == 0.0 {
        return 0.0;
    }
    2.0 * precision * recall / (precision + recall)
}
