//! Exact match with answer normalization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::text::{choice_index, extract_text, normalize, parse_number, unwrap_text_field};

/// Default absolute tolerance for numeric answers.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Options for [`exact_match`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExactMatchOptions {
    /// Absolute tolerance used when both sides are numeric.
    pub tolerance: f64,
}

impl Default for ExactMatchOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Score `predicted` against `expected`: 1.0 on a match, 0.0 otherwise.
///
/// When `expected` is an array, each element is an acceptable answer.
pub fn exact_match(predicted: &Value, expected: &Value, options: &ExactMatchOptions) -> f64 {
    match expected {
        Value::Array(answers) if !answers.is_empty() => answers
            .iter()
            .map(|answer| match_single(predicted, answer, options.tolerance))
            .fold(0.0, f64::max),
        _ => match_single(predicted, expected, options.tolerance),
    }
}

fn match_single(predicted: &Value, expected: &Value, tolerance: f64) -> f64 {
    if predicted == expected {
        return 1.0;
    }

    let predicted = unwrap_text_field(predicted);
    let expected = unwrap_text_field(expected);

    let matched = if let (Some(p), Some(e)) = (parse_number(predicted), parse_number(expected)) {
        (p - e).abs() <= tolerance
    } else if let (Some(p), Some(e)) = (choice_index(predicted), choice_index(expected)) {
        p == e
    } else {
        normalize(&extract_text(predicted)) == normalize(&extract_text(expected))
    };

    if matched { 1.0 } else { 0.0 }
}
