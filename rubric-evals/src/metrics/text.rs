//! Text reduction shared by all metrics.
//!
//! Metrics accept arbitrary JSON values. These helpers reduce them to text,
//! tokens, numbers or multiple-choice indices so every metric applies the
//! same coercions.

use serde_json::Value;

/// Keys checked, in order, when a structured value must be reduced to text.
pub const TEXT_FIELDS: [&str; 3] = ["answer", "text", "response"];

/// Currency symbols ignored when parsing numeric answers.
const CURRENCY_SYMBOLS: [char; 5] = ['$', '€', '£', '¥', '₹'];

/// Reduce a value to its canonical text.
pub fn extract_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(extract_text)
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(_) => match text_field(value) {
            Some(inner) => extract_text(inner),
            None => value.to_string(),
        },
    }
}

/// The first of [`TEXT_FIELDS`] present on an object.
pub fn text_field(value: &Value) -> Option<&Value> {
    let map = value.as_object()?;
    TEXT_FIELDS.iter().find_map(|key| map.get(*key))
}

/// Replace an object by its text field, if it has one.
pub fn unwrap_text_field(value: &Value) -> &Value {
    match text_field(value) {
        Some(inner) => unwrap_text_field(inner),
        None => value,
    }
}

/// The reference texts carried by an `expected` value.
///
/// An array holds one reference per element; anything else is a single
/// reference.
pub fn references(expected: &Value) -> Vec<String> {
    match expected {
        Value::Array(items) if !items.is_empty() => items.iter().map(extract_text).collect(),
        other => vec![extract_text(other)],
    }
}

/// Case-fold, trim and collapse internal whitespace.
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-cased, punctuation-stripped whitespace tokens in order.
pub fn tokenize(s: &str) -> Vec<String> {
    s.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| !is_punctuation(*c))
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '‘' | '’' | '“' | '”' | '…' | '–' | '—' | '«' | '»' | '¿' | '¡' | '·'
        )
}

/// Parse a numeric answer.
///
/// Accepts JSON numbers and strings such as `"1,250"`, `"$3.50"` or
/// `" -2 "`. The text must contain a digit and the value must be finite.
/// Only surrounding whitespace is ignored, so `"1 2"` is not a number.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| *c != ',' && !CURRENCY_SYMBOLS.contains(c))
                .collect();
            let cleaned = cleaned.trim();
            if !cleaned.chars().any(|c| c.is_ascii_digit()) {
                return None;
            }
            cleaned.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Interpret a value as a zero-based multiple-choice index.
///
/// Non-negative integers are taken as-is; a single ASCII letter (optionally
/// written `(B)`, `B.` or `B)`) maps `A→0`, `B→1`, and so on.
pub fn choice_index(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let trimmed = s
                .trim()
                .trim_start_matches('(')
                .trim_end_matches(['.', ')']);
            let mut chars = trimmed.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => {
                    Some(u64::from(c.to_ascii_uppercase() as u8 - b'A'))
                }
                _ => None,
            }
        }
        _ => None,
    }
}
