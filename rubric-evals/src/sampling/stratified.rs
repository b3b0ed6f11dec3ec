//! Proportional sampling across the values of one item field.
//!
//! Strata are grouped by JSON value, so the number `1` and the string `"1"`
//! are different strata.

use std::collections::HashMap;

use serde_json::{Value, json};
use tracing::debug;

use super::keys;
use super::rng::SampleRng;
use super::{SampleMethod, StratifyOptions};
use crate::dataset::Dataset;
use crate::error::{SampleError, SampleResult};
use crate::types::Metadata;

/// A group of items sharing one strata field value.
struct Stratum {
    /// JSON text of the value; distinct for distinct values.
    key: String,
    /// Name under the `strata` metadata entry.
    label: String,
    indices: Vec<usize>,
}

/// Draw a sample that preserves each stratum's share of the dataset.
///
/// Strata are ordered by first appearance. Each stratum's quota is its
/// proportional share of `size`, rounded half up; any remainder is
/// distributed one item at a time to the largest strata until the quotas sum
/// to exactly `size`. Within a stratum, items are drawn without replacement
/// from a single seeded generator, strata in order.
pub fn stratified_sample(dataset: &Dataset, options: &StratifyOptions) -> SampleResult<Dataset> {
    let size = options
        .size
        .ok_or(SampleError::MissingRequiredOption("size"))?;
    let field = options
        .strata_field
        .as_deref()
        .ok_or(SampleError::MissingRequiredOption("strata_field"))?;

    if size > dataset.len() {
        return Err(SampleError::SampleSizeExceeded {
            requested: size,
            available: dataset.len(),
        });
    }

    let strata = group_by_stratum(dataset, field)?;
    let counts: Vec<usize> = strata.iter().map(|s| s.indices.len()).collect();
    let quotas = allocate(size, &counts);
    debug!(
        dataset = dataset.name(),
        size,
        field,
        strata = strata.len(),
        seed = ?options.seed,
        "drawing stratified sample"
    );

    let mut rng = SampleRng::new(options.seed);
    let mut items = Vec::with_capacity(size);
    let mut drawn = serde_json::Map::new();
    for (stratum, quota) in strata.iter().zip(&quotas) {
        let mut indices = stratum.indices.clone();
        rng.shuffle(&mut indices);
        items.extend(
            indices
                .into_iter()
                .take(*quota)
                .map(|i| dataset.items()[i].clone()),
        );
        drawn.insert(stratum.label.clone(), json!(quota));
    }

    let mut metadata = Metadata::new();
    metadata.insert(keys::SAMPLE_METHOD.to_string(), json!(SampleMethod::Stratified.as_str()));
    metadata.insert(keys::SAMPLE_SIZE.to_string(), json!(size));
    metadata.insert(keys::ORIGINAL_SIZE.to_string(), json!(dataset.len()));
    metadata.insert(keys::STRATA_FIELD.to_string(), json!(field));
    metadata.insert(keys::STRATA.to_string(), Value::Object(drawn));
    if let Some(seed) = options.seed {
        metadata.insert(keys::SEED.to_string(), json!(seed));
    }

    Ok(dataset.derive(items, metadata))
}

fn group_by_stratum(dataset: &Dataset, field: &str) -> SampleResult<Vec<Stratum>> {
    let mut strata: Vec<Stratum> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, item) in dataset.items().iter().enumerate() {
        let value = item
            .field(field)
            .ok_or_else(|| SampleError::MissingStrataField {
                field: field.to_string(),
                item_id: item.id().to_string(),
            })?;
        let key = value.to_string();

        match positions.get(&key) {
            Some(&position) => strata[position].indices.push(index),
            None => {
                positions.insert(key.clone(), strata.len());
                strata.push(Stratum {
                    key,
                    label: plain_label(&value),
                    indices: vec![index],
                });
            }
        }
    }

    // "1" and 1 would share the label "1"; such strata keep their JSON text
    let labels: Vec<String> = strata.iter().map(|s| s.label.clone()).collect();
    for stratum in &mut strata {
        if labels.iter().filter(|label| **label == stratum.label).count() > 1 {
            stratum.label = stratum.key.clone();
        }
    }

    Ok(strata)
}

/// Strings as-is, anything else as its JSON text.
fn plain_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Split `size` across strata of the given sizes.
///
/// Requires `size <= counts.iter().sum()`.
fn allocate(size: usize, counts: &[usize]) -> Vec<usize> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    // round(size * count / total), half up, in integer arithmetic
    let mut quotas: Vec<usize> = counts
        .iter()
        .map(|&count| ((2 * size * count + total) / (2 * total)).min(count))
        .collect();

    let mut by_size: Vec<usize> = (0..counts.len()).collect();
    by_size.sort_by(|&a, &b| counts[b].cmp(&counts[a]));

    let mut assigned: usize = quotas.iter().sum();
    while assigned < size {
        for &i in &by_size {
            if assigned == size {
                break;
            }
            if quotas[i] < counts[i] {
                quotas[i] += 1;
                assigned += 1;
            }
        }
    }
    while assigned > size {
        for &i in &by_size {
            if assigned == size {
                break;
            }
            if quotas[i] > 0 {
                quotas[i] -= 1;
                assigned -= 1;
            }
        }
    }

    quotas
}
