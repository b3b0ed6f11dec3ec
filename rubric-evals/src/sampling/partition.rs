//! Cross-validation folds and train/test splits.
//!
//! Both operations take an optional seeded shuffle; without it, partitions
//! follow dataset order.

use serde_json::json;
use tracing::debug;

use super::keys;
use super::rng::SampleRng;
use super::{Fold, Split, TestSize};
use crate::dataset::{Dataset, DatasetItem};
use crate::error::{SampleError, SampleResult};
use crate::types::Metadata;

/// Partition a dataset into `k` train/test folds.
///
/// Items are optionally shuffled, then cut into `k` contiguous folds; the
/// first `len % k` folds hold one extra item. Fold `i` is the test set of
/// the `i`-th pair and the remaining folds, in order, form its train set.
pub fn k_fold(
    dataset: &Dataset,
    k: usize,
    shuffle: bool,
    seed: Option<u64>,
) -> SampleResult<Vec<Fold>> {
    let len = dataset.len();
    if k < 2 || k > len {
        return Err(SampleError::InvalidFoldCount { k, len });
    }
    debug!(dataset = dataset.name(), k, shuffle, ?seed, "building folds");

    let order = ordering(len, shuffle, seed);
    let fold_size = len / k;
    let remainder = len % k;

    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for index in 0..k {
        let end = start + fold_size + usize::from(index < remainder);

        let test_items = pick(dataset, &order[start..end]);
        let train_items = pick(
            dataset,
            &order[..start]
                .iter()
                .chain(&order[end..])
                .copied()
                .collect::<Vec<_>>(),
        );

        folds.push(Fold {
            index,
            train: dataset.derive(train_items, fold_metadata(index, k, "train", seed)),
            test: dataset.derive(test_items, fold_metadata(index, k, "test", seed)),
        });
        start = end;
    }

    Ok(folds)
}

/// Split a dataset into train and test partitions.
///
/// With `shuffle`, items are permuted by the seeded generator first;
/// otherwise the test set is the first `test_len` items in dataset order.
/// A fractional test size is rounded to the nearest item count and kept
/// within `1..len`, so both partitions are non-empty whenever the dataset
/// has at least two items.
pub fn train_test_split(
    dataset: &Dataset,
    test_size: TestSize,
    shuffle: bool,
    seed: Option<u64>,
) -> SampleResult<Split> {
    let len = dataset.len();
    let test_len = test_count(len, test_size)?;
    debug!(dataset = dataset.name(), len, test_len, shuffle, ?seed, "splitting dataset");

    let order = ordering(len, shuffle, seed);
    let (test_order, train_order) = order.split_at(test_len);

    let mut test_meta = split_metadata("test", seed);
    test_meta.insert("test_size".to_string(), json!(test_len));
    let train_meta = split_metadata("train", seed);

    Ok(Split {
        train: dataset.derive(pick(dataset, train_order), train_meta),
        test: dataset.derive(pick(dataset, test_order), test_meta),
    })
}

fn test_count(len: usize, test_size: TestSize) -> SampleResult<usize> {
    match test_size {
        TestSize::Fraction(fraction) => {
            if !(fraction > 0.0 && fraction < 1.0) {
                return Err(SampleError::InvalidTestSize(format!(
                    "fraction {fraction} is not strictly between 0 and 1"
                )));
            }
            if len < 2 {
                return Err(SampleError::InvalidTestSize(format!(
                    "cannot split a dataset of {len} items"
                )));
            }
            let count = (fraction * len as f64).round() as usize;
            Ok(count.clamp(1, len - 1))
        }
        TestSize::Count(count) => {
            if count == 0 || count >= len {
                return Err(SampleError::InvalidTestSize(format!(
                    "count {count} must be between 1 and {}",
                    len.saturating_sub(1)
                )));
            }
            Ok(count)
        }
    }
}

fn ordering(len: usize, shuffle: bool, seed: Option<u64>) -> Vec<usize> {
    if shuffle {
        SampleRng::new(seed).permutation(len)
    } else {
        (0..len).collect()
    }
}

fn pick(dataset: &Dataset, indices: &[usize]) -> Vec<DatasetItem> {
    indices.iter().map(|&i| dataset.items()[i].clone()).collect()
}

fn fold_metadata(index: usize, k: usize, role: &str, seed: Option<u64>) -> Metadata {
    let mut metadata = split_metadata(role, seed);
    metadata.insert(keys::FOLD.to_string(), json!(index));
    metadata.insert(keys::FOLDS.to_string(), json!(k));
    metadata
}

fn split_metadata(role: &str, seed: Option<u64>) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(keys::SPLIT.to_string(), json!(role));
    if let Some(seed) = seed {
        metadata.insert(keys::SEED.to_string(), json!(seed));
    }
    metadata
}
