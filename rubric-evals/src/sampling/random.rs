//! Uniform sampling without replacement.

use serde_json::json;
use tracing::debug;

use super::keys;
use super::rng::SampleRng;
use super::SampleMethod;
use crate::dataset::Dataset;
use crate::error::{SampleError, SampleResult};
use crate::types::Metadata;

/// Draw `size` items uniformly without replacement.
///
/// Items appear in draw order. Fails with
/// [`SampleError::SampleSizeExceeded`] when `size` is larger than the dataset.
pub fn random_sample(dataset: &Dataset, size: usize, seed: Option<u64>) -> SampleResult<Dataset> {
    if size > dataset.len() {
        return Err(SampleError::SampleSizeExceeded {
            requested: size,
            available: dataset.len(),
        });
    }
    debug!(dataset = dataset.name(), size, ?seed, "drawing random sample");

    let mut rng = SampleRng::new(seed);
    let items = rng
        .permutation(dataset.len())
        .into_iter()
        .take(size)
        .map(|i| dataset.items()[i].clone())
        .collect();

    let mut metadata = Metadata::new();
    metadata.insert(keys::SAMPLE_METHOD.to_string(), json!(SampleMethod::Random.as_str()));
    metadata.insert(keys::SAMPLE_SIZE.to_string(), json!(size));
    metadata.insert(keys::ORIGINAL_SIZE.to_string(), json!(dataset.len()));
    if let Some(seed) = seed {
        metadata.insert(keys::SEED.to_string(), json!(seed));
    }

    Ok(dataset.derive(items, metadata))
}
