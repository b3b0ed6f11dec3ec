//! Seeded dataset sampling and partitioning.
//!
//! Every operation reads an immutable [`Dataset`] and returns freshly built
//! datasets; source items are cloned, never shared or modified.
//!
//! | Operation | Output |
//! |-----------|--------|
//! | [`random_sample`] | `size` items drawn without replacement |
//! | [`stratified_sample`] | `size` items with strata proportions preserved |
//! | [`k_fold`] | `k` disjoint train/test [`Fold`]s |
//! | [`train_test_split`] | one train/test [`Split`] |
//!
//! All operations accept an optional seed. With a seed the output is
//! bit-identical across runs and target platforms; see [`rng`] for the
//! pinned algorithm.

mod partition;
mod random;
pub mod rng;
mod stratified;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

pub use partition::{k_fold, train_test_split};
pub use random::random_sample;
pub use stratified::stratified_sample;

/// Metadata keys recorded on sampler output.
pub mod keys {
    pub const SAMPLE_METHOD: &str = "sample_method";
    pub const SAMPLE_SIZE: &str = "sample_size";
    pub const ORIGINAL_SIZE: &str = "original_size";
    pub const SEED: &str = "seed";
    pub const STRATA_FIELD: &str = "strata_field";
    pub const STRATA: &str = "strata";
    pub const FOLD: &str = "fold";
    pub const FOLDS: &str = "folds";
    pub const SPLIT: &str = "split";
}

/// How a sample was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleMethod {
    Random,
    Stratified,
}

impl SampleMethod {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Stratified => "stratified",
        }
    }
}

/// Options for [`stratified_sample`].
///
/// `size` and `strata_field` are required; leaving either unset makes the
/// call fail with [`SampleError::MissingRequiredOption`](crate::SampleError).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StratifyOptions {
    /// Number of items to draw
    pub size: Option<usize>,
    /// Path to the field whose value defines an item's stratum
    /// (e.g. `metadata.category`, `expected.label`)
    pub strata_field: Option<String>,
    /// Seed for reproducible draws
    pub seed: Option<u64>,
}

impl StratifyOptions {
    #[must_use]
    pub fn new(size: usize, strata_field: impl Into<String>) -> Self {
        Self {
            size: Some(size),
            strata_field: Some(strata_field.into()),
            seed: None,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Requested size of the test partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestSize {
    /// Fraction of the dataset, strictly between 0 and 1
    Fraction(f64),
    /// Absolute number of items, strictly between 0 and the dataset size
    Count(usize),
}

/// One k-fold partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fold {
    /// Zero-based fold index
    pub index: usize,
    /// Every item outside this fold
    pub train: Dataset,
    /// The items of this fold
    pub test: Dataset,
}

/// A train/test split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}
