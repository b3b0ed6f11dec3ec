//! Seeded random source for the sampler.
//!
//! ## Algorithm
//!
//! | Step | Choice |
//! |------|--------|
//! | Generator | ChaCha with 8 rounds (`rand_chacha::ChaCha8Rng`) |
//! | Seeding | `SeedableRng::seed_from_u64(seed)` |
//! | Unseeded | `SeedableRng::from_entropy()` |
//! | Shuffle | descending Fisher–Yates: for `i` from `len - 1` down to `1`, swap `i` with `j = bounded(i)` |
//! | Bounded draw | `range = i + 1` as `u64`, `zone = (range << range.leading_zeros()) - 1` (wrapping); draw `v = next_u64()` until the low 64 bits of `v * range` (as `u128`) are `<= zone`, then `j` is the high 64 bits |
//!
//! The bounded draw always consumes whole `u64` words, so the output does not
//! depend on the target's pointer width. It yields the same values as
//! `rand` 0.8 `gen_range(0..=i as u64)`.
//!
//! A new generator is created for every public sampler call, so no state is
//! shared between calls and equal seeds always give equal output.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Per-call random source.
pub struct SampleRng {
    rng: ChaCha8Rng,
}

impl SampleRng {
    /// Create a generator from an optional seed.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self {
                rng: ChaCha8Rng::from_entropy(),
            },
        }
    }

    /// Create a deterministic generator.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Shuffle `items` in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.bounded(i);
            items.swap(i, j);
        }
    }

    /// Uniform draw from `0..=max` by widening multiply with rejection.
    fn bounded(&mut self, max: usize) -> usize {
        let range = max as u64 + 1;
        let zone = (range << range.leading_zeros()).wrapping_sub(1);
        loop {
            let wide = u128::from(self.rng.next_u64()) * u128::from(range);
            if (wide as u64) <= zone {
                return (wide >> 64) as usize;
            }
        }
    }

    /// A shuffled permutation of `0..len`.
    pub fn permutation(&mut self, len: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..len).collect();
        self.shuffle(&mut indices);
        indices
    }
}
