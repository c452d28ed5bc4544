//! Miscellaneous utilities shared across the crate.
//!
//! A small wrapper around `rand` that draws sets of unique indices, plus
//! helpers to derive independent generator streams from a base seed.

use std::marker::PhantomData;

use rand::distributions::Uniform;
use rand::prelude::*;

/// Uniform integer random-number generator.
///
/// Seeded explicitly so that every sampler stream is reproducible.
pub struct UniformRandomGenerator<T>
where
    T: Copy + rand::distributions::uniform::SampleUniform + PartialOrd,
{
    rng: StdRng,
    _marker: PhantomData<T>,
}

impl<T> UniformRandomGenerator<T>
where
    T: Copy + rand::distributions::uniform::SampleUniform + PartialOrd,
{
    /// Construct with a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            _marker: PhantomData,
        }
    }

    /// Generate a set of unique random integers in `[min, max]` into `out`.
    ///
    /// Rejection sampling; suitable for the small sample sizes of minimal
    /// solvers. The caller guarantees the range holds at least `out.len()`
    /// values.
    pub fn gen_unique(&mut self, out: &mut [T], min: T, max: T)
    where
        T: Eq,
    {
        let dist = Uniform::new_inclusive(min, max);
        for i in 0..out.len() {
            loop {
                let candidate = self.rng.sample(&dist);
                if out[..i].iter().all(|&v| v != candidate) {
                    out[i] = candidate;
                    break;
                }
            }
        }
    }
}

/// Derive the seed of stream `stream` from a base seed.
///
/// SplitMix64 finalizer over `base + stream * golden_gamma`, so neighbouring
/// streams do not start from correlated states.
pub fn derive_seed(base: u64, stream: u64) -> u64 {
    let mut z = base.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
