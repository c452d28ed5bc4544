//! Uniform random sampler drawing minimal samples without replacement.

use crate::core::Sampler;
use crate::utils::{derive_seed, UniformRandomGenerator};

/// Uniform random sampler drawing minimal samples without replacement.
///
/// The drawn indices address pairs, so the same indices select from both
/// point sequences.
pub struct UniformRandomSampler {
    seed: u64,
    rng: UniformRandomGenerator<usize>,
}

impl Default for UniformRandomSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformRandomSampler {
    /// Construct a new sampler with a random seed.
    pub fn new() -> Self {
        Self::from_seed(rand::random())
    }

    /// Construct a sampler from a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: UniformRandomGenerator::from_seed(seed),
        }
    }

    /// Seeded when `seed` is given, randomly seeded otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::from_seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Sampler for UniformRandomSampler {
    fn sample(&mut self, population: usize, out_indices: &mut [usize]) -> bool {
        let sample_size = out_indices.len();
        if sample_size == 0 || population == 0 || sample_size > population {
            return false;
        }

        // Sample unique indices in the range [0, population - 1].
        self.rng.gen_unique(out_indices, 0, population - 1);
        true
    }

    fn fork(&self, stream: u64) -> Self {
        Self::from_seed(derive_seed(self.seed, stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_distinct_indices_in_range() {
        let mut sampler = UniformRandomSampler::from_seed(3);
        let mut sample = [0usize; 3];
        for _ in 0..200 {
            assert!(sampler.sample(5, &mut sample));
            assert!(sample.iter().all(|&i| i < 5));
            assert_ne!(sample[0], sample[1]);
            assert_ne!(sample[0], sample[2]);
            assert_ne!(sample[1], sample[2]);
        }
    }

    #[test]
    fn refuses_population_smaller_than_sample() {
        let mut sampler = UniformRandomSampler::from_seed(3);
        let mut sample = [0usize; 3];
        assert!(!sampler.sample(2, &mut sample));
        assert!(!sampler.sample(0, &mut sample));
    }

    #[test]
    fn optional_seed_is_kept() {
        assert_eq!(UniformRandomSampler::from_optional_seed(Some(5)).seed(), 5);
        let fork = UniformRandomSampler::from_seed(5).fork(2);
        assert_eq!(fork.seed(), derive_seed(5, 2));
    }

    #[test]
    fn forks_are_reproducible_and_independent() {
        let base = UniformRandomSampler::from_seed(11);
        let draw = |mut s: UniformRandomSampler| {
            let mut out = Vec::new();
            let mut sample = [0usize; 3];
            for _ in 0..10 {
                s.sample(1000, &mut sample);
                out.extend_from_slice(&sample);
            }
            out
        };
        assert_eq!(draw(base.fork(0)), draw(base.fork(0)));
        assert_ne!(draw(base.fork(0)), draw(base.fork(1)));
    }
}
