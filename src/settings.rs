//! RANSAC configuration.
//!
//! The iteration count and the inlier threshold are the only tunables the
//! algorithm itself needs. The rest select the correspondence policy, make
//! runs reproducible, or control execution (workers, retries, refinement).

use crate::error::RegistrationError;
use crate::types::IndexPolicy;

/// Main configuration object for the rigid RANSAC pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RansacSettings {
    /// Number of iterations. The loop always runs all of them.
    pub max_iterations: usize,
    /// A pair is an inlier when its residual is strictly below this distance.
    pub inlier_threshold: f64,
    /// How indices of sequences with different lengths are paired.
    pub index_policy: IndexPolicy,
    /// Seed for the sampler. `None` draws a fresh seed per run.
    pub seed: Option<u64>,
    /// Number of parallel workers; `1` runs sequentially, `0` uses every
    /// thread of the rayon pool.
    pub workers: usize,
    /// Draws per iteration before a degenerate iteration is skipped.
    pub max_sample_attempts: usize,
    /// Relative singular-value floor below which a sample is degenerate.
    pub degeneracy_tolerance: f64,
    /// Refit the winning model on all of its inliers.
    pub refine: bool,
}

impl Default for RansacSettings {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            inlier_threshold: 0.5,
            index_policy: IndexPolicy::CyclicWrap,
            seed: None,
            workers: 1,
            max_sample_attempts: 100,
            degeneracy_tolerance: 1e-6,
            refine: false,
        }
    }
}

impl RansacSettings {
    pub fn with_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_threshold(mut self, inlier_threshold: f64) -> Self {
        self.inlier_threshold = inlier_threshold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_policy(mut self, index_policy: IndexPolicy) -> Self {
        self.index_policy = index_policy;
        self
    }

    pub fn with_refine(mut self, refine: bool) -> Self {
        self.refine = refine;
        self
    }

    /// Check the settings before a run.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.max_iterations == 0 {
            return Err(RegistrationError::InvalidSettings(
                "max_iterations must be positive".to_string(),
            ));
        }
        if !self.inlier_threshold.is_finite() || self.inlier_threshold <= 0.0 {
            return Err(RegistrationError::InvalidSettings(format!(
                "inlier_threshold must be a positive distance, got {}",
                self.inlier_threshold
            )));
        }
        if self.max_sample_attempts == 0 {
            return Err(RegistrationError::InvalidSettings(
                "max_sample_attempts must be positive".to_string(),
            ));
        }
        if !self.degeneracy_tolerance.is_finite() || self.degeneracy_tolerance <= 0.0 {
            return Err(RegistrationError::InvalidSettings(format!(
                "degeneracy_tolerance must be positive, got {}",
                self.degeneracy_tolerance
            )));
        }
        Ok(())
    }

    /// Worker count after resolving `0` to the rayon pool size.
    pub fn effective_workers(&self) -> usize {
        let workers = if self.workers == 0 {
            rayon::current_num_threads()
        } else {
            self.workers
        };
        workers.clamp(1, self.max_iterations.max(1))
    }
}
