//! Core traits and the RANSAC pipeline.
//!
//! - Traits for estimators, samplers, scoring and local optimization.
//! - A generic [`Ransac`] struct that orchestrates these components over a
//!   [`Correspondences`] view, sequentially or across a rayon worker pool.
//!
//! The pipeline never logs. Callers that want per-iteration diagnostics pass
//! an observer to [`Ransac::run_with_progress`].

use rayon::prelude::*;

use crate::error::RegistrationError;
use crate::settings::RansacSettings;
use crate::types::Correspondences;

/// Estimator responsible for generating model hypotheses from samples.
pub trait Estimator {
    /// Model type produced by this estimator.
    type Model: Clone;

    /// Size of a minimal sample for this estimator.
    fn sample_size(&self) -> usize;

    /// Check whether a given sample is geometrically valid.
    fn is_valid_sample(&self, data: &Correspondences, sample: &[usize]) -> bool;

    /// Estimate a model from a minimal sample of pair indices.
    fn estimate_model(
        &self,
        data: &Correspondences,
        sample: &[usize],
    ) -> Result<Self::Model, RegistrationError>;

    /// Estimate a model from more than the minimal number of pairs.
    fn estimate_model_nonminimal(
        &self,
        data: &Correspondences,
        sample: &[usize],
    ) -> Result<Self::Model, RegistrationError> {
        self.estimate_model(data, sample)
    }

    /// Validate a candidate model before scoring.
    fn is_valid_model(&self, model: &Self::Model) -> bool;
}

/// Sampler responsible for drawing minimal samples from the data.
pub trait Sampler {
    /// Draw `out_indices.len()` distinct pair indices from
    /// `[0, population)`.
    ///
    /// Returns `false` if a valid sample could not be drawn.
    fn sample(&mut self, population: usize, out_indices: &mut [usize]) -> bool;

    /// An independent sampler for stream `stream`, derived deterministically
    /// from this sampler's seed.
    fn fork(&self, stream: u64) -> Self
    where
        Self: Sized;
}

/// Scoring strategy used to evaluate model quality and determine inliers.
pub trait Scoring<M> {
    /// Score type. `a > b` means `a` is strictly better than `b`.
    type Score: Clone + PartialOrd;

    /// Inlier/outlier threshold for residuals.
    fn threshold(&self) -> f64;

    /// Score a model against every pair and collect the inlier pair indices.
    fn score(&self, data: &Correspondences, model: &M, inliers_out: &mut Vec<usize>)
        -> Self::Score;
}

/// Local optimization strategy, refining a model using its inliers.
pub trait LocalOptimizer<M> {
    /// Return a refined model, or `None` if no refinement was possible.
    fn run(&self, data: &Correspondences, inliers: &[usize], model: &M) -> Option<M>;
}

/// Local optimizer that never changes the model.
pub struct NoopLocalOptimizer;

impl<M> LocalOptimizer<M> for NoopLocalOptimizer {
    fn run(&self, _data: &Correspondences, _inliers: &[usize], _model: &M) -> Option<M> {
        None
    }
}

/// Least squares local optimizer that refits the model using all inliers.
pub struct LeastSquaresOptimizer<E>
where
    E: Estimator,
{
    estimator: E,
}

impl<E> LeastSquaresOptimizer<E>
where
    E: Estimator,
{
    pub fn new(estimator: E) -> Self {
        Self { estimator }
    }
}

impl<E> LocalOptimizer<E::Model> for LeastSquaresOptimizer<E>
where
    E: Estimator,
{
    fn run(&self, data: &Correspondences, inliers: &[usize], _model: &E::Model) -> Option<E::Model> {
        if inliers.len() < self.estimator.sample_size() {
            return None;
        }
        let refined = self.estimator.estimate_model_nonminimal(data, inliers).ok()?;
        self.estimator.is_valid_model(&refined).then_some(refined)
    }
}

/// Per-iteration diagnostics handed to a progress observer.
#[derive(Debug, Clone)]
pub struct IterationReport<S> {
    /// Global iteration index.
    pub iteration: usize,
    /// Worker that ran the iteration; always 0 in sequential runs.
    pub worker: usize,
    /// Score of this iteration's hypothesis, `None` if it was skipped.
    pub score: Option<S>,
    /// Best score seen so far by this worker.
    pub best: Option<S>,
    /// Whether this iteration replaced the best.
    pub improved: bool,
}

/// Outcome of a successful RANSAC run.
#[derive(Debug, Clone)]
pub struct RansacResult<M, S> {
    pub model: M,
    pub score: S,
    /// Pair indices (see [`Correspondences::pair`]) of the inliers.
    pub inliers: Vec<usize>,
    /// Iteration that produced the winning hypothesis.
    pub best_iteration: usize,
    /// Iterations run, including skipped ones.
    pub iterations: usize,
    /// Whether the final refit replaced the sampled hypothesis.
    pub refined: bool,
}

/// Best-so-far hypothesis of one worker.
#[derive(Clone)]
struct Candidate<M, S> {
    model: M,
    score: S,
    inliers: Vec<usize>,
    iteration: usize,
}

fn is_better<S: PartialOrd>(score: &S, best: Option<&S>) -> bool {
    match best {
        None => true,
        Some(best) => score > best,
    }
}

/// Generic RANSAC pipeline orchestrating the above components.
///
/// The sampler given at construction is never advanced; every run forks it
/// once per worker, so repeated runs with a seeded sampler are reproducible.
pub struct Ransac<E, Sc, Sa, LO = NoopLocalOptimizer>
where
    E: Estimator,
    Sc: Scoring<E::Model>,
    Sa: Sampler,
    LO: LocalOptimizer<E::Model>,
{
    pub settings: RansacSettings,
    pub estimator: E,
    pub scoring: Sc,
    pub sampler: Sa,
    pub final_optimizer: Option<LO>,
}

impl<E, Sc, Sa> Ransac<E, Sc, Sa, NoopLocalOptimizer>
where
    E: Estimator,
    Sc: Scoring<E::Model>,
    Sa: Sampler,
{
    /// Create a new pipeline from its components.
    pub fn new(settings: RansacSettings, estimator: E, scoring: Sc, sampler: Sa) -> Self {
        Self {
            settings,
            estimator,
            scoring,
            sampler,
            final_optimizer: None,
        }
    }
}

impl<E, Sc, Sa, LO> Ransac<E, Sc, Sa, LO>
where
    E: Estimator + Sync,
    E::Model: Send,
    Sc: Scoring<E::Model> + Sync,
    Sc::Score: Send,
    Sa: Sampler + Sync + Send,
    LO: LocalOptimizer<E::Model> + Sync,
{
    /// Attach a final optimizer applied once to the best hypothesis.
    pub fn with_final_optimizer<LO2>(self, optimizer: LO2) -> Ransac<E, Sc, Sa, LO2>
    where
        LO2: LocalOptimizer<E::Model>,
    {
        Ransac {
            settings: self.settings,
            estimator: self.estimator,
            scoring: self.scoring,
            sampler: self.sampler,
            final_optimizer: Some(optimizer),
        }
    }

    /// Run the RANSAC loop on the given correspondences.
    pub fn run(
        &self,
        data: &Correspondences,
    ) -> Result<RansacResult<E::Model, Sc::Score>, RegistrationError> {
        self.run_with_progress(data, |_: &IterationReport<Sc::Score>| {})
    }

    /// Run the RANSAC loop, calling `observer` once per iteration.
    ///
    /// With several workers the observer is called concurrently, and each
    /// report's `best` is the reporting worker's own best.
    pub fn run_with_progress<F>(
        &self,
        data: &Correspondences,
        observer: F,
    ) -> Result<RansacResult<E::Model, Sc::Score>, RegistrationError>
    where
        F: Fn(&IterationReport<Sc::Score>) + Sync,
    {
        self.settings.validate()?;

        let sample_size = self.estimator.sample_size();
        for len in [data.reference().len(), data.candidate().len()] {
            if len < sample_size {
                return Err(RegistrationError::InsufficientPoints {
                    required: sample_size,
                    got: len,
                });
            }
        }

        let iterations = self.settings.max_iterations;
        let workers = self.settings.effective_workers();

        let best = if workers == 1 {
            self.run_worker(data, 0, 0..iterations, &observer)
        } else {
            let chunk = iterations.div_ceil(workers);
            let bests: Vec<Option<Candidate<E::Model, Sc::Score>>> = (0..workers)
                .into_par_iter()
                .map(|worker| {
                    let start = (worker * chunk).min(iterations);
                    let end = ((worker + 1) * chunk).min(iterations);
                    self.run_worker(data, worker, start..end, &observer)
                })
                .collect();

            // Single reduction in worker order; earlier workers win exact ties.
            bests
                .into_iter()
                .flatten()
                .fold(None::<Candidate<E::Model, Sc::Score>>, |best, candidate| {
                    if is_better(&candidate.score, best.as_ref().map(|b| &b.score)) {
                        Some(candidate)
                    } else {
                        best
                    }
                })
        };

        let Some(best) = best else {
            return Err(RegistrationError::NoValidHypothesis { iterations });
        };

        let mut result = RansacResult {
            model: best.model,
            score: best.score,
            inliers: best.inliers,
            best_iteration: best.iteration,
            iterations,
            refined: false,
        };

        if let Some(optimizer) = &self.final_optimizer {
            if let Some(refined) = optimizer.run(data, &result.inliers, &result.model) {
                let mut inliers = Vec::new();
                let score = self.scoring.score(data, &refined, &mut inliers);
                if score > result.score {
                    result.model = refined;
                    result.score = score;
                    result.inliers = inliers;
                    result.refined = true;
                }
            }
        }

        Ok(result)
    }

    /// One worker's share of the loop over global iteration indices `range`.
    fn run_worker<F>(
        &self,
        data: &Correspondences,
        worker: usize,
        range: std::ops::Range<usize>,
        observer: &F,
    ) -> Option<Candidate<E::Model, Sc::Score>>
    where
        F: Fn(&IterationReport<Sc::Score>) + Sync,
    {
        let mut sampler = self.sampler.fork(worker as u64);
        let sample_size = self.estimator.sample_size();
        let population = data.sample_population();
        let mut sample = vec![0usize; sample_size];
        let mut tmp_inliers = Vec::new();
        let mut best: Option<Candidate<E::Model, Sc::Score>> = None;

        for iteration in range {
            let model = self.draw_hypothesis(data, &mut sampler, population, &mut sample);

            let mut score_out = None;
            let mut improved = false;
            if let Some(model) = model {
                let score = self.scoring.score(data, &model, &mut tmp_inliers);
                if is_better(&score, best.as_ref().map(|b| &b.score)) {
                    best = Some(Candidate {
                        model,
                        score: score.clone(),
                        inliers: tmp_inliers.clone(),
                        iteration,
                    });
                    improved = true;
                }
                score_out = Some(score);
            }

            observer(&IterationReport {
                iteration,
                worker,
                score: score_out,
                best: best.as_ref().map(|b| b.score.clone()),
                improved,
            });
        }

        best
    }

    /// Sample until a valid model is produced or the attempt budget runs out.
    fn draw_hypothesis(
        &self,
        data: &Correspondences,
        sampler: &mut Sa,
        population: usize,
        sample: &mut [usize],
    ) -> Option<E::Model> {
        for _ in 0..self.settings.max_sample_attempts {
            if !sampler.sample(population, sample) {
                continue;
            }
            if !self.estimator.is_valid_sample(data, sample) {
                continue;
            }
            match self.estimator.estimate_model(data, sample) {
                Ok(model) if self.estimator.is_valid_model(&model) => return Some(model),
                _ => continue,
            }
        }
        None
    }
}
