//! High-level API for rigid registration.
//!
//! These functions wire the estimator, sampler, scoring and optional refit
//! into a [`Ransac`] pipeline and return plain result types. This is the
//! layer that logs; the pipeline itself only reports through observers.

use log::{debug, info, trace};

use crate::core::{IterationReport, LeastSquaresOptimizer, Ransac, RansacResult, Scoring};
use crate::error::RegistrationError;
use crate::estimators::RigidTransformEstimator;
use crate::models::RigidTransform;
use crate::samplers::UniformRandomSampler;
use crate::scoring::{RigidTransformScoring, Score};
use crate::settings::RansacSettings;
use crate::types::{Correspondences, IndexPolicy, Point, PointSequence};

/// Result of a robust rigid-transform estimation.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Transform mapping the source sequence onto the target sequence.
    pub transform: RigidTransform,
    pub inlier_count: usize,
    /// Mean squared residual over every scored pair.
    pub mse: f64,
    /// Pair indices of the inliers under `policy`.
    pub inliers: Vec<usize>,
    /// 0-based iteration that produced the winning hypothesis.
    pub best_iteration: usize,
    /// Number of iterations performed.
    pub iterations: usize,
    pub refined: bool,
    pub policy: IndexPolicy,
}

impl Registration {
    fn from_result(result: RansacResult<RigidTransform, Score>, policy: IndexPolicy) -> Self {
        Self {
            transform: result.model,
            inlier_count: result.score.inlier_count,
            mse: result.score.mse,
            inliers: result.inliers,
            best_iteration: result.best_iteration,
            iterations: result.iterations,
            refined: result.refined,
            policy,
        }
    }

    pub fn score(&self) -> Score {
        Score::new(self.inlier_count, self.mse)
    }
}

/// Which sequence is moved onto the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Move the second sequence onto the first.
    #[default]
    SecondOntoFirst,
    /// Move the first sequence onto the second.
    FirstOntoSecond,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::SecondOntoFirst => Direction::FirstOntoSecond,
            Direction::FirstOntoSecond => Direction::SecondOntoFirst,
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "second-onto-first" | "q-to-p" => Ok(Direction::SecondOntoFirst),
            "first-onto-second" | "p-to-q" => Ok(Direction::FirstOntoSecond),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::SecondOntoFirst => write!(f, "Registering second to first"),
            Direction::FirstOntoSecond => write!(f, "Registering first to second"),
        }
    }
}

/// A registration together with the moved points.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub registration: Registration,
    pub direction: Direction,
    /// The moved sequence, after applying the transform.
    pub aligned: PointSequence,
}

/// Closed-form least-squares fit of `source` onto `target`.
///
/// Both sequences must have the same length (at least 3) and known
/// one-to-one correspondence.
pub fn align(source: &[Point], target: &[Point]) -> Result<RigidTransform, RegistrationError> {
    RigidTransformEstimator::new().solve(source, target)
}

/// Estimate the rigid transform mapping `source` onto `target` with RANSAC.
///
/// Correspondence is by index under `settings.index_policy`.
pub fn estimate_rigid_transform(
    source: &[Point],
    target: &[Point],
    settings: &RansacSettings,
) -> Result<Registration, RegistrationError> {
    estimate_rigid_transform_with_progress(source, target, settings, |_| {})
}

/// Like [`estimate_rigid_transform`], forwarding every iteration report to
/// `observer`.
pub fn estimate_rigid_transform_with_progress<F>(
    source: &[Point],
    target: &[Point],
    settings: &RansacSettings,
    observer: F,
) -> Result<Registration, RegistrationError>
where
    F: Fn(&IterationReport<Score>) + Sync,
{
    let data = Correspondences::new(source, target, settings.index_policy)?;

    let estimator = RigidTransformEstimator::with_tolerance(settings.degeneracy_tolerance);
    let scoring = RigidTransformScoring::point_to_point(settings.inlier_threshold);
    let sampler = UniformRandomSampler::from_optional_seed(settings.seed);

    debug!(
        "rigid RANSAC: {} source, {} target points, {} pairs ({}), {} iterations, threshold {}, degeneracy tolerance {:e}, seed {}, {} worker(s)",
        source.len(),
        target.len(),
        data.len(),
        settings.index_policy.name(),
        settings.max_iterations,
        scoring.threshold(),
        estimator.tolerance(),
        sampler.seed(),
        settings.effective_workers(),
    );

    let ransac = Ransac::new(settings.clone(), estimator, scoring, sampler);

    let log_iteration = |report: &IterationReport<Score>| {
        match &report.score {
            Some(score) => trace!(
                "iteration {}/{}: inliers = {}, error = {:.4}",
                report.iteration + 1,
                settings.max_iterations,
                score.inlier_count,
                score.mse
            ),
            None => trace!(
                "iteration {}/{}: no valid sample",
                report.iteration + 1,
                settings.max_iterations
            ),
        }
        observer(report);
    };

    let result = if settings.refine {
        ransac
            .with_final_optimizer(LeastSquaresOptimizer::new(estimator))
            .run_with_progress(&data, log_iteration)
    } else {
        ransac.run_with_progress(&data, log_iteration)
    }?;

    info!(
        "best iteration: {}, best inliers: {}/{}, best error: {:.4}, total iterations: {}{}",
        result.best_iteration,
        result.score.inlier_count,
        data.len(),
        result.score.mse,
        result.iterations,
        if result.refined { " (refined)" } else { "" }
    );

    Ok(Registration::from_result(result, settings.index_policy))
}

/// Register two point sequences in the given direction.
///
/// With [`Direction::SecondOntoFirst`] the transform maps `second` onto
/// `first`, and `aligned` holds the moved `second` points.
pub fn register(
    first: &[Point],
    second: &[Point],
    direction: Direction,
    settings: &RansacSettings,
) -> Result<RegistrationOutcome, RegistrationError> {
    let (source, target) = match direction {
        Direction::SecondOntoFirst => (second, first),
        Direction::FirstOntoSecond => (first, second),
    };
    debug!("{direction}");

    let registration = estimate_rigid_transform(source, target, settings)?;
    let aligned = registration.transform.transform_points(source);
    Ok(RegistrationOutcome {
        registration,
        direction,
        aligned,
    })
}
