//! Scoring primitives.
//!
//! A hypothesis is ranked by its inlier count first and its mean squared
//! residual second. [`Score`]'s ordering encodes exactly that, so the RANSAC
//! loop only ever asks `new > best`.

use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::core::Scoring;
use crate::models::RigidTransform;
use crate::types::{Correspondences, Point};

/// Inlier count and mean squared residual over all scored pairs.
///
/// `a > b` iff `a` has more inliers, or as many inliers and a strictly lower
/// MSE. Scores with equal counts and equal MSE compare equal, so they never
/// replace each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub inlier_count: usize,
    pub mse: f64,
}

impl Score {
    pub fn new(inlier_count: usize, mse: f64) -> Self {
        Self { inlier_count, mse }
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.inlier_count.cmp(&other.inlier_count) {
            // Lower error is better.
            Ordering::Equal => other.mse.partial_cmp(&self.mse),
            ord => Some(ord),
        }
    }
}

/// Residual of one correspondence under a model.
pub type ResidualFn<M> = fn(&M, &Point, &Point) -> f64;

/// RANSAC-style scoring that counts inliers using a residual function.
///
/// The residual function takes `(model, reference_point, candidate_point)`
/// and returns a non-negative distance. A pair is an inlier when its
/// residual is strictly below the threshold.
pub struct RansacInlierCountScoring<M, F>
where
    F: Fn(&M, &Point, &Point) -> f64,
{
    threshold: f64,
    residual_fn: F,
    _marker: PhantomData<fn(&M)>,
}

impl<M, F> RansacInlierCountScoring<M, F>
where
    F: Fn(&M, &Point, &Point) -> f64,
{
    pub fn new(threshold: f64, residual_fn: F) -> Self {
        Self {
            threshold,
            residual_fn,
            _marker: PhantomData,
        }
    }
}

/// Euclidean distance between the transformed reference point and its
/// candidate.
pub fn point_distance(model: &RigidTransform, reference: &Point, candidate: &Point) -> f64 {
    (model.apply(reference) - candidate).norm()
}

/// Inlier-count scoring of rigid transforms by point-to-point distance.
pub type RigidTransformScoring = RansacInlierCountScoring<RigidTransform, ResidualFn<RigidTransform>>;

impl RigidTransformScoring {
    pub fn point_to_point(threshold: f64) -> Self {
        Self::new(threshold, point_distance)
    }
}

impl<M, F> Scoring<M> for RansacInlierCountScoring<M, F>
where
    F: Fn(&M, &Point, &Point) -> f64,
{
    type Score = Score;

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn score(&self, data: &Correspondences, model: &M, inliers_out: &mut Vec<usize>) -> Score {
        let n = data.len();
        inliers_out.clear();

        let mut squared_sum = 0.0;
        for k in 0..n {
            let (p, q) = data.pair(k);
            let r = (self.residual_fn)(model, p, q);
            if r < self.threshold {
                inliers_out.push(k);
            }
            squared_sum += r * r;
        }

        let mse = if n == 0 {
            f64::INFINITY
        } else {
            squared_sum / n as f64
        };
        Score::new(inliers_out.len(), mse)
    }
}
