//! Human-readable summaries of a registration.

use std::fmt;

use crate::api::{Registration, RegistrationOutcome};
use crate::types::Point;

/// Uniform scale read-out: length of the first transformed offset over the
/// first reference offset.
///
/// Display only; rigid transforms never scale. Returns 1.0 when either
/// sequence has fewer than two points or the reference offset is zero.
pub fn scale_estimate(reference: &[Point], transformed: &[Point]) -> f64 {
    if reference.len() < 2 || transformed.len() < 2 {
        return 1.0;
    }
    let original = (reference[1] - reference[0]).norm();
    if original <= f64::EPSILON {
        return 1.0;
    }
    (transformed[1] - transformed[0]).norm() / original
}

/// Text report of a registration.
#[derive(Debug, Clone)]
pub struct RegistrationReport<'a> {
    pub registration: &'a Registration,
    pub scale: f64,
}

impl<'a> RegistrationReport<'a> {
    pub fn new(registration: &'a Registration, scale: f64) -> Self {
        Self {
            registration,
            scale,
        }
    }

    /// Report for a directed registration; the scale compares the fixed
    /// sequence with the moved one.
    pub fn from_outcome(outcome: &'a RegistrationOutcome, fixed: &[Point]) -> Self {
        Self::new(
            &outcome.registration,
            scale_estimate(fixed, &outcome.aligned),
        )
    }
}

impl fmt::Display for RegistrationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = self.registration;
        let r = reg.transform.rotation_matrix();
        let t = &reg.transform.translation;

        writeln!(f, "RANSAC Applied.")?;
        writeln!(f, "Rotation Matrix:")?;
        for i in 0..3 {
            writeln!(f, "[{:.2}, {:.2}, {:.2}]", r[(i, 0)], r[(i, 1)], r[(i, 2)])?;
        }
        writeln!(f, "Translation Vector:")?;
        writeln!(f, "[{:.2}, {:.2}, {:.2}]", t.x, t.y, t.z)?;
        writeln!(f, "Scale: {:.2}", self.scale)?;
        writeln!(f, "Inliers: {}", reg.inlier_count)?;
        writeln!(f, "Error: {:.4}", reg.mse)?;
        write!(
            f,
            "Best Iteration: {} of {}{}",
            reg.best_iteration + 1,
            reg.iterations,
            if reg.refined { " (refined)" } else { "" }
        )
    }
}
