//! Rigid transform estimator using Procrustes analysis (Kabsch).

use nalgebra::{Matrix3, Vector3};

use crate::core::Estimator;
use crate::error::RegistrationError;
use crate::models::RigidTransform;
use crate::types::{Correspondences, Point};

/// Smallest number of correspondences that determines a rigid transform.
pub const MIN_POINTS: usize = 3;

/// Default relative singular-value floor for degeneracy detection.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Rigid transform estimator using Procrustes analysis.
///
/// Given corresponding `source` and `target` points it returns the proper
/// rotation `R` and translation `t` minimizing `Σ |R·s_i + t − t_i|²`.
#[derive(Debug, Clone, Copy)]
pub struct RigidTransformEstimator {
    tolerance: f64,
}

impl Default for RigidTransformEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidTransformEstimator {
    pub fn new() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Use a custom relative tolerance for degeneracy detection.
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Least-squares rigid transform mapping `source` onto `target`.
    pub fn solve(
        &self,
        source: &[Point],
        target: &[Point],
    ) -> Result<RigidTransform, RegistrationError> {
        if source.len() != target.len() {
            return Err(RegistrationError::LengthMismatch {
                source_len: source.len(),
                target_len: target.len(),
            });
        }
        if source.len() < MIN_POINTS {
            return Err(RegistrationError::InsufficientPoints {
                required: MIN_POINTS,
                got: source.len(),
            });
        }

        let c0 = centroid(source);
        let c1 = centroid(target);

        // Cross-covariance H = Σ (s_i - c0)(t_i - c1)^T
        let mut h = Matrix3::<f64>::zeros();
        for (s, t) in source.iter().zip(target) {
            h += (s.coords - c0) * (t.coords - c1).transpose();
        }

        if h.iter().any(|x| !x.is_finite()) {
            return Err(RegistrationError::DegenerateGeometry);
        }

        // SVD: H = U * S * V^T, then R = V * U^T
        let svd = h.svd(true, true);
        let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
            return Err(RegistrationError::DegenerateGeometry);
        };

        // A non-collinear set gives H rank >= 2. Three points always leave the
        // smallest singular value at ~0, so the middle one is the criterion.
        let mut sorted = [
            svd.singular_values[0],
            svd.singular_values[1],
            svd.singular_values[2],
        ];
        sorted.sort_by(|a, b| b.total_cmp(a));
        if sorted[0] <= f64::MIN_POSITIVE || sorted[1] <= self.tolerance * sorted[0] {
            return Err(RegistrationError::DegenerateGeometry);
        }

        let v = v_t.transpose();
        let mut r = v * u.transpose();

        // Reflection: flip the axis of the smallest singular value.
        if r.determinant() < 0.0 {
            let mut v_neg = v;
            v_neg.column_mut(svd.singular_values.imin()).neg_mut();
            r = v_neg * u.transpose();
        }

        let t = c1 - r * c0;
        if r.iter().chain(t.iter()).any(|x| !x.is_finite()) {
            return Err(RegistrationError::DegenerateGeometry);
        }

        Ok(RigidTransform::from_rt(r, t))
    }

    fn solve_pairs(
        &self,
        data: &Correspondences,
        sample: &[usize],
    ) -> Result<RigidTransform, RegistrationError> {
        let (source, target) = data.gather(sample);
        self.solve(&source, &target)
    }
}

fn centroid(points: &[Point]) -> Vector3<f64> {
    let sum = points
        .iter()
        .fold(Vector3::<f64>::zeros(), |acc, p| acc + p.coords);
    sum / points.len() as f64
}

/// `true` if `a`, `b`, `c` lie (numerically) on one line or coincide.
fn is_collinear(a: &Point, b: &Point, c: &Point, tolerance: f64) -> bool {
    let ab = b - a;
    let ac = c - a;
    ab.cross(&ac).norm() <= tolerance * ab.norm() * ac.norm()
}

impl Estimator for RigidTransformEstimator {
    type Model = RigidTransform;

    fn sample_size(&self) -> usize {
        MIN_POINTS
    }

    fn is_valid_sample(&self, data: &Correspondences, sample: &[usize]) -> bool {
        if sample.len() < self.sample_size() {
            return false;
        }
        let population = data.sample_population();
        for i in 0..sample.len() {
            if sample[i] >= population {
                return false;
            }
            for j in (i + 1)..sample.len() {
                if sample[i] == sample[j] {
                    return false;
                }
            }
        }
        if sample.len() == MIN_POINTS {
            let (p0, q0) = data.pair(sample[0]);
            let (p1, q1) = data.pair(sample[1]);
            let (p2, q2) = data.pair(sample[2]);
            if is_collinear(p0, p1, p2, self.tolerance) || is_collinear(q0, q1, q2, self.tolerance)
            {
                return false;
            }
        }
        true
    }

    fn estimate_model(
        &self,
        data: &Correspondences,
        sample: &[usize],
    ) -> Result<Self::Model, RegistrationError> {
        if sample.len() < self.sample_size() {
            return Err(RegistrationError::InsufficientPoints {
                required: self.sample_size(),
                got: sample.len(),
            });
        }
        self.solve_pairs(data, &sample[..MIN_POINTS])
    }

    fn estimate_model_nonminimal(
        &self,
        data: &Correspondences,
        sample: &[usize],
    ) -> Result<Self::Model, RegistrationError> {
        // Procrustes handles any number of points >= 3.
        self.solve_pairs(data, sample)
    }

    fn is_valid_model(&self, model: &Self::Model) -> bool {
        let det = model.determinant();
        det.is_finite() && (det - 1.0).abs() < 1e-6 && model.translation.iter().all(|x| x.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IndexPolicy, PointSequence};
    use nalgebra::{Rotation3, Unit};

    fn tetra() -> PointSequence {
        vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
            Point::new(0.0, 0.0, 3.0),
            Point::new(1.5, -0.5, 0.7),
        ]
    }

    fn known_transform() -> RigidTransform {
        RigidTransform::new(
            Rotation3::from_axis_angle(
                &Unit::new_normalize(Vector3::new(1.0, 2.0, -0.5)),
                0.9,
            ),
            Vector3::new(1.5, -2.0, 0.25),
        )
    }

    fn assert_close(a: &RigidTransform, b: &RigidTransform, tol: f64) {
        let dr = (a.rotation_matrix() - b.rotation_matrix()).abs().max();
        let dt = (a.translation - b.translation).abs().max();
        assert!(dr < tol, "rotation differs by {dr}");
        assert!(dt < tol, "translation differs by {dt}");
    }

    #[test]
    fn recovers_exact_transform() {
        let source = tetra();
        let truth = known_transform();
        let target = truth.transform_points(&source);

        let est = RigidTransformEstimator::new().solve(&source, &target).unwrap();
        assert_close(&est, &truth, 1e-9);

        let residual: f64 = source
            .iter()
            .zip(&target)
            .map(|(s, t)| (est.apply(s) - t).norm_squared())
            .sum();
        assert!(residual < 1e-18);
    }

    #[test]
    fn recovers_exact_transform_from_three_points() {
        let source = tetra()[..3].to_vec();
        let truth = known_transform();
        let target = truth.transform_points(&source);

        let est = RigidTransformEstimator::new().solve(&source, &target).unwrap();
        assert_close(&est, &truth, 1e-9);
        assert!((est.determinant() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn corrects_reflection() {
        let source = tetra();
        // Mirror through the xy-plane: the best orthogonal fit is a reflection.
        let target: PointSequence = source.iter().map(|p| Point::new(p.x, p.y, -p.z)).collect();

        let c0 = centroid(&source);
        let c1 = centroid(&target);
        let mut h = Matrix3::<f64>::zeros();
        for (s, t) in source.iter().zip(&target) {
            h += (s.coords - c0) * (t.coords - c1).transpose();
        }
        let svd = h.svd(true, true);
        let naive = svd.v_t.unwrap().transpose() * svd.u.unwrap().transpose();
        assert!(naive.determinant() < 0.0, "naive fit should be a reflection");

        let est = RigidTransformEstimator::new().solve(&source, &target).unwrap();
        assert!((est.determinant() - 1.0).abs() < 1e-9);
        let r = est.rotation_matrix();
        assert!((r.transpose() * r - Matrix3::identity()).abs().max() < 1e-9);
    }

    #[test]
    fn rejects_collinear_points() {
        let source = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 1.0),
            Point::new(2.0, 2.0, 2.0),
        ];
        let target = known_transform().transform_points(&source);
        let err = RigidTransformEstimator::new()
            .solve(&source, &target)
            .unwrap_err();
        assert_eq!(err, RegistrationError::DegenerateGeometry);
    }

    #[test]
    fn rejects_duplicate_points() {
        let p = Point::new(1.0, 2.0, 3.0);
        let source = vec![p, p, p];
        let target = vec![p, p, p];
        let err = RigidTransformEstimator::new()
            .solve(&source, &target)
            .unwrap_err();
        assert_eq!(err, RegistrationError::DegenerateGeometry);
    }

    #[test]
    fn rejects_collinear_target() {
        let source = tetra()[..3].to_vec();
        let target = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 5.0, 0.0),
        ];
        let err = RigidTransformEstimator::new()
            .solve(&source, &target)
            .unwrap_err();
        assert_eq!(err, RegistrationError::DegenerateGeometry);
    }

    #[test]
    fn rejects_too_few_or_mismatched_points() {
        let est = RigidTransformEstimator::new();
        let two = tetra()[..2].to_vec();
        assert_eq!(
            est.solve(&two, &two).unwrap_err(),
            RegistrationError::InsufficientPoints {
                required: 3,
                got: 2
            }
        );
        let three = tetra()[..3].to_vec();
        let four = tetra()[..4].to_vec();
        assert_eq!(
            est.solve(&three, &four).unwrap_err(),
            RegistrationError::LengthMismatch {
                source_len: 3,
                target_len: 4
            }
        );
    }

    #[test]
    fn loose_tolerance_flags_thin_triangles() {
        // Singular values are about 2 and 0.03² / 6, a ratio near 7.5e-5.
        let source = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(2.0, 0.03, 0.0),
        ];
        let target = known_transform().transform_points(&source);

        let strict = RigidTransformEstimator::new();
        assert_eq!(strict.tolerance(), DEFAULT_TOLERANCE);
        assert!(strict.solve(&source, &target).is_ok());

        let loose = RigidTransformEstimator::with_tolerance(1e-3);
        assert_eq!(loose.tolerance(), 1e-3);
        assert_eq!(
            loose.solve(&source, &target).unwrap_err(),
            RegistrationError::DegenerateGeometry
        );
    }

    #[test]
    fn solve_is_deterministic() {
        let source = tetra();
        let target = known_transform().transform_points(&source);
        let est = RigidTransformEstimator::new();
        let a = est.solve(&source, &target).unwrap();
        let b = est.solve(&source, &target).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn estimator_trait_checks_samples() {
        let reference = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        let candidate = known_transform().transform_points(&reference);
        let data = Correspondences::new(&reference, &candidate, IndexPolicy::CyclicWrap).unwrap();
        let est = RigidTransformEstimator::new();

        assert!(!est.is_valid_sample(&data, &[0, 1, 2]), "collinear sample");
        assert!(!est.is_valid_sample(&data, &[0, 0, 3]), "repeated index");
        assert!(!est.is_valid_sample(&data, &[0, 1, 9]), "out of range");
        assert!(est.is_valid_sample(&data, &[0, 1, 3]));

        let model = est.estimate_model(&data, &[0, 1, 3]).unwrap();
        assert!(est.is_valid_model(&model));
        assert_close(&model, &known_transform(), 1e-9);
    }
}
