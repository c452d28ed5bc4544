//! Geometric models produced by the estimators.

use nalgebra::{Matrix3, Matrix4, Rotation3, Vector3};

use crate::types::{Point, PointSequence};

/// Rigid transform in 3D (proper rotation followed by translation).
///
/// Maps `p` to `rotation * p + translation`. Instances built by
/// [`RigidTransformEstimator`](crate::estimators::RigidTransformEstimator)
/// always carry a rotation with determinant +1.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidTransform {
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    pub fn new(rotation: Rotation3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Rotation3::identity(), Vector3::zeros())
    }

    /// Build from a raw matrix that is already known to be a proper rotation.
    pub fn from_rt(r: Matrix3<f64>, t: Vector3<f64>) -> Self {
        Self::new(Rotation3::from_matrix_unchecked(r), t)
    }

    pub fn rotation_matrix(&self) -> &Matrix3<f64> {
        self.rotation.matrix()
    }

    pub fn determinant(&self) -> f64 {
        self.rotation.matrix().determinant()
    }

    pub fn apply(&self, p: &Point) -> Point {
        self.rotation * p + self.translation
    }

    pub fn transform_points(&self, points: &[Point]) -> PointSequence {
        points.iter().map(|p| self.apply(p)).collect()
    }

    pub fn inverse(&self) -> Self {
        let inv = self.rotation.inverse();
        let t = -(inv * self.translation);
        Self::new(inv, t)
    }

    pub fn to_matrix4(&self) -> Matrix4<f64> {
        let mut m = self.rotation.to_homogeneous();
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        m
    }
}
