//! Estimators for geometric models.
//!
//! Only rigid 3D transforms are estimated; the closed-form Kabsch solver is
//! both the minimal solver inside the RANSAC loop and the least-squares
//! refit over inliers.

pub mod rigid_transform;

pub use rigid_transform::RigidTransformEstimator;
