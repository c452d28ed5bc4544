//! Error types for rigid registration.

use thiserror::Error;

/// Failures raised by the rigid solver and the RANSAC loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    #[error("need at least {required} points, got {got}")]
    InsufficientPoints { required: usize, got: usize },

    #[error("point sequences differ in length: source has {source_len}, target has {target_len}")]
    LengthMismatch { source_len: usize, target_len: usize },

    #[error("{sequence} point {index} has a non-finite coordinate")]
    NonFinitePoint {
        sequence: &'static str,
        index: usize,
    },

    /// Collinear or coincident points; the rotation is not determined.
    #[error("degenerate geometry: points are collinear or coincident")]
    DegenerateGeometry,

    #[error("no valid hypothesis found in {iterations} iterations")]
    NoValidHypothesis { iterations: usize },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
