//! Core shared types for rigid registration.
//!
//! Points are plain `nalgebra` double-precision points. Two sequences are
//! paired by index; [`Correspondences`] is the borrowed view the estimator,
//! sampler and scoring all read from, playing the role a single data matrix
//! plays in a classic RANSAC pipeline.

use crate::error::RegistrationError;

/// A 3D point in double precision.
pub type Point = nalgebra::Point3<f64>;

/// Ordered point sequence. Position encodes correspondence with another
/// sequence at the same index.
pub type PointSequence = Vec<Point>;

/// Rule pairing indices of two sequences whose lengths may differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexPolicy {
    /// Walk every index `k` of the longer sequence and pair
    /// `reference[k % len(reference)]` with `candidate[k % len(candidate)]`.
    #[default]
    CyclicWrap,
    /// Only pair the first `min(len(reference), len(candidate))` indices.
    Truncate,
    /// Reject sequences of different lengths.
    RequireEqualLength,
}

impl IndexPolicy {
    /// Number of scored pairs for sequences of the given lengths.
    pub fn pair_count(&self, reference_len: usize, candidate_len: usize) -> usize {
        match self {
            IndexPolicy::CyclicWrap => {
                if reference_len == 0 || candidate_len == 0 {
                    0
                } else {
                    reference_len.max(candidate_len)
                }
            }
            IndexPolicy::Truncate | IndexPolicy::RequireEqualLength => {
                reference_len.min(candidate_len)
            }
        }
    }

    /// Map pair index `k` to `(reference_index, candidate_index)`.
    ///
    /// Both lengths must be non-zero.
    pub fn map(&self, k: usize, reference_len: usize, candidate_len: usize) -> (usize, usize) {
        match self {
            IndexPolicy::CyclicWrap => (k % reference_len, k % candidate_len),
            IndexPolicy::Truncate | IndexPolicy::RequireEqualLength => (k, k),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IndexPolicy::CyclicWrap => "cyclic-wrap",
            IndexPolicy::Truncate => "truncate",
            IndexPolicy::RequireEqualLength => "require-equal-length",
        }
    }
}

impl std::str::FromStr for IndexPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cyclic-wrap" | "cyclic" => Ok(IndexPolicy::CyclicWrap),
            "truncate" => Ok(IndexPolicy::Truncate),
            "require-equal-length" | "equal" => Ok(IndexPolicy::RequireEqualLength),
            other => Err(format!("unknown index policy '{other}'")),
        }
    }
}

/// Two point sequences paired by an [`IndexPolicy`].
///
/// The reference sequence is the source of the estimated transform and the
/// candidate sequence its target: a model `T` is scored by comparing
/// `T(reference[i])` with `candidate[j]` for every pair `(i, j)`.
#[derive(Debug, Clone, Copy)]
pub struct Correspondences<'a> {
    reference: &'a [Point],
    candidate: &'a [Point],
    policy: IndexPolicy,
}

impl<'a> Correspondences<'a> {
    /// Build a view, enforcing the policy's length requirements.
    ///
    /// Every coordinate of both sequences must be finite.
    pub fn new(
        reference: &'a [Point],
        candidate: &'a [Point],
        policy: IndexPolicy,
    ) -> Result<Self, RegistrationError> {
        if policy == IndexPolicy::RequireEqualLength && reference.len() != candidate.len() {
            return Err(RegistrationError::LengthMismatch {
                source_len: reference.len(),
                target_len: candidate.len(),
            });
        }
        for (sequence, points) in [("source", reference), ("target", candidate)] {
            if let Some(index) = points
                .iter()
                .position(|p| !p.coords.iter().all(|c| c.is_finite()))
            {
                return Err(RegistrationError::NonFinitePoint { sequence, index });
            }
        }
        Ok(Self {
            reference,
            candidate,
            policy,
        })
    }

    pub fn reference(&self) -> &'a [Point] {
        self.reference
    }

    pub fn candidate(&self) -> &'a [Point] {
        self.candidate
    }

    pub fn policy(&self) -> IndexPolicy {
        self.policy
    }

    /// Number of scored pairs.
    pub fn len(&self) -> usize {
        self.policy
            .pair_count(self.reference.len(), self.candidate.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the index range minimal samples are drawn from.
    pub fn sample_population(&self) -> usize {
        self.reference.len().min(self.candidate.len())
    }

    /// Sequence indices of pair `k`.
    pub fn indices(&self, k: usize) -> (usize, usize) {
        self.policy
            .map(k, self.reference.len(), self.candidate.len())
    }

    /// Points of pair `k`.
    pub fn pair(&self, k: usize) -> (&'a Point, &'a Point) {
        let (i, j) = self.indices(k);
        (&self.reference[i], &self.candidate[j])
    }

    /// Gather the reference and candidate points of the given pairs.
    pub fn gather(&self, pairs: &[usize]) -> (PointSequence, PointSequence) {
        pairs
            .iter()
            .map(|&k| {
                let (p, q) = self.pair(k);
                (*p, *q)
            })
            .unzip()
    }
}
