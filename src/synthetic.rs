//! Synthetic point data for tests, demos and benchmarks.
//!
//! Every generator takes the random source explicitly so callers control
//! seeding.

use nalgebra::{Rotation3, Vector3};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::RigidTransform;
use crate::types::{Point, PointSequence};

/// Half-width of the cube uniform noise points are drawn from by
/// [`generate_candidate_set`].
pub const NOISE_EXTENT: f64 = 5.0;

/// Largest number of points [`generate_candidate_set`] adds on top of the
/// reference count.
pub const MAX_EXTRA_POINTS: usize = 20;

/// Rotation from Euler angles in degrees, applied about Z, then X, then Y.
pub fn euler_rotation(x_deg: f64, y_deg: f64, z_deg: f64) -> Rotation3<f64> {
    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), x_deg.to_radians());
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), y_deg.to_radians());
    let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), z_deg.to_radians());
    ry * rx * rz
}

/// Rigid transform from Euler angles in degrees and a translation.
pub fn euler_transform(angles_deg: Vector3<f64>, translation: Vector3<f64>) -> RigidTransform {
    RigidTransform::new(
        euler_rotation(angles_deg.x, angles_deg.y, angles_deg.z),
        translation,
    )
}

/// `nx * ny * nz` points on a regular grid starting at the origin.
pub fn cube_grid(nx: usize, ny: usize, nz: usize, spacing: f64) -> PointSequence {
    let mut points = Vec::with_capacity(nx * ny * nz);
    for x in 0..nx {
        for y in 0..ny {
            for z in 0..nz {
                points.push(Point::new(
                    x as f64 * spacing,
                    y as f64 * spacing,
                    z as f64 * spacing,
                ));
            }
        }
    }
    points
}

/// `count` points uniform in `[-extent, extent]³`.
pub fn uniform_points<R: Rng + ?Sized>(rng: &mut R, count: usize, extent: f64) -> PointSequence {
    (0..count)
        .map(|_| {
            Point::new(
                rng.gen_range(-extent..=extent),
                rng.gen_range(-extent..=extent),
                rng.gen_range(-extent..=extent),
            )
        })
        .collect()
}

/// Replace `outlier_count` randomly chosen points with uniform noise in
/// `[-extent, extent]³`.
///
/// Returns the sorted positions that were replaced.
pub fn inject_outliers<R: Rng + ?Sized>(
    rng: &mut R,
    points: &mut [Point],
    outlier_count: usize,
    extent: f64,
) -> Vec<usize> {
    let count = outlier_count.min(points.len());
    let mut positions = rand::seq::index::sample(rng, points.len(), count).into_vec();
    positions.sort_unstable();
    for &i in &positions {
        points[i] = uniform_points(rng, 1, extent)[0];
    }
    positions
}

/// Apply one random permutation to both sequences, keeping pairs together.
///
/// Only the common prefix `min(len(a), len(b))` is permuted.
pub fn shuffle_jointly<R: Rng + ?Sized>(rng: &mut R, a: &mut [Point], b: &mut [Point]) {
    let n = a.len().min(b.len());
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=i);
        a.swap(i, j);
        b.swap(i, j);
    }
}

/// Build a noisy candidate set from a reference set.
///
/// The candidate holds between `n` and `n + 20` points: at least half are
/// exact copies of randomly chosen reference points, the rest uniform noise
/// in `[-5, 5]³`, all shuffled. Correspondence with the reference is lost,
/// so this exercises the cyclic index policy rather than exact recovery.
pub fn generate_candidate_set<R: Rng + ?Sized>(rng: &mut R, reference: &[Point]) -> PointSequence {
    if reference.is_empty() {
        return Vec::new();
    }
    let n = reference.len();
    let total = rng.gen_range(n..=n + MAX_EXTRA_POINTS);
    let exact_min = total.div_ceil(2);
    let exact = rng.gen_range(exact_min..=total);

    let mut points: PointSequence = (0..exact)
        .map(|_| reference[rng.gen_range(0..n)])
        .collect();
    points.extend(uniform_points(rng, total - exact, NOISE_EXTENT));
    points.shuffle(rng);
    points
}
