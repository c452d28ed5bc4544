//! # rigid-inlier - robust rigid registration of 3D point sets
//!
//! Aligns a candidate point sequence with a reference sequence when some of
//! the index-based correspondences are wrong. A closed-form Kabsch solver
//! fits rotation and translation to minimal 3-point samples inside a RANSAC
//! loop; hypotheses are ranked by inlier count, then by mean squared error.
//!
//! ## Quick Start
//!
//! ```rust
//! use rigid_inlier::{estimate_rigid_transform, RansacSettings};
//! use rigid_inlier::synthetic::{cube_grid, euler_transform};
//! use nalgebra::Vector3;
//!
//! let reference = cube_grid(3, 3, 3, 1.0);
//! let truth = euler_transform(Vector3::new(30.0, 45.0, 0.0), Vector3::new(1.5, 1.5, 1.5));
//! let mut candidate = truth.transform_points(&reference);
//! candidate[4] = nalgebra::Point3::new(40.0, -3.0, 2.0);
//!
//! let settings = RansacSettings::default().with_iterations(200).with_seed(7);
//! let result = estimate_rigid_transform(&reference, &candidate, &settings).unwrap();
//! assert_eq!(result.inlier_count, 26);
//! ```
//!
//! ## Extending the Library
//!
//! The pipeline in [`core`] is generic over a few traits:
//!
//! - **[`Estimator`](core::Estimator)**: hypothesis generation from samples
//! - **[`Sampler`](core::Sampler)**: minimal sample drawing, forkable per worker
//! - **[`Scoring<M>`](core::Scoring)**: hypothesis ranking and inlier sets
//! - **[`LocalOptimizer<M>`](core::LocalOptimizer)**: refinement of the winner
//!
//! ## Modules
//!
//! - **[`api`]**: high-level registration functions
//! - **[`core`]**: core traits and the `Ransac` pipeline
//! - **[`estimators`]**: the Kabsch rigid-transform estimator
//! - **[`samplers`]**: uniform minimal-sample drawing
//! - **[`scoring`]**: inlier/MSE scoring
//! - **[`settings`]**: configuration
//! - **[`io`]**, **[`synthetic`]**, **[`report`]**: point files, generated
//!   data and text summaries

pub mod api;
pub mod core;
pub mod error;
pub mod estimators;
pub mod io;
pub mod models;
pub mod report;
pub mod samplers;
pub mod scoring;
pub mod settings;
pub mod synthetic;
pub mod types;
pub mod utils;

pub use api::{
    align, estimate_rigid_transform, estimate_rigid_transform_with_progress, register, Direction,
    Registration, RegistrationOutcome,
};
pub use core::{Estimator, LocalOptimizer, Sampler, Scoring};
pub use error::RegistrationError;
pub use models::RigidTransform;
pub use settings::RansacSettings;
pub use types::{Correspondences, IndexPolicy, Point, PointSequence};
