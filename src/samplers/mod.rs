//! Sampling strategies for minimal correspondence subsets.

pub mod uniform;

pub use uniform::UniformRandomSampler;
