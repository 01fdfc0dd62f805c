#![deny(unsafe_code)]
//! Core types for noise-walk: Perlin noise fields and the data a path
//! session consumes.
//!
//! Provides `PermutationTable` and `NoiseField` (single-octave 2D Perlin noise
//! normalized to [0, 1]), `Point2D`, the typed `WalkConfig`/`MotionParams`,
//! reproducible `Scenario`s, the `Xorshift64` random source, and the
//! `PathObserver` trait implemented by everything that consumes a path.

pub mod config;
pub mod error;
pub mod noise;
pub mod observer;
pub mod params;
pub mod permutation;
pub mod point;
pub mod prng;
pub mod scenario;

pub use config::{MotionParams, WalkConfig};
pub use error::WalkError;
pub use noise::NoiseField;
pub use observer::{PathObserver, SessionStatus};
pub use permutation::PermutationTable;
pub use point::Point2D;
pub use prng::{RandomSource, Xorshift64};
pub use scenario::Scenario;

/// Generates a noise grid from a seed: shuffles a permutation table with
/// [`Xorshift64`] and samples `width` x `height` cells at `scale`.
pub fn generate_noise(
    seed: u64,
    width: usize,
    height: usize,
    scale: f64,
) -> Result<NoiseField, WalkError> {
    NoiseField::generate(&PermutationTable::from_seed(seed), width, height, scale)
}
