#![deny(unsafe_code)]
//! Noise-guided path stepping.
//!
//! A [`PathSession`] walks from a start point to a target point, sampling a
//! shared [`NoiseField`](noise_walk_core::NoiseField) at each step to modulate
//! speed, bearing and jitter. Sessions are lazy iterators; the [`driver`]
//! fans their points out to [`PathObserver`](noise_walk_core::PathObserver)s,
//! optionally on a background thread, and the [`Simulator`] owns the field
//! and endpoints between traversals.

pub mod cancel;
pub mod driver;
pub mod session;
pub mod simulator;

pub use cancel::CancelToken;
pub use driver::{drive, spawn, Finished, PathEvent, PointSender, SessionHandle};
pub use session::{PathSession, SessionReport, ARRIVAL_THRESHOLD_SQ};
pub use simulator::{Simulator, ENDPOINT_PADDING, POINT_RADIUS};
