#![deny(unsafe_code)]
//! The consumers of a noise walk: everything outside the stepping core.
//!
//! This crate turns a [`NoiseField`](noise_walk_core::NoiseField) and an
//! emitted path into pixels (always available, see [`pixel`]), into PNG
//! files (feature `png`, see [`snapshot`]), and into pointer moves through a
//! caller-supplied [`PointerSink`] (see [`injector`]).

pub mod injector;
pub mod pixel;
pub mod recorder;

#[cfg(feature = "png")]
pub mod snapshot;

pub use injector::{JsonLinesSink, OffsetInjector, PointerSink, RecordingSink};
pub use pixel::{field_to_gray, field_to_rgba, Overlay};
pub use recorder::PathRecorder;
