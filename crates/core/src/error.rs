//! Error types for the noise-walk core.

use thiserror::Error;

/// Errors produced while building noise fields, configuring sessions, or
/// replaying a path through an external collaborator.
///
/// Every variant except [`WalkError::Injection`] and [`WalkError::Io`] is a
/// setup error: it is returned before any stepping starts.
#[derive(Debug, Error)]
pub enum WalkError {
    /// Width or height was zero (or their product overflowed) when creating a grid.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// The canvas a session samples against has a non-positive or non-finite size.
    #[error("invalid canvas size ({width}, {height}): both sides must be positive and finite")]
    InvalidCanvas { width: f64, height: f64 },

    /// A start or target point had a non-finite coordinate.
    #[error("invalid point ({x}, {y}): coordinates must be finite")]
    InvalidPoint { x: f64, y: f64 },

    /// A configuration value failed validation.
    #[error("invalid config value '{name}': {reason}")]
    InvalidConfig { name: String, reason: String },

    /// A caller-supplied permutation table was not a permutation of 0..=255.
    #[error("invalid permutation table: {0}")]
    InvalidPermutation(String),

    /// A session was requested before the noise field or endpoints existed.
    #[error("not ready: {0}")]
    NotReady(String),

    /// The pointer replay layer failed to move the pointer.
    #[error("pointer injection failed: {0}")]
    Injection(String),

    /// Writing an image or stream failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl WalkError {
    /// Shorthand for [`WalkError::InvalidConfig`].
    pub fn config(name: &str, reason: impl Into<String>) -> Self {
        WalkError::InvalidConfig {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors raised before a session starts stepping.
    pub fn is_setup_error(&self) -> bool {
        !matches!(self, WalkError::Injection(_) | WalkError::Io(_))
    }
}
