//! Observer that keeps the emitted path for drawing after the fact.

use noise_walk_core::{PathObserver, Point2D, SessionStatus, WalkError};

use crate::pixel::Overlay;

/// Records endpoints, every emitted point, and the terminal status.
#[derive(Debug, Clone, Default)]
pub struct PathRecorder {
    overlay: Overlay,
    status: Option<SessionStatus>,
}

impl PathRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Point2D] {
        self.overlay.points()
    }

    /// Terminal status, once the session has finished normally.
    pub fn status(&self) -> Option<SessionStatus> {
        self.status
    }

    /// The recorded path as a drawable overlay.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn into_overlay(self) -> Overlay {
        self.overlay
    }
}

impl PathObserver for PathRecorder {
    fn on_start(&mut self, start: Point2D, target: Point2D) -> Result<(), WalkError> {
        self.overlay.set_endpoints(start, target);
        self.overlay.clear_path();
        self.status = None;
        Ok(())
    }

    fn on_point(&mut self, point: Point2D) -> Result<(), WalkError> {
        self.overlay.push(point);
        Ok(())
    }

    fn on_finish(&mut self, status: SessionStatus) -> Result<(), WalkError> {
        self.status = Some(status);
        Ok(())
    }
}
