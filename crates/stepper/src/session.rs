//! A single noise-guided traversal from a start point to a target point.
//!
//! [`PathSession`] is a lazy iterator over canvas-space points. The first
//! point is the start itself; every later point is one step whose speed,
//! bearing deviation, and jitter are modulated by the noise value under the
//! current position. The session ends `Completed` when it lands exactly on
//! the target, or `Cancelled` when its [`CancelToken`] is set.

use std::sync::Arc;
use std::time::Duration;

use glam::DVec2;
use noise_walk_core::{
    MotionParams, NoiseField, Point2D, RandomSource, SessionStatus, WalkError, Xorshift64,
};
use serde::Serialize;
use tracing::{debug, trace};

use crate::cancel::CancelToken;

/// Squared distance below which the walker snaps onto the target (half a pixel).
pub const ARRIVAL_THRESHOLD_SQ: f64 = 0.5 * 0.5;

/// Summary of a finished (or still running) session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionReport {
    pub status: SessionStatus,
    pub points_emitted: usize,
    pub last_point: Point2D,
    pub start: Point2D,
    pub target: Point2D,
}

/// Noise-guided walk from `start` to `target`.
///
/// Holds a shared handle to the noise field so several sessions (run one
/// after another) can sample the same grid. `R` supplies jitter.
pub struct PathSession<R = Xorshift64> {
    field: Arc<NoiseField>,
    start: Point2D,
    target: Point2D,
    current: Point2D,
    canvas_width: f64,
    canvas_height: f64,
    motion: MotionParams,
    rng: R,
    cancel: CancelToken,
    status: SessionStatus,
    emitted: usize,
    pace_pending: bool,
}

impl<R: RandomSource> PathSession<R> {
    /// Validates the inputs and prepares a session positioned at `start`.
    ///
    /// Fails with `InvalidCanvas` for a non-positive or non-finite canvas,
    /// `InvalidPoint` for non-finite endpoints, and `InvalidConfig` for bad
    /// motion parameters. Nothing is emitted until the first `next()`.
    pub fn new(
        field: Arc<NoiseField>,
        start: Point2D,
        target: Point2D,
        canvas_width: f64,
        canvas_height: f64,
        motion: MotionParams,
        rng: R,
    ) -> Result<Self, WalkError> {
        let valid_side = |s: f64| s.is_finite() && s > 0.0;
        if !valid_side(canvas_width) || !valid_side(canvas_height) {
            return Err(WalkError::InvalidCanvas {
                width: canvas_width,
                height: canvas_height,
            });
        }
        for p in [start, target] {
            if !p.is_finite() {
                return Err(WalkError::InvalidPoint { x: p.x, y: p.y });
            }
        }
        motion.validate()?;

        Ok(Self {
            field,
            start,
            target,
            current: start,
            canvas_width,
            canvas_height,
            motion,
            rng,
            cancel: CancelToken::new(),
            status: SessionStatus::Running,
            emitted: 0,
            pace_pending: false,
        })
    }

    /// Replaces the session's cancel token with one the controller holds.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// A clone of the token that stops this session.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Current position: the last emitted point, or `start` before the first.
    pub fn position(&self) -> Point2D {
        self.current
    }

    pub fn start(&self) -> Point2D {
        self.start
    }

    pub fn target(&self) -> Point2D {
        self.target
    }

    pub fn points_emitted(&self) -> usize {
        self.emitted
    }

    pub fn motion(&self) -> &MotionParams {
        &self.motion
    }

    /// Stops immediately without waiting for the next poll.
    ///
    /// Used by drivers when a consumer fails; also sets the cancel token so
    /// anyone sharing it sees the stop.
    pub fn abort(&mut self) {
        self.cancel.cancel();
        if !self.status.is_terminal() {
            self.finish(SessionStatus::Cancelled);
        }
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            status: self.status,
            points_emitted: self.emitted,
            last_point: self.current,
            start: self.start,
            target: self.target,
        }
    }

    /// Drains the session, pacing included, and returns the final report.
    pub fn run_to_end(&mut self) -> SessionReport {
        for _ in self.by_ref() {}
        self.report()
    }

    /// Noise value under the current position.
    fn sample_noise(&self) -> f64 {
        self.field.sample_normalized(
            self.current.x / self.canvas_width,
            self.current.y / self.canvas_height,
        )
    }

    /// Computes the next position, snapping to the target when within the
    /// arrival threshold or when the step would reach or pass it.
    fn advance(&mut self) -> Point2D {
        let current = DVec2::from(self.current);
        let to_target = DVec2::from(self.target) - current;
        let dist_sq = to_target.length_squared();

        if dist_sq < ARRIVAL_THRESHOLD_SQ {
            trace!(dist_sq, "within arrival threshold, snapping to target");
            return self.target;
        }

        let nv = self.sample_noise();
        let m = self.motion;
        let speed = m.speed_min + nv * m.speed_max_multiplier;
        let jitter_x = (self.rng.next_f64() - 0.5) * nv * m.jitter_multiplier;
        let jitter_y = (self.rng.next_f64() - 0.5) * nv * m.jitter_multiplier;
        let deviation = (nv - 0.5) * m.deviation_degrees_max.to_radians();
        let move_angle = to_target.y.atan2(to_target.x) + deviation;

        let step = DVec2::new(
            move_angle.cos() * speed + jitter_x,
            move_angle.sin() * speed + jitter_y,
        );

        if step.length_squared() >= dist_sq {
            trace!(dist_sq, "step reaches target, snapping");
            return self.target;
        }
        (current + step).into()
    }

    fn pace(&self) {
        if self.motion.step_sleep > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(self.motion.step_sleep));
        }
    }

    fn finish(&mut self, status: SessionStatus) {
        self.status = status;
        debug!(
            %status,
            points = self.emitted,
            x = self.current.x,
            y = self.current.y,
            "path session finished"
        );
    }
}

impl<R: RandomSource> Iterator for PathSession<R> {
    type Item = Point2D;

    fn next(&mut self) -> Option<Point2D> {
        if self.status.is_terminal() {
            return None;
        }

        if self.emitted == 0 {
            self.emitted = 1;
            debug!(start = %self.start, target = %self.target, "path session started");
            if self.current == self.target {
                self.finish(SessionStatus::Completed);
            }
            return Some(self.current);
        }

        if self.pace_pending {
            self.pace_pending = false;
            self.pace();
        }
        if self.cancel.is_cancelled() {
            self.finish(SessionStatus::Cancelled);
            return None;
        }

        self.current = self.advance();
        self.emitted += 1;

        // Snapping assigns the target value itself, so exact comparison holds.
        if self.current == self.target {
            self.finish(SessionStatus::Completed);
        } else {
            self.pace_pending = true;
        }
        Some(self.current)
    }
}
