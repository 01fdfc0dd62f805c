//! Owner of everything a traversal needs between runs.
//!
//! The [`Simulator`] keeps the validated config, the permutation table, the
//! current noise field and the A/B endpoints. A canvas resize or config
//! change regenerates the field and draws fresh endpoints; each
//! [`start_session`](Simulator::start_session) hands out a new
//! [`PathSession`] over the shared field and cancels the previous one, so at
//! most one traversal is live at a time.

use std::sync::Arc;

use noise_walk_core::{
    NoiseField, PermutationTable, Point2D, RandomSource, Scenario, WalkConfig, WalkError,
    Xorshift64,
};
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::session::PathSession;

/// Radius of the endpoint markers drawn by the presentation layer.
pub const POINT_RADIUS: f64 = 6.0;

/// Distance kept between random endpoints and the canvas edge.
pub const ENDPOINT_PADDING: f64 = POINT_RADIUS + 5.0;

pub struct Simulator {
    config: WalkConfig,
    permutation: PermutationTable,
    field: Option<Arc<NoiseField>>,
    canvas: Option<(usize, usize)>,
    start: Option<Point2D>,
    target: Option<Point2D>,
    endpoint_rng: Xorshift64,
    jitter_rng: Xorshift64,
    active: Option<CancelToken>,
}

impl Simulator {
    /// Creates an idle simulator. Nothing is generated until
    /// [`refresh`](Self::refresh).
    pub fn new(
        config: WalkConfig,
        permutation: PermutationTable,
        endpoint_rng: Xorshift64,
        jitter_rng: Xorshift64,
    ) -> Result<Self, WalkError> {
        config.validate()?;
        Ok(Self {
            config,
            permutation,
            field: None,
            canvas: None,
            start: None,
            target: None,
            endpoint_rng,
            jitter_rng,
            active: None,
        })
    }

    /// Builds a ready simulator from a scenario: the canvas is the configured
    /// window size, and fixed endpoints (when both are given) replace the
    /// random ones.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, WalkError> {
        scenario.validate()?;
        let mut sim = Self::new(
            scenario.config,
            scenario.permutation(),
            scenario.endpoint_rng(),
            scenario.jitter_rng(),
        )?;
        let (w, h) = scenario.canvas_size();
        sim.refresh(w, h)?;
        if let (Some(start), Some(target)) = (scenario.start, scenario.target) {
            sim.set_endpoints(start, target)?;
        }
        Ok(sim)
    }

    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    pub fn field(&self) -> Option<&Arc<NoiseField>> {
        self.field.as_ref()
    }

    pub fn canvas_size(&self) -> Option<(usize, usize)> {
        self.canvas
    }

    /// Current `(start, target)`, if both are set.
    pub fn endpoints(&self) -> Option<(Point2D, Point2D)> {
        self.start.zip(self.target)
    }

    /// True when a session can be started.
    pub fn is_ready(&self) -> bool {
        self.field.is_some() && self.canvas.is_some() && self.endpoints().is_some()
    }

    /// Validates and installs a new config, then regenerates for the current
    /// canvas. An invalid config leaves everything untouched.
    pub fn apply_config(&mut self, config: WalkConfig) -> Result<(), WalkError> {
        config.validate()?;
        self.stop();
        self.config = config;
        info!(
            noise_scale = config.noise_scale,
            resolution_scale = config.resolution_scale,
            "config applied"
        );
        match self.canvas {
            Some((w, h)) => self.refresh(w, h),
            None => Ok(()),
        }
    }

    /// Regenerates the noise field for a `canvas_width` x `canvas_height`
    /// canvas and draws new endpoints. Stops any running session.
    ///
    /// The grid is `max(1, trunc(side * resolution_scale))` cells per side.
    pub fn refresh(&mut self, canvas_width: usize, canvas_height: usize) -> Result<(), WalkError> {
        self.stop();
        if canvas_width == 0 || canvas_height == 0 {
            return Err(WalkError::InvalidCanvas {
                width: canvas_width as f64,
                height: canvas_height as f64,
            });
        }

        let (grid_w, grid_h) = self.config.noise_grid_size(canvas_width, canvas_height);
        let field = NoiseField::generate(&self.permutation, grid_w, grid_h, self.config.noise_scale)?;
        info!(
            canvas_width,
            canvas_height, grid_w, grid_h, "noise field regenerated"
        );
        self.field = Some(Arc::new(field));
        self.canvas = Some((canvas_width, canvas_height));
        self.new_endpoints()
    }

    /// Draws A and B uniformly inside the canvas, keeping
    /// [`ENDPOINT_PADDING`] from each edge. Stops any running session.
    pub fn new_endpoints(&mut self) -> Result<(), WalkError> {
        self.stop();
        let (w, h) = self
            .canvas
            .ok_or_else(|| WalkError::NotReady("canvas size unknown, refresh first".into()))?;
        let (w, h) = (w as f64, h as f64);
        let pick = |rng: &mut Xorshift64| {
            Point2D::new(
                rng.next_range(ENDPOINT_PADDING, w - ENDPOINT_PADDING),
                rng.next_range(ENDPOINT_PADDING, h - ENDPOINT_PADDING),
            )
        };
        let start = pick(&mut self.endpoint_rng);
        let target = pick(&mut self.endpoint_rng);
        debug!(%start, %target, "new endpoints");
        self.start = Some(start);
        self.target = Some(target);
        Ok(())
    }

    /// Replaces both endpoints. Stops any running session.
    pub fn set_endpoints(&mut self, start: Point2D, target: Point2D) -> Result<(), WalkError> {
        for p in [start, target] {
            if !p.is_finite() {
                return Err(WalkError::InvalidPoint { x: p.x, y: p.y });
            }
        }
        self.stop();
        self.start = Some(start);
        self.target = Some(target);
        Ok(())
    }

    /// Starts a traversal from A to B over the current field.
    ///
    /// Fails with `NotReady` when the field or endpoints are missing. Each
    /// session gets its own jitter stream drawn from the simulator's.
    pub fn start_session(&mut self) -> Result<PathSession<Xorshift64>, WalkError> {
        let field = self
            .field
            .clone()
            .ok_or_else(|| WalkError::NotReady("noise field not generated".into()))?;
        let (w, h) = self
            .canvas
            .ok_or_else(|| WalkError::NotReady("canvas size unknown".into()))?;
        let (start, target) = self
            .endpoints()
            .ok_or_else(|| WalkError::NotReady("A/B points not set".into()))?;

        self.stop();
        let rng = Xorshift64::new(self.jitter_rng.next_u64());
        let session = PathSession::new(
            field,
            start,
            target,
            w as f64,
            h as f64,
            self.config.motion,
            rng,
        )?;
        self.active = Some(session.cancel_token());
        info!(%start, %target, "path session created");
        Ok(session)
    }

    /// Cancels the most recently started session, if any.
    pub fn stop(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noise_walk_core::{MotionParams, SessionStatus};

    fn small_config() -> WalkConfig {
        WalkConfig {
            window_width: 200,
            window_height: 150,
            noise_scale: 20.0,
            resolution_scale: 0.5,
            motion: MotionParams {
                step_sleep: 0.0,
                ..MotionParams::default()
            },
        }
    }

    fn idle() -> Simulator {
        Simulator::new(
            small_config(),
            PermutationTable::from_seed(1),
            Xorshift64::new(2),
            Xorshift64::new(3),
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = WalkConfig {
            resolution_scale: 2.0,
            ..small_config()
        };
        let result = Simulator::new(
            config,
            PermutationTable::identity(),
            Xorshift64::new(1),
            Xorshift64::new(1),
        );
        assert!(matches!(result, Err(WalkError::InvalidConfig { .. })));
    }

    #[test]
    fn start_before_refresh_is_not_ready() {
        let mut sim = idle();
        assert!(!sim.is_ready());
        assert!(matches!(sim.start_session(), Err(WalkError::NotReady(_))));
        assert!(matches!(sim.new_endpoints(), Err(WalkError::NotReady(_))));
    }

    #[test]
    fn endpoints_without_field_are_not_enough() {
        let mut sim = idle();
        sim.set_endpoints(Point2D::new(1.0, 1.0), Point2D::new(5.0, 5.0))
            .unwrap();
        assert!(matches!(sim.start_session(), Err(WalkError::NotReady(_))));
    }

    #[test]
    fn refresh_builds_grid_at_resolution_scale() {
        let mut sim = idle();
        sim.refresh(200, 150).unwrap();
        let field = sim.field().unwrap();
        assert_eq!((field.width(), field.height()), (100, 75));
        assert_eq!(sim.canvas_size(), Some((200, 150)));
        assert!(sim.is_ready());
    }

    #[test]
    fn tiny_canvas_still_gets_one_cell() {
        let mut sim = idle();
        sim.apply_config(WalkConfig {
            resolution_scale: 0.01,
            ..small_config()
        })
        .unwrap();
        sim.refresh(50, 3).unwrap();
        let field = sim.field().unwrap();
        assert_eq!((field.width(), field.height()), (1, 1));
    }

    #[test]
    fn refresh_rejects_empty_canvas() {
        let mut sim = idle();
        assert!(matches!(
            sim.refresh(0, 100),
            Err(WalkError::InvalidCanvas { .. })
        ));
        assert!(!sim.is_ready());
    }

    #[test]
    fn random_endpoints_respect_padding() {
        let mut sim = idle();
        sim.refresh(200, 150).unwrap();
        for _ in 0..200 {
            sim.new_endpoints().unwrap();
            let (a, b) = sim.endpoints().unwrap();
            for p in [a, b] {
                assert!(p.x >= ENDPOINT_PADDING && p.x <= 200.0 - ENDPOINT_PADDING, "{p}");
                assert!(p.y >= ENDPOINT_PADDING && p.y <= 150.0 - ENDPOINT_PADDING, "{p}");
            }
        }
    }

    #[test]
    fn set_endpoints_rejects_non_finite() {
        let mut sim = idle();
        let result = sim.set_endpoints(Point2D::new(f64::NAN, 0.0), Point2D::default());
        assert!(matches!(result, Err(WalkError::InvalidPoint { .. })));
    }

    #[test]
    fn invalid_config_leaves_simulator_untouched() {
        let mut sim = idle();
        sim.refresh(200, 150).unwrap();
        let before = sim.endpoints();
        let bad = WalkConfig {
            noise_scale: 0.0,
            ..small_config()
        };
        assert!(sim.apply_config(bad).is_err());
        assert_eq!(sim.config(), &small_config());
        assert_eq!(sim.endpoints(), before);
    }

    #[test]
    fn apply_config_regenerates_field() {
        let mut sim = idle();
        sim.refresh(200, 150).unwrap();
        sim.apply_config(WalkConfig {
            resolution_scale: 1.0,
            ..small_config()
        })
        .unwrap();
        let field = sim.field().unwrap();
        assert_eq!((field.width(), field.height()), (200, 150));
    }

    #[test]
    fn session_walks_between_current_endpoints() {
        let mut sim = idle();
        sim.refresh(200, 150).unwrap();
        sim.set_endpoints(Point2D::new(20.0, 20.0), Point2D::new(180.0, 120.0))
            .unwrap();
        let mut session = sim.start_session().unwrap();
        let report = session.run_to_end();
        assert_eq!(report.status, SessionStatus::Completed);
        assert_eq!(report.start, Point2D::new(20.0, 20.0));
        assert_eq!(report.last_point, Point2D::new(180.0, 120.0));
    }

    #[test]
    fn starting_again_cancels_previous_session() {
        let mut sim = idle();
        sim.refresh(200, 150).unwrap();
        let first = sim.start_session().unwrap();
        let _second = sim.start_session().unwrap();
        assert!(first.cancel_token().is_cancelled());
    }

    #[test]
    fn new_endpoints_stop_running_session() {
        let mut sim = idle();
        sim.refresh(200, 150).unwrap();
        let session = sim.start_session().unwrap();
        sim.new_endpoints().unwrap();
        assert!(session.cancel_token().is_cancelled());
    }

    #[test]
    fn scenario_reproduces_field_and_endpoints() {
        let scenario = Scenario {
            config: small_config(),
            ..Scenario::new(77)
        };
        let a = Simulator::from_scenario(&scenario).unwrap();
        let b = Simulator::from_scenario(&scenario).unwrap();
        assert_eq!(a.field().unwrap().data(), b.field().unwrap().data());
        assert_eq!(a.endpoints(), b.endpoints());

        let other = Simulator::from_scenario(&Scenario {
            config: small_config(),
            ..Scenario::new(78)
        })
        .unwrap();
        assert_ne!(a.endpoints(), other.endpoints());
    }

    #[test]
    fn scenario_paths_are_reproducible() {
        let scenario = Scenario {
            config: small_config(),
            ..Scenario::new(5)
        };
        let run = || {
            let mut sim = Simulator::from_scenario(&scenario).unwrap();
            sim.start_session().unwrap().take(10_000).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn scenario_fixed_endpoints_win() {
        let scenario = Scenario {
            config: small_config(),
            ..Scenario::new(9)
        }
        .with_endpoints(Point2D::new(15.0, 15.0), Point2D::new(100.0, 90.0));
        let sim = Simulator::from_scenario(&scenario).unwrap();
        assert_eq!(
            sim.endpoints(),
            Some((Point2D::new(15.0, 15.0), Point2D::new(100.0, 90.0)))
        );
    }
}
