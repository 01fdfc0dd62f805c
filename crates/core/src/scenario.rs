//! Reproducible description of one noise-walk run.
//!
//! A [`Scenario`] captures everything needed to recreate a traversal: canvas
//! size, PRNG seed, configuration, and (optionally) fixed endpoints. The same
//! scenario always yields the same permutation table, the same noise field,
//! the same endpoints and the same jitter.

use crate::config::WalkConfig;
use crate::error::WalkError;
use crate::params::{param_point, param_u64};
use crate::permutation::PermutationTable;
use crate::point::Point2D;
use crate::prng::Xorshift64;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stream ids mixed into the seed so each consumer gets an independent sequence.
const STREAM_PERMUTATION: u64 = 1;
const STREAM_ENDPOINTS: u64 = 2;
const STREAM_JITTER: u64 = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub seed: u64,
    pub config: WalkConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Point2D>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Point2D>,
}

impl Scenario {
    /// Scenario with the given seed and default config, random endpoints.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            config: WalkConfig::default(),
            start: None,
            target: None,
        }
    }

    /// Builds a scenario from loose JSON: `seed`, `start`, `target`, plus
    /// any [`WalkConfig`] keys at the top level.
    pub fn from_json(params: &Value, default_seed: u64) -> Self {
        Self {
            seed: param_u64(params, "seed", default_seed),
            config: WalkConfig::from_json(params),
            start: param_point(params, "start"),
            target: param_point(params, "target"),
        }
    }

    /// Sets both endpoints.
    pub fn with_endpoints(mut self, start: Point2D, target: Point2D) -> Self {
        self.start = Some(start);
        self.target = Some(target);
        self
    }

    /// Validates the config and any fixed endpoints.
    pub fn validate(&self) -> Result<(), WalkError> {
        self.config.validate()?;
        for p in self.start.iter().chain(self.target.iter()) {
            if !p.is_finite() {
                return Err(WalkError::InvalidPoint { x: p.x, y: p.y });
            }
        }
        Ok(())
    }

    /// Canvas size in pixels, taken from the configured window size.
    pub fn canvas_size(&self) -> (usize, usize) {
        (
            self.config.window_width as usize,
            self.config.window_height as usize,
        )
    }

    /// The permutation table this scenario generates noise with.
    pub fn permutation(&self) -> PermutationTable {
        PermutationTable::shuffled(&mut Xorshift64::derive(self.seed, STREAM_PERMUTATION))
    }

    /// PRNG for drawing random endpoints.
    pub fn endpoint_rng(&self) -> Xorshift64 {
        Xorshift64::derive(self.seed, STREAM_ENDPOINTS)
    }

    /// PRNG for per-step jitter.
    pub fn jitter_rng(&self) -> Xorshift64 {
        Xorshift64::derive(self.seed, STREAM_JITTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::RandomSource;
    use serde_json::json;

    #[test]
    fn new_uses_default_config_and_no_endpoints() {
        let s = Scenario::new(42);
        assert_eq!(s.seed, 42);
        assert_eq!(s.config, WalkConfig::default());
        assert!(s.start.is_none() && s.target.is_none());
    }

    #[test]
    fn json_round_trip_with_endpoints() {
        let s = Scenario::new(7).with_endpoints(Point2D::new(1.0, 2.0), Point2D::new(30.0, 40.0));
        let text = serde_json::to_string_pretty(&s).unwrap();
        let back: Scenario = serde_json::from_str(&text).unwrap();
        assert_eq!(s, back);
    }

    #[test]
    fn json_omits_missing_endpoints() {
        let v = serde_json::to_value(Scenario::new(1)).unwrap();
        assert!(v.get("start").is_none());
        assert!(v.get("seed").is_some());
        assert!(v.get("config").is_some());
    }

    #[test]
    fn from_json_reads_seed_endpoints_and_config() {
        let s = Scenario::from_json(
            &json!({
                "seed": 99,
                "start": [10, 10],
                "target": {"x": 500, "y": 300},
                "window_width": 640,
                "speed_min": 5,
            }),
            1,
        );
        assert_eq!(s.seed, 99);
        assert_eq!(s.start, Some(Point2D::new(10.0, 10.0)));
        assert_eq!(s.target, Some(Point2D::new(500.0, 300.0)));
        assert_eq!(s.config.window_width, 640);
        assert_eq!(s.config.motion.speed_min, 5.0);
    }

    #[test]
    fn from_json_falls_back_to_default_seed() {
        assert_eq!(Scenario::from_json(&json!({}), 1234).seed, 1234);
    }

    #[test]
    fn validate_rejects_non_finite_endpoint() {
        let s = Scenario::new(1).with_endpoints(Point2D::new(f64::NAN, 0.0), Point2D::default());
        assert!(matches!(s.validate(), Err(WalkError::InvalidPoint { .. })));
    }

    #[test]
    fn validate_propagates_config_errors() {
        let mut s = Scenario::new(1);
        s.config.resolution_scale = 2.0;
        assert!(matches!(s.validate(), Err(WalkError::InvalidConfig { .. })));
    }

    #[test]
    fn canvas_size_follows_window() {
        let mut s = Scenario::new(1);
        s.config.window_width = 320;
        s.config.window_height = 200;
        assert_eq!(s.canvas_size(), (320, 200));
    }

    #[test]
    fn permutation_is_reproducible_per_seed() {
        assert_eq!(Scenario::new(5).permutation(), Scenario::new(5).permutation());
        assert_ne!(Scenario::new(5).permutation(), Scenario::new(6).permutation());
    }

    #[test]
    fn rng_streams_are_independent() {
        let s = Scenario::new(5);
        let mut a = s.endpoint_rng();
        let mut b = s.jitter_rng();
        assert_ne!(a.next_u64(), b.next_u64());
    }
}
