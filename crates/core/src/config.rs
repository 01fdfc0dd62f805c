//! Typed configuration for noise generation and path stepping.
//!
//! [`WalkConfig`] replaces a loose key/value dictionary: it is built from JSON
//! with lenient defaults, then validated once with [`WalkConfig::validate`]
//! before any field is generated or session started.

use crate::error::WalkError;
use crate::params::{param_f64, param_u32};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_WINDOW_WIDTH: u32 = 1920;
const DEFAULT_WINDOW_HEIGHT: u32 = 1080;
/// Lattice cells per noise unit; larger values give smoother, wider features.
const DEFAULT_NOISE_SCALE: f64 = 100.0;
/// Fraction of canvas resolution used for the noise grid.
const DEFAULT_RESOLUTION_SCALE: f64 = 1.0;
const DEFAULT_SPEED_MIN: f64 = 30.0;
const DEFAULT_SPEED_MAX_MULTIPLIER: f64 = 1.5;
const DEFAULT_JITTER_MULTIPLIER: f64 = 20.0;
const DEFAULT_DEVIATION_DEGREES_MAX: f64 = 35.0;
/// Seconds to pause between emitted points.
const DEFAULT_STEP_SLEEP: f64 = 0.03;

const WINDOW_MIN: u32 = 100;
const WINDOW_MAX: u32 = 8000;
const NOISE_SCALE_MIN: f64 = 0.0001;
const RESOLUTION_SCALE_MIN: f64 = 0.01;
const RESOLUTION_SCALE_MAX: f64 = 1.0;
const STEP_SLEEP_MAX: f64 = 1.0;

/// Per-step motion parameters for a path session.
///
/// With noise value `nv` at the current position, a step moves
/// `speed_min + nv * speed_max_multiplier` along the bearing to the target,
/// rotated by `(nv - 0.5) * deviation_degrees_max` (in radians), plus jitter
/// of up to `nv * jitter_multiplier / 2` per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionParams {
    /// Base step length in canvas units.
    pub speed_min: f64,
    /// Extra step length at full noise.
    pub speed_max_multiplier: f64,
    /// Jitter amplitude at full noise.
    pub jitter_multiplier: f64,
    /// Maximum angular deviation from the bearing, in degrees.
    pub deviation_degrees_max: f64,
    /// Pause between steps, in seconds.
    pub step_sleep: f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            speed_min: DEFAULT_SPEED_MIN,
            speed_max_multiplier: DEFAULT_SPEED_MAX_MULTIPLIER,
            jitter_multiplier: DEFAULT_JITTER_MULTIPLIER,
            deviation_degrees_max: DEFAULT_DEVIATION_DEGREES_MAX,
            step_sleep: DEFAULT_STEP_SLEEP,
        }
    }
}

impl MotionParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            speed_min: param_f64(params, "speed_min", DEFAULT_SPEED_MIN),
            speed_max_multiplier: param_f64(
                params,
                "speed_max_multiplier",
                DEFAULT_SPEED_MAX_MULTIPLIER,
            ),
            jitter_multiplier: param_f64(params, "jitter_multiplier", DEFAULT_JITTER_MULTIPLIER),
            deviation_degrees_max: param_f64(
                params,
                "deviation_degrees_max",
                DEFAULT_DEVIATION_DEGREES_MAX,
            ),
            step_sleep: param_f64(params, "step_sleep", DEFAULT_STEP_SLEEP),
        }
    }

    /// Checks that every value is finite and non-negative.
    pub fn validate(&self) -> Result<(), WalkError> {
        non_negative("speed_min", self.speed_min)?;
        non_negative("speed_max_multiplier", self.speed_max_multiplier)?;
        non_negative("jitter_multiplier", self.jitter_multiplier)?;
        non_negative("deviation_degrees_max", self.deviation_degrees_max)?;
        non_negative("step_sleep", self.step_sleep)
    }

    /// Upper bound on the length of one step.
    ///
    /// Noise is at most 1, so speed is at most `speed_min + speed_max_multiplier`
    /// and each jitter axis is at most `jitter_multiplier / 2`.
    pub fn max_step_length(&self) -> f64 {
        let jitter = self.jitter_multiplier * 0.5;
        self.speed_min + self.speed_max_multiplier + (2.0 * jitter * jitter).sqrt()
    }
}

/// Full configuration: window size, noise field shape, and motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    pub window_width: u32,
    pub window_height: u32,
    /// Noise scale passed to field generation. Must exceed 0.0001 here even
    /// though the generator itself tolerates smaller values.
    pub noise_scale: f64,
    /// Noise grid size as a fraction of the canvas size.
    pub resolution_scale: f64,
    pub motion: MotionParams,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            noise_scale: DEFAULT_NOISE_SCALE,
            resolution_scale: DEFAULT_RESOLUTION_SCALE,
            motion: MotionParams::default(),
        }
    }
}

impl WalkConfig {
    /// Extracts a config from a flat JSON object, falling back to defaults.
    ///
    /// Motion keys (`speed_min`, ...) may appear at the top level or inside a
    /// nested `"motion"` object; the nested form wins.
    pub fn from_json(params: &Value) -> Self {
        let motion = match params.get("motion") {
            Some(nested @ Value::Object(_)) => MotionParams::from_json(nested),
            _ => MotionParams::from_json(params),
        };
        Self {
            window_width: param_u32(params, "window_width", DEFAULT_WINDOW_WIDTH),
            window_height: param_u32(params, "window_height", DEFAULT_WINDOW_HEIGHT),
            noise_scale: param_f64(params, "noise_scale", DEFAULT_NOISE_SCALE),
            resolution_scale: param_f64(params, "resolution_scale", DEFAULT_RESOLUTION_SCALE),
            motion,
        }
    }

    /// Validates every field, returning the first violation.
    ///
    /// Stricter than [`MotionParams::validate`]: `step_sleep` must also be
    /// below one second.
    pub fn validate(&self) -> Result<(), WalkError> {
        for (name, value) in [
            ("window_width", self.window_width),
            ("window_height", self.window_height),
        ] {
            if !(WINDOW_MIN..=WINDOW_MAX).contains(&value) {
                return Err(WalkError::config(
                    name,
                    format!("must be within [{WINDOW_MIN}, {WINDOW_MAX}], got {value}"),
                ));
            }
        }
        if !(self.noise_scale > NOISE_SCALE_MIN) || !self.noise_scale.is_finite() {
            return Err(WalkError::config(
                "noise_scale",
                format!("must be finite and above {NOISE_SCALE_MIN}, got {}", self.noise_scale),
            ));
        }
        if !(RESOLUTION_SCALE_MIN..=RESOLUTION_SCALE_MAX).contains(&self.resolution_scale) {
            return Err(WalkError::config(
                "resolution_scale",
                format!(
                    "must be within [{RESOLUTION_SCALE_MIN}, {RESOLUTION_SCALE_MAX}], got {}",
                    self.resolution_scale
                ),
            ));
        }
        self.motion.validate()?;
        if self.motion.step_sleep >= STEP_SLEEP_MAX {
            return Err(WalkError::config(
                "step_sleep",
                format!("must be below {STEP_SLEEP_MAX}s, got {}", self.motion.step_sleep),
            ));
        }
        Ok(())
    }

    /// Noise grid dimensions for a canvas: `max(1, trunc(side * resolution_scale))`.
    pub fn noise_grid_size(&self, canvas_width: usize, canvas_height: usize) -> (usize, usize) {
        let side = |n: usize| ((n as f64 * self.resolution_scale) as usize).max(1);
        (side(canvas_width), side(canvas_height))
    }

    /// Schema describing every parameter: type, default, range, description.
    pub fn param_schema() -> Value {
        json!({
            "window_width": {
                "type": "integer",
                "default": DEFAULT_WINDOW_WIDTH,
                "min": WINDOW_MIN,
                "max": WINDOW_MAX,
                "description": "Canvas width in pixels"
            },
            "window_height": {
                "type": "integer",
                "default": DEFAULT_WINDOW_HEIGHT,
                "min": WINDOW_MIN,
                "max": WINDOW_MAX,
                "description": "Canvas height in pixels"
            },
            "noise_scale": {
                "type": "number",
                "default": DEFAULT_NOISE_SCALE,
                "min": NOISE_SCALE_MIN,
                "description": "Pixels per noise lattice cell; larger is smoother"
            },
            "resolution_scale": {
                "type": "number",
                "default": DEFAULT_RESOLUTION_SCALE,
                "min": RESOLUTION_SCALE_MIN,
                "max": RESOLUTION_SCALE_MAX,
                "description": "Noise grid size as a fraction of the canvas size"
            },
            "speed_min": {
                "type": "number",
                "default": DEFAULT_SPEED_MIN,
                "min": 0.0,
                "description": "Base step length in pixels"
            },
            "speed_max_multiplier": {
                "type": "number",
                "default": DEFAULT_SPEED_MAX_MULTIPLIER,
                "min": 0.0,
                "description": "Extra step length at full noise"
            },
            "jitter_multiplier": {
                "type": "number",
                "default": DEFAULT_JITTER_MULTIPLIER,
                "min": 0.0,
                "description": "Random jitter amplitude at full noise"
            },
            "deviation_degrees_max": {
                "type": "number",
                "default": DEFAULT_DEVIATION_DEGREES_MAX,
                "min": 0.0,
                "description": "Maximum angular deviation from the bearing, in degrees"
            },
            "step_sleep": {
                "type": "number",
                "default": DEFAULT_STEP_SLEEP,
                "min": 0.0,
                "max": STEP_SLEEP_MAX,
                "description": "Pause between steps, in seconds"
            }
        })
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), WalkError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(WalkError::config(
            name,
            format!("must be finite and non-negative, got {value}"),
        ))
    }
}
