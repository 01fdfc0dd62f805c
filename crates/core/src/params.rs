//! Lenient extraction of typed values from loose JSON config objects.
//!
//! Each helper takes a JSON value, a key, and a default. A missing key or a
//! value of the wrong type yields the default. Range checking is not done
//! here; it happens once in [`WalkConfig::validate`](crate::config::WalkConfig::validate).

use crate::point::Point2D;
use serde_json::Value;

/// Extracts an `f64` from `params[name]`, accepting integers too.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `u32` from `params[name]`.
///
/// Negative, fractional, or out-of-range numbers fall back to `default`.
pub fn param_u32(params: &Value, name: &str, default: u32) -> u32 {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

/// Extracts a `u64` from `params[name]`.
pub fn param_u64(params: &Value, name: &str, default: u64) -> u64 {
    params.get(name).and_then(Value::as_u64).unwrap_or(default)
}

/// Extracts a point written either as `{"x": .., "y": ..}` or `[x, y]`.
///
/// Returns `None` when the key is missing or malformed.
pub fn param_point(params: &Value, name: &str) -> Option<Point2D> {
    match params.get(name)? {
        Value::Array(items) if items.len() == 2 => {
            Some(Point2D::new(items[0].as_f64()?, items[1].as_f64()?))
        }
        obj @ Value::Object(_) => Some(Point2D::new(
            obj.get("x").and_then(Value::as_f64)?,
            obj.get("y").and_then(Value::as_f64)?,
        )),
        _ => None,
    }
}
