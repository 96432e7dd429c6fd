//! Numeric guards shared by the control laws.

use sb_behavior::{BehaviorError, BehaviorResult};

/// Commanded motion below this magnitude counts as "not moving".
pub const MOTION_EPSILON: f64 = 1e-3;

/// A distance threshold proportional to speed, clamped to `[min, max]`.
///
/// Non-finite inputs fall back to `min`, so a missing or corrupt velocity can
/// only make the threshold tighter, never unbounded.
#[inline]
pub fn scaled_distance(gain: f64, velocity: f64, min: f64, max: f64) -> f64 {
    let raw = gain * velocity.abs();
    if raw.is_finite() { raw.clamp(min, max) } else { min }
}

/// Clamp `value` to `[-limit, limit]`; non-finite values become zero.
#[inline]
pub fn clamp_abs(value: f64, limit: f64) -> f64 {
    if value.is_finite() { value.clamp(-limit.abs(), limit.abs()) } else { 0.0 }
}

/// `+1.0`, `-1.0`, or `0.0` for exactly zero.
#[inline]
pub fn signum0(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

pub(crate) fn require_positive(what: &str, value: f64) -> BehaviorResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BehaviorError::Config(format!("{what} must be positive, got {value}")))
    }
}

pub(crate) fn require_ordered(what: &str, min: f64, max: f64) -> BehaviorResult<()> {
    if min.is_finite() && max.is_finite() && 0.0 <= min && min <= max {
        Ok(())
    } else {
        Err(BehaviorError::Config(format!("{what}: need 0 <= min <= max, got [{min}, {max}]")))
    }
}
