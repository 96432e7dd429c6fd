//! Sensor snapshot consumed by the behaviors.
//!
//! Every reading is optional: a missing driver, an out-of-range value or a
//! stale camera fix all collapse to `None` through the accessor methods, and
//! behaviors treat `None` as "nothing to react to".

use crate::{GeoPoint, Stamp};

/// One range-finder reading with the sensor's declared valid window.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RangeReading {
    /// Measured distance, metres.
    pub meters: f64,
    /// Smallest distance the sensor reports reliably.
    pub min: f64,
    /// Largest distance the sensor reports reliably.
    pub max: f64,
}

impl RangeReading {
    pub fn new(meters: f64, min: f64, max: f64) -> Self {
        Self { meters, min, max }
    }

    /// The distance if it is finite and within `[min, max]`.
    #[inline]
    pub fn valid(&self) -> Option<f64> {
        (self.meters.is_finite() && self.meters >= self.min && self.meters <= self.max)
            .then_some(self.meters)
    }
}

/// Which range sensor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RangeSide {
    Front,
    Left,
    Right,
    Rear,
}

/// Named range readings around the robot body.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ranges {
    pub front: Option<RangeReading>,
    pub left:  Option<RangeReading>,
    pub right: Option<RangeReading>,
    pub rear:  Option<RangeReading>,
}

impl Ranges {
    /// Valid distance on `side`, if any.
    #[inline]
    pub fn get(&self, side: RangeSide) -> Option<f64> {
        let reading = match side {
            RangeSide::Front => self.front,
            RangeSide::Left  => self.left,
            RangeSide::Right => self.right,
            RangeSide::Rear  => self.rear,
        };
        reading.and_then(|r| r.valid())
    }

    /// `true` when `side` reports a valid distance strictly inside `threshold`.
    #[inline]
    pub fn within(&self, side: RangeSide, threshold: f64) -> bool {
        self.get(side).is_some_and(|d| d < threshold)
    }
}

/// A GPS fix.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GpsFix {
    pub position: GeoPoint,
    pub altitude_m: f64,
    pub stamp: Stamp,
}

/// Targeting-camera observation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TargetReading {
    /// Bearing to the target relative to the robot nose, radians, +left.
    pub bearing: f64,
    /// Inclination of the target above the horizon, radians.  Grows as the
    /// robot closes in on a ground-level target.
    pub inclination: f64,
    /// When the camera produced this observation.
    pub stamp: Stamp,
}

/// Battery voltage sample.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BatteryReading {
    pub volts: f64,
    pub stamp: Stamp,
}

/// Everything the sensor collaborators reported for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SensorSnapshot {
    pub ranges: Ranges,
    /// Monotonic left wheel encoder count.
    pub left_ticks: Option<i64>,
    /// Monotonic right wheel encoder count.
    pub right_ticks: Option<i64>,
    /// Compass heading, degrees clockwise from north.
    pub compass_deg: Option<f64>,
    pub gps: Option<GpsFix>,
    pub target: Option<TargetReading>,
    pub battery: Option<BatteryReading>,
}

impl SensorSnapshot {
    /// Both wheel counters, or `None` if either is missing.
    #[inline]
    pub fn wheel_ticks(&self) -> Option<(i64, i64)> {
        Some((self.left_ticks?, self.right_ticks?))
    }

    /// The camera target if it was observed no more than `max_age_secs`
    /// before `now`.
    pub fn fresh_target(&self, now: Stamp, max_age_secs: f64) -> Option<TargetReading> {
        self.target.filter(|t| t.stamp <= now && now.secs_since(t.stamp) <= max_age_secs)
    }
}
