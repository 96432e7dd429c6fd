//! Drive command and drive geometry.

use serde::Deserialize;

/// Physical drive command: the single output of one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DriveCommand {
    /// m/s, +forward.
    pub velocity: f64,
    /// rad/s, +left.
    pub omega: f64,
}

impl DriveCommand {
    /// The all-zero command.
    pub const STOP: DriveCommand = DriveCommand { velocity: 0.0, omega: 0.0 };

    #[inline]
    pub fn new(velocity: f64, omega: f64) -> Self {
        Self { velocity, omega }
    }
}

/// Calibration between abstract `[-100, 100]` speed/turn units and physical
/// m/s and rad/s.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DriveGeometry {
    /// m/s per speed unit.  Default 0.005 (100 units = 0.5 m/s).
    pub speed_factor: f64,
    /// rad/s per turn unit.  Default 0.02 (100 units = 2 rad/s).
    pub turn_factor: f64,
}

impl Default for DriveGeometry {
    fn default() -> Self {
        Self { speed_factor: 0.005, turn_factor: 0.02 }
    }
}

impl DriveGeometry {
    /// Abstract limit for both axes.
    pub const UNIT_LIMIT: f64 = 100.0;

    /// Convert abstract speed/turn values (clamped to `[-100, 100]`) into a
    /// physical command.
    pub fn command(&self, speed: f64, turn: f64) -> DriveCommand {
        DriveCommand {
            velocity: clamp_unit(speed) * self.speed_factor,
            omega:    clamp_unit(turn) * self.turn_factor,
        }
    }

    /// Physical velocity for an abstract speed value.
    #[inline]
    pub fn velocity(&self, speed: f64) -> f64 {
        clamp_unit(speed) * self.speed_factor
    }

    /// Physical turn rate for an abstract turn value.
    #[inline]
    pub fn omega(&self, turn: f64) -> f64 {
        clamp_unit(turn) * self.turn_factor
    }

    /// Convert a physical command back into abstract units.  A zero factor
    /// maps to zero rather than dividing by it.
    pub fn to_units(&self, cmd: DriveCommand) -> (f64, f64) {
        let speed = if self.speed_factor.abs() > f64::EPSILON {
            cmd.velocity / self.speed_factor
        } else {
            0.0
        };
        let turn = if self.turn_factor.abs() > f64::EPSILON {
            cmd.omega / self.turn_factor
        } else {
            0.0
        };
        (clamp_unit(speed), clamp_unit(turn))
    }
}

#[inline]
fn clamp_unit(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(-DriveGeometry::UNIT_LIMIT, DriveGeometry::UNIT_LIMIT)
    } else {
        0.0
    }
}
