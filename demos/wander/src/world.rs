//! A kinematic 2D arena: a walled square with box obstacles and a camera
//! beacon.  Good enough to exercise every sensor path the behaviors read.

use std::f64::consts::{FRAC_PI_2, PI};

use sb_core::geo::{angle_diff, normalize_angle};
use sb_core::{
    DriveCommand, RangeReading, RangeSide, Ranges, RobotPose, SensorSnapshot, Stamp,
    TargetReading,
};

/// Robot body radius, metres.
const BODY_RADIUS: f64 = 0.15;
const WHEEL_BASE: f64 = 0.30;
const TICKS_PER_METRE: f64 = 1_000.0;
const RANGE_MIN: f64 = 0.02;
const RANGE_MAX: f64 = 2.0;
/// Half-angle of the camera's field of view, radians.
const CAMERA_HALF_FOV: f64 = 0.6;
const CAMERA_RANGE: f64 = 4.0;
const CAMERA_HEIGHT: f64 = 0.3;

/// Axis-aligned box.
#[derive(Copy, Clone, Debug)]
struct Aabb {
    min: (f64, f64),
    max: (f64, f64),
}

impl Aabb {
    fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { min: (x0.min(x1), y0.min(y1)), max: (x0.max(x1), y0.max(y1)) }
    }

    /// Distance along the unit ray `(dx, dy)` from `(ox, oy)` to the box.
    fn ray(&self, (ox, oy): (f64, f64), (dx, dy): (f64, f64)) -> Option<f64> {
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;
        for (o, d, lo, hi) in [(ox, dx, self.min.0, self.max.0), (oy, dy, self.min.1, self.max.1)] {
            if d.abs() < 1e-12 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let (a, b) = ((lo - o) / d, (hi - o) / d);
            t_min = t_min.max(a.min(b));
            t_max = t_max.min(a.max(b));
        }
        (t_max >= t_min.max(0.0)).then_some(t_min.max(0.0))
    }

    fn overlaps_circle(&self, (cx, cy): (f64, f64), radius: f64) -> bool {
        let nx = cx.clamp(self.min.0, self.max.0);
        let ny = cy.clamp(self.min.1, self.max.1);
        (cx - nx).hypot(cy - ny) < radius
    }
}

pub struct World {
    pose:      RobotPose,
    obstacles: Vec<Aabb>,
    beacon:    (f64, f64),
    /// Fractional wheel travel in ticks.
    wheels:    (f64, f64),
    travelled: f64,
    bumps:     u32,
}

impl World {
    /// A 6 m × 6 m walled arena with two boxes; the beacon sits in a corner.
    pub fn arena() -> Self {
        let wall = 0.1;
        let obstacles = vec![
            Aabb::new(-3.0 - wall, -3.0, -3.0, 3.0),
            Aabb::new(3.0, -3.0, 3.0 + wall, 3.0),
            Aabb::new(-3.0, -3.0 - wall, 3.0, -3.0),
            Aabb::new(-3.0, 3.0, 3.0, 3.0 + wall),
            Aabb::new(1.0, -0.5, 1.6, 0.5),
            Aabb::new(-2.0, 1.2, -1.2, 1.6),
        ];
        Self {
            pose: RobotPose::default(),
            obstacles,
            beacon: (2.4, 2.4),
            wheels: (0.0, 0.0),
            travelled: 0.0,
            bumps: 0,
        }
    }

    pub fn pose(&self) -> RobotPose {
        self.pose
    }

    pub fn travelled(&self) -> f64 {
        self.travelled
    }

    /// Ticks in which the robot tried to move into an obstacle.
    pub fn bumps(&self) -> u32 {
        self.bumps
    }

    pub fn reset_odometry(&mut self) {
        self.wheels = (0.0, 0.0);
    }

    fn range(&self, side: RangeSide) -> Option<RangeReading> {
        let offset = match side {
            RangeSide::Front => 0.0,
            RangeSide::Left  => FRAC_PI_2,
            RangeSide::Right => -FRAC_PI_2,
            RangeSide::Rear  => PI,
        };
        let angle = self.pose.heading + offset;
        let dir = (angle.cos(), angle.sin());
        let hit = self
            .obstacles
            .iter()
            .filter_map(|b| b.ray((self.pose.x, self.pose.y), dir))
            .fold(f64::INFINITY, f64::min);
        let meters = hit - BODY_RADIUS;
        (meters <= RANGE_MAX).then(|| RangeReading::new(meters.max(0.0), RANGE_MIN, RANGE_MAX))
    }

    fn target(&self, now: Stamp) -> Option<TargetReading> {
        let (dx, dy) = (self.beacon.0 - self.pose.x, self.beacon.1 - self.pose.y);
        let distance = dx.hypot(dy);
        let bearing = angle_diff(dy.atan2(dx), self.pose.heading);
        (bearing.abs() <= CAMERA_HALF_FOV && distance <= CAMERA_RANGE).then(|| TargetReading {
            bearing,
            inclination: CAMERA_HEIGHT.atan2(distance),
            stamp: now,
        })
    }

    pub fn sense(&self, now: Stamp) -> SensorSnapshot {
        SensorSnapshot {
            ranges: Ranges {
                front: self.range(RangeSide::Front),
                left:  self.range(RangeSide::Left),
                right: self.range(RangeSide::Right),
                rear:  self.range(RangeSide::Rear),
            },
            left_ticks: Some(self.wheels.0.round() as i64),
            right_ticks: Some(self.wheels.1.round() as i64),
            compass_deg: Some((90.0 - self.pose.heading.to_degrees()).rem_euclid(360.0)),
            target: self.target(now),
            ..Default::default()
        }
    }

    /// Integrate `command` for `dt` seconds.  A blocked translation leaves
    /// the robot (and its wheels) where they were.
    pub fn step(&mut self, command: DriveCommand, dt: f64) {
        let heading = normalize_angle(self.pose.heading + command.omega * dt);
        let turn = command.omega * WHEEL_BASE * 0.5 * dt * TICKS_PER_METRE;
        self.wheels.0 -= turn;
        self.wheels.1 += turn;
        self.pose.heading = heading;

        let step = command.velocity * dt;
        let next = (self.pose.x + step * heading.cos(), self.pose.y + step * heading.sin());
        if self.obstacles.iter().any(|b| b.overlaps_circle(next, BODY_RADIUS)) {
            self.bumps += 1;
            return;
        }
        self.pose.x = next.0;
        self.pose.y = next.1;
        self.travelled += step.abs();
        self.wheels.0 += step * TICKS_PER_METRE;
        self.wheels.1 += step * TICKS_PER_METRE;
    }
}
