//! Robot pose and navigation state.
//!
//! Both structs are owned by the outer control loop and copied into each
//! tick's `TickData`.  Behaviors read them, and goal-setting behaviors
//! (GoToGoal, RouteFollowing) write the goal fields to hand navigation intent
//! to GoToAngle; the loop copies the state back out after the tick.

use crate::GeoPoint;
use crate::geo::{angle_diff, normalize_angle};

/// Dead-reckoned pose in the local frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RobotPose {
    /// Metres.
    pub x: f64,
    /// Metres.
    pub y: f64,
    /// Radians, CCW from local +x.
    pub heading: f64,
    pub geo: Option<GeoPoint>,
}

/// Navigation intent and last commanded motion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RobotState {
    /// Absolute goal heading in the local frame, radians.
    pub goal_bearing: Option<f64>,
    /// Goal heading relative to the current pose heading, radians, +left.
    pub goal_bearing_rel: Option<f64>,
    /// Metres to the goal, when known.
    pub goal_distance: Option<f64>,
    /// Goal point in the local frame.
    pub goal_xy: Option<(f64, f64)>,
    /// Goal position for GPS navigation.
    pub goal_geo: Option<GeoPoint>,
    /// Velocity commanded on the previous tick, m/s.
    pub velocity: f64,
    /// Turn rate commanded on the previous tick, rad/s.
    pub omega: f64,
}

impl RobotState {
    /// Record a new absolute goal heading and refresh the relative one.
    pub fn set_goal_bearing(&mut self, bearing: f64, heading: f64) {
        let bearing = normalize_angle(bearing);
        self.goal_bearing = Some(bearing);
        self.goal_bearing_rel = Some(angle_diff(bearing, heading));
    }

    /// Drop every goal field.
    pub fn clear_goal(&mut self) {
        self.goal_bearing = None;
        self.goal_bearing_rel = None;
        self.goal_distance = None;
        self.goal_xy = None;
        self.goal_geo = None;
    }

    /// `true` when the last commanded motion is not ~zero.
    #[inline]
    pub fn is_moving(&self, epsilon: f64) -> bool {
        self.velocity.abs() > epsilon || self.omega.abs() > epsilon
    }
}
