//! RouteFollowing: walk a list of waypoints.
//!
//! The behavior publishes the current waypoint as the robot's goal (bearing
//! and distance) so that GoToAngle steers toward it.  When the heading error
//! is large it takes the grab and pivots in place first, so the continuous
//! layers don't drive off in the wrong direction; it lets go once aligned or
//! after `turn_timeout_secs`.  Waypoints that take longer than
//! `waypoint_timeout_secs` are skipped.
//!
//! Loading waypoints from files is the caller's business; this module only
//! consumes them.

use serde::Deserialize;
use tracing::warn;

use sb_behavior::{Behavior, BehaviorContext, BehaviorResult, Coordinator, Output};
use sb_core::geo::{angle_diff, compass_to_heading, local_bearing};
use sb_core::{DriveCommand, GeoPoint, Stamp, TickData};

use crate::limits::{require_positive, signum0};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouteParams {
    /// Metres; a waypoint counts as reached inside this radius.
    pub arrival_radius: f64,
    /// Radians of heading error that trigger a pivot.
    pub turn_threshold: f64,
    /// Radians of heading error at which a pivot ends.
    pub aligned_tolerance: f64,
    /// rad/s during the pivot.
    pub pivot_omega: f64,
    pub turn_timeout_secs: f64,
    pub waypoint_timeout_secs: f64,
}

impl Default for RouteParams {
    fn default() -> Self {
        Self {
            arrival_radius:        0.5,
            turn_threshold:        0.6,
            aligned_tolerance:     0.15,
            pivot_omega:           0.8,
            turn_timeout_secs:     4.0,
            waypoint_timeout_secs: 60.0,
        }
    }
}

impl RouteParams {
    pub fn validate(&self) -> BehaviorResult<()> {
        require_positive("route.arrival_radius", self.arrival_radius)?;
        require_positive("route.turn_threshold", self.turn_threshold)?;
        require_positive("route.aligned_tolerance", self.aligned_tolerance)?;
        require_positive("route.pivot_omega", self.pivot_omega)?;
        require_positive("route.turn_timeout_secs", self.turn_timeout_secs)?;
        require_positive("route.waypoint_timeout_secs", self.waypoint_timeout_secs)
    }
}

/// One stop on a route.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Waypoint {
    /// Local-frame point, metres.
    Local { x: f64, y: f64 },
    /// GPS position.
    Geo(GeoPoint),
}

pub struct RouteFollowing {
    params:           RouteParams,
    waypoints:        Vec<Waypoint>,
    index:            usize,
    waypoint_started: Stamp,
    turning_since:    Option<Stamp>,
}

impl RouteFollowing {
    pub fn new(params: RouteParams, waypoints: Vec<Waypoint>) -> Self {
        Self {
            params,
            waypoints,
            index:            0,
            waypoint_started: Stamp::ZERO,
            turning_since:    None,
        }
    }

    /// Index of the waypoint being approached.
    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.waypoints.len()
    }

    /// Absolute bearing and distance to `waypoint`, if the robot's position
    /// in the matching frame is known.
    fn locate(data: &TickData, waypoint: Waypoint) -> Option<(f64, f64)> {
        match waypoint {
            Waypoint::Local { x, y } => {
                Some(local_bearing(data.pose.x, data.pose.y, x, y))
            }
            Waypoint::Geo(target) => {
                let here = data.pose.geo.or(data.sensors.gps.map(|fix| fix.position))?;
                Some((compass_to_heading(here.bearing_deg(target)), here.distance_m(target)))
            }
        }
    }

    /// Abandon an in-place pivot and hand the wheels back.
    fn end_turn(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.turning_since = None;
        ctx.clear_grab_if_mine();
    }

    fn advance(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.index += 1;
        self.waypoint_started = ctx.now();
        self.end_turn(ctx);
        if self.is_finished() {
            ctx.data.state.clear_goal();
            ctx.announce("route complete");
        }
    }
}

impl Behavior for RouteFollowing {
    fn kind(&self) -> &'static str {
        "RouteFollowing"
    }

    fn should_activate(&self, _: &TickData, _: &Coordinator) -> bool {
        !self.is_finished()
    }

    fn should_deactivate(&self, _: &TickData, _: &Coordinator) -> bool {
        self.is_finished()
    }

    fn on_activate(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.waypoint_started = ctx.now();
        self.turning_since = None;
        ctx.announce(&format!("following route of {} waypoints", self.waypoints.len()));
    }

    fn step(&mut self, ctx: &mut BehaviorContext<'_>) -> Output {
        let Some(&waypoint) = self.waypoints.get(self.index) else {
            return Output::Pass;
        };
        let now = ctx.now();
        let p = &self.params;

        if now.has_elapsed(self.waypoint_started, p.waypoint_timeout_secs) {
            warn!(index = self.index, "waypoint timed out, skipping");
            ctx.announce(&format!("waypoint {} skipped", self.index));
            self.advance(ctx);
            return Output::Signal;
        }

        let Some((bearing, distance)) = Self::locate(ctx.data, waypoint) else {
            self.end_turn(ctx);
            return Output::Pass;
        };

        if distance <= p.arrival_radius {
            ctx.announce(&format!("waypoint {} reached", self.index));
            self.advance(ctx);
            return Output::Drive(DriveCommand::STOP);
        }

        let heading = ctx.data.pose.heading;
        let state = &mut ctx.data.state;
        state.set_goal_bearing(bearing, heading);
        state.goal_distance = Some(distance);
        match waypoint {
            Waypoint::Local { x, y } => state.goal_xy = Some((x, y)),
            Waypoint::Geo(geo)       => state.goal_geo = Some(geo),
        }

        let error = angle_diff(bearing, heading);
        let pivot = DriveCommand::new(0.0, signum0(error) * p.pivot_omega);

        if let Some(since) = self.turning_since {
            let aligned = error.abs() <= p.aligned_tolerance;
            // Lost the grab to a preemption or the stale-grab sweep: start over.
            if aligned || now.has_elapsed(since, p.turn_timeout_secs) || !ctx.try_grab() {
                self.end_turn(ctx);
                return Output::Signal;
            }
            return Output::Drive(pivot);
        }

        if error.abs() > p.turn_threshold && ctx.try_grab() {
            self.turning_since = Some(now);
            return Output::Drive(pivot);
        }
        Output::Signal
    }

    fn on_deactivate(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.end_turn(ctx);
    }
}
