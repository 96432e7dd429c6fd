//! Mode composer: builds a fixed behavior set and installs it.
//!
//! Registration order matters only for last-writer-wins among behaviors
//! that don't grab: the lowest layer goes first so that higher layers can
//! read its command from `TickData::command` and refine or replace it.

use std::fmt;

use sb_behavior::{EnablingRequest, EscapeHint, Task};
use sb_control::{
    AvoidObstacles, BehaviorParams, CameraChase, Cruise, Escape, FollowWall, GoToAngle,
    GoToGoal, JoystickTeleop, RouteFollowing, Stop, StuckDetector, Waypoint,
};
use sb_core::{BehaviorRng, DriveGeometry, TickData};
use tracing::{info, warn};

use crate::{DispatchResult, Dispatcher, RobotConfig};

/// A named behavior set.
#[derive(Clone, Debug, PartialEq)]
pub enum Mode {
    /// Cruise, GoToAngle, AvoidObstacles, FollowWall, Stop, Escape, StuckDetector.
    Wander,
    /// JoystickTeleop with Stop and Escape as a safety net.
    Teleop,
    /// A single ballistic escape for the given request; the set empties when
    /// the maneuver completes.
    Escape(EnablingRequest),
    /// RouteFollowing, GoToAngle, AvoidObstacles, Stop, Escape.
    Route(Vec<Waypoint>),
    /// CameraChase, AvoidObstacles, Stop, Escape.
    Chase,
    /// GoToGoal toward a local-frame point, with GoToAngle, AvoidObstacles,
    /// Stop, Escape.
    GoTo { x: f64, y: f64 },
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Wander          => f.write_str("wander"),
            Mode::Teleop          => f.write_str("teleop"),
            Mode::Escape(request) => write!(f, "escape({request})"),
            Mode::Route(points)   => write!(f, "route({} waypoints)", points.len()),
            Mode::Chase           => f.write_str("chase"),
            Mode::GoTo { x, y }   => write!(f, "goto({x:.2}, {y:.2})"),
        }
    }
}

/// Builds behavior sets from one validated configuration.
#[derive(Clone, Debug)]
pub struct Composer {
    params:      BehaviorParams,
    geometry:    DriveGeometry,
    seed:        u64,
    drain_limit: usize,
}

impl Composer {
    pub fn new(config: &RobotConfig) -> DispatchResult<Self> {
        config.validate()?;
        Ok(Self {
            params:      config.behaviors.clone(),
            geometry:    config.geometry,
            seed:        config.seed,
            drain_limit: config.drain_limit,
        })
    }

    pub fn drain_limit(&self) -> usize {
        self.drain_limit
    }

    /// The ordered task list for `mode`.  Each behavior that draws random
    /// numbers is seeded from the global seed and its slot in the list.
    pub fn build(&self, mode: &Mode) -> Vec<Task> {
        let p = &self.params;
        let mut tasks = Vec::new();
        match mode {
            Mode::Wander => {
                tasks.push(Task::new(Cruise::new(p.cruise.clone())));
                tasks.push(Task::new(GoToAngle::new(p.go_to_angle.clone())));
                tasks.push(Task::new(AvoidObstacles::new(p.avoid.clone())));
                tasks.push(Task::new(FollowWall::new(p.follow_wall.clone())));
                tasks.push(Task::new(Stop::new(p.stop.clone())));
                tasks.push(Task::new(self.escape(tasks.len())));
                tasks.push(Task::new(StuckDetector::new(p.stuck.clone())));
            }
            Mode::Teleop => {
                tasks.push(Task::new(JoystickTeleop::new(p.teleop.clone(), self.geometry)));
                tasks.push(Task::new(Stop::new(p.stop.clone())));
                tasks.push(Task::new(self.escape(tasks.len())));
            }
            Mode::Escape(_) => {
                tasks.push(Task::new(self.escape(tasks.len()).one_shot()));
            }
            Mode::Route(waypoints) => {
                tasks.push(Task::new(RouteFollowing::new(p.route.clone(), waypoints.clone())));
                tasks.push(Task::new(GoToAngle::new(p.go_to_angle.clone())));
                tasks.push(Task::new(AvoidObstacles::new(p.avoid.clone())));
                tasks.push(Task::new(Stop::new(p.stop.clone())));
                tasks.push(Task::new(self.escape(tasks.len())));
            }
            Mode::Chase => {
                tasks.push(Task::new(CameraChase::new(p.chase.clone())));
                tasks.push(Task::new(AvoidObstacles::new(p.avoid.clone())));
                tasks.push(Task::new(Stop::new(p.stop.clone())));
                tasks.push(Task::new(self.escape(tasks.len())));
            }
            Mode::GoTo { .. } => {
                tasks.push(Task::new(GoToGoal::new(p.go_to_goal.clone())));
                tasks.push(Task::new(GoToAngle::new(p.go_to_angle.clone())));
                tasks.push(Task::new(AvoidObstacles::new(p.avoid.clone())));
                tasks.push(Task::new(Stop::new(p.stop.clone())));
                tasks.push(Task::new(self.escape(tasks.len())));
            }
        }
        tasks
    }

    fn escape(&self, slot: usize) -> Escape {
        Escape::new(self.params.escape.clone(), BehaviorRng::new(self.seed, slot as u32))
    }

    /// Drain the current set, reset arbitration state, and install `mode`.
    ///
    /// `data` is the tick record used while draining; its goal fields are
    /// reset to what `mode` needs.  A drain that runs out of iterations is
    /// logged and its stragglers are dropped; installation still proceeds.
    pub fn install(
        &self,
        dispatcher: &mut Dispatcher,
        mode:       &Mode,
        data:       &mut TickData,
    ) -> DispatchResult<()> {
        dispatcher.close();
        if let Err(err) = dispatcher.drain(data, self.drain_limit) {
            warn!(%err, "previous mode did not drain cleanly");
        }

        dispatcher.coordinator_mut().reset();
        data.command = None;
        data.state.clear_goal();

        match mode {
            Mode::Escape(request) => {
                let request = if request.is_escape() {
                    request.clone()
                } else {
                    warn!(%request, "not an escape request, using Escape");
                    EnablingRequest::Escape(EscapeHint::Any)
                };
                dispatcher.coordinator_mut().publish(request);
            }
            Mode::GoTo { x, y } => data.state.goal_xy = Some((*x, *y)),
            _ => {}
        }

        for task in self.build(mode) {
            dispatcher.add(task)?;
        }
        info!(%mode, behaviors = ?dispatcher.names(), "mode installed");
        Ok(())
    }
}
