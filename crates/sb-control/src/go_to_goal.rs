//! GoToGoal: turn a local-frame goal point into a goal bearing and distance.
//!
//! GoToGoal does not steer by itself: each tick it recomputes bearing and
//! distance from the current pose and writes them into the robot state, where
//! GoToAngle (registered after it) picks them up.  On arrival it clears the
//! goal and commands a stop.

use serde::Deserialize;

use sb_behavior::{Behavior, BehaviorContext, BehaviorResult, Coordinator, Output};
use sb_core::geo::local_bearing;
use sb_core::{DriveCommand, TickData};

use crate::limits::require_positive;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GoToGoalParams {
    /// Metres; the goal counts as reached inside this radius.
    pub arrival_radius: f64,
}

impl Default for GoToGoalParams {
    fn default() -> Self {
        Self { arrival_radius: 0.3 }
    }
}

impl GoToGoalParams {
    pub fn validate(&self) -> BehaviorResult<()> {
        require_positive("go_to_goal.arrival_radius", self.arrival_radius)
    }
}

pub struct GoToGoal {
    params:  GoToGoalParams,
    arrived: bool,
}

impl GoToGoal {
    pub fn new(params: GoToGoalParams) -> Self {
        Self { params, arrived: false }
    }
}

impl Behavior for GoToGoal {
    fn kind(&self) -> &'static str {
        "GoToGoal"
    }

    fn should_activate(&self, data: &TickData, _: &Coordinator) -> bool {
        data.state.goal_xy.is_some()
    }

    fn should_deactivate(&self, data: &TickData, _: &Coordinator) -> bool {
        self.arrived || data.state.goal_xy.is_none()
    }

    fn on_activate(&mut self, _ctx: &mut BehaviorContext<'_>) {
        self.arrived = false;
    }

    fn step(&mut self, ctx: &mut BehaviorContext<'_>) -> Output {
        let Some((gx, gy)) = ctx.data.state.goal_xy else {
            return Output::Pass;
        };
        let pose = ctx.data.pose;
        let (bearing, distance) = local_bearing(pose.x, pose.y, gx, gy);

        if distance <= self.params.arrival_radius {
            self.arrived = true;
            ctx.data.state.clear_goal();
            ctx.announce(&format!("goal ({gx:.2}, {gy:.2}) reached"));
            return Output::Drive(DriveCommand::STOP);
        }

        let state = &mut ctx.data.state;
        state.set_goal_bearing(bearing, pose.heading);
        state.goal_distance = Some(distance);
        Output::Signal
    }
}
