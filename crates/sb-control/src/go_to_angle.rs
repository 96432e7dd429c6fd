//! GoToAngle: steer toward the goal bearing published in the robot state.

use serde::Deserialize;

use sb_behavior::{Behavior, BehaviorContext, BehaviorResult, Coordinator, Output};
use sb_core::geo::angle_diff;
use sb_core::{DriveCommand, TickData};

use crate::limits::{clamp_abs, require_positive};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GoToAngleParams {
    /// rad/s of turn per radian of heading error.
    pub gain: f64,
    /// rad/s.
    pub max_omega: f64,
    /// m/s when pointing straight at the goal.
    pub speed: f64,
}

impl Default for GoToAngleParams {
    fn default() -> Self {
        Self { gain: 1.5, max_omega: 1.0, speed: 0.2 }
    }
}

impl GoToAngleParams {
    pub fn validate(&self) -> BehaviorResult<()> {
        require_positive("go_to_angle.gain", self.gain)?;
        require_positive("go_to_angle.max_omega", self.max_omega)?;
        require_positive("go_to_angle.speed", self.speed)
    }
}

/// Heading error toward the goal, preferring the absolute bearing (which
/// stays correct as the robot turns) over the relative one.
pub(crate) fn goal_error(data: &TickData) -> Option<f64> {
    match data.state.goal_bearing {
        Some(bearing) => Some(angle_diff(bearing, data.pose.heading)),
        None          => data.state.goal_bearing_rel,
    }
    .filter(|e| e.is_finite())
}

/// Proportional pursuit of a heading error.
pub(crate) fn pursue(error: f64, gain: f64, max_omega: f64, speed: f64) -> DriveCommand {
    DriveCommand::new(speed * error.cos().max(0.0), clamp_abs(gain * error, max_omega))
}

pub struct GoToAngle {
    params: GoToAngleParams,
}

impl GoToAngle {
    pub fn new(params: GoToAngleParams) -> Self {
        Self { params }
    }
}

impl Behavior for GoToAngle {
    fn kind(&self) -> &'static str {
        "GoToAngle"
    }

    fn should_activate(&self, data: &TickData, _: &Coordinator) -> bool {
        goal_error(data).is_some()
    }

    fn should_deactivate(&self, data: &TickData, _: &Coordinator) -> bool {
        goal_error(data).is_none()
    }

    fn step(&mut self, ctx: &mut BehaviorContext<'_>) -> Output {
        if ctx.is_grabbed_by_other() {
            return Output::Pass;
        }
        match goal_error(ctx.data) {
            Some(error) => {
                let p = &self.params;
                Output::Drive(pursue(error, p.gain, p.max_omega, p.speed))
            }
            None => Output::Pass,
        }
    }
}
