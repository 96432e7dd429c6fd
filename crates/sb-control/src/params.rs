//! Aggregate tuning for every control law.

use serde::Deserialize;

use sb_behavior::BehaviorResult;

use crate::{
    AvoidParams, ChaseParams, CruiseParams, EscapeParams, FollowWallParams, GoToAngleParams,
    GoToGoalParams, RouteParams, StopParams, StuckParams, TeleopParams,
};

/// One section per behavior; every section and field falls back to its
/// default, so a config file only lists what it changes.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BehaviorParams {
    pub cruise:      CruiseParams,
    pub go_to_angle: GoToAngleParams,
    pub go_to_goal:  GoToGoalParams,
    pub avoid:       AvoidParams,
    pub follow_wall: FollowWallParams,
    pub stop:        StopParams,
    pub stuck:       StuckParams,
    pub escape:      EscapeParams,
    pub teleop:      TeleopParams,
    pub chase:       ChaseParams,
    pub route:       RouteParams,
}

impl BehaviorParams {
    /// Check every section; the first invalid field wins.
    pub fn validate(&self) -> BehaviorResult<()> {
        self.cruise.validate()?;
        self.go_to_angle.validate()?;
        self.go_to_goal.validate()?;
        self.avoid.validate()?;
        self.follow_wall.validate()?;
        self.stop.validate()?;
        self.stuck.validate()?;
        self.escape.validate()?;
        self.teleop.validate()?;
        self.chase.validate()?;
        self.route.validate()
    }
}
