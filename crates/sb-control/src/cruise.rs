//! Cruise: the lowest layer: drive straight ahead.

use serde::Deserialize;

use sb_behavior::{Behavior, BehaviorContext, BehaviorResult, Coordinator, Output};
use sb_core::{DriveCommand, TickData};

use crate::limits::require_positive;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CruiseParams {
    /// m/s.
    pub speed: f64,
}

impl Default for CruiseParams {
    fn default() -> Self {
        Self { speed: 0.2 }
    }
}

impl CruiseParams {
    pub fn validate(&self) -> BehaviorResult<()> {
        require_positive("cruise.speed", self.speed)
    }
}

pub struct Cruise {
    params: CruiseParams,
}

impl Cruise {
    pub fn new(params: CruiseParams) -> Self {
        Self { params }
    }
}

impl Behavior for Cruise {
    fn kind(&self) -> &'static str {
        "Cruise"
    }

    fn should_activate(&self, _: &TickData, _: &Coordinator) -> bool {
        true
    }

    fn should_deactivate(&self, _: &TickData, _: &Coordinator) -> bool {
        false
    }

    fn step(&mut self, ctx: &mut BehaviorContext<'_>) -> Output {
        if ctx.is_grabbed_by_other() {
            return Output::Pass;
        }
        Output::Drive(DriveCommand::new(self.params.speed, 0.0))
    }
}
