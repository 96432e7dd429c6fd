//! CameraChase: pursue whatever the targeting camera is locked on to.

use serde::Deserialize;

use sb_behavior::{Behavior, BehaviorContext, BehaviorResult, Coordinator, Output};
use sb_core::{DriveCommand, TargetReading, TickData};

use crate::limits::{clamp_abs, require_positive};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChaseParams {
    /// Observations older than this are ignored.
    pub max_age_secs: f64,
    pub gain: f64,
    pub max_omega: f64,
    pub speed: f64,
    /// Radians; at or above this the target is close enough to stop.
    pub close_inclination: f64,
}

impl Default for ChaseParams {
    fn default() -> Self {
        Self {
            max_age_secs:      0.5,
            gain:              1.5,
            max_omega:         1.0,
            speed:             0.25,
            close_inclination: 0.35,
        }
    }
}

impl ChaseParams {
    pub fn validate(&self) -> BehaviorResult<()> {
        require_positive("chase.max_age_secs", self.max_age_secs)?;
        require_positive("chase.gain", self.gain)?;
        require_positive("chase.max_omega", self.max_omega)?;
        require_positive("chase.speed", self.speed)
    }
}

pub struct CameraChase {
    params: ChaseParams,
    /// STOP has been sent for a lost target; deactivation may follow.
    halted: bool,
}

impl CameraChase {
    pub fn new(params: ChaseParams) -> Self {
        Self { params, halted: false }
    }

    fn target(&self, data: &TickData) -> Option<TargetReading> {
        data.sensors
            .fresh_target(data.now, self.params.max_age_secs)
            .filter(|t| t.bearing.is_finite() && t.inclination.is_finite())
    }
}

impl Behavior for CameraChase {
    fn kind(&self) -> &'static str {
        "CameraChase"
    }

    fn should_activate(&self, data: &TickData, _: &Coordinator) -> bool {
        self.target(data).is_some()
    }

    fn should_deactivate(&self, data: &TickData, _: &Coordinator) -> bool {
        self.halted && self.target(data).is_none()
    }

    fn on_activate(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.halted = false;
        ctx.announce("target acquired");
    }

    fn step(&mut self, ctx: &mut BehaviorContext<'_>) -> Output {
        // Lost target: stop once, then deactivate.
        let Some(target) = self.target(ctx.data) else {
            self.halted = true;
            ctx.announce("target lost");
            return Output::Drive(DriveCommand::STOP);
        };
        self.halted = false;
        if ctx.is_grabbed_by_other() {
            return Output::Pass;
        }

        let p = &self.params;
        let omega = clamp_abs(p.gain * target.bearing, p.max_omega);
        let velocity = if target.inclination >= p.close_inclination {
            0.0
        } else {
            p.speed * target.bearing.cos().max(0.0)
        };
        Output::Drive(DriveCommand::new(velocity, omega))
    }
}
