//! StuckDetector: commanded to move, but the wheels are not turning.

use serde::Deserialize;

use sb_behavior::{
    Behavior, BehaviorContext, BehaviorResult, Coordinator, EnablingRequest, EscapeHint, Output,
};
use sb_core::{Stamp, TickData};

use crate::limits::{MOTION_EPSILON, require_positive};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct StuckParams {
    /// Seconds between encoder samples.
    pub interval_secs: f64,
}

impl Default for StuckParams {
    fn default() -> Self {
        Self { interval_secs: 2.0 }
    }
}

impl StuckParams {
    pub fn validate(&self) -> BehaviorResult<()> {
        require_positive("stuck.interval_secs", self.interval_secs)
    }
}

/// Start of the current sampling window.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Window {
    started: Stamp,
    ticks:   (i64, i64),
}

pub struct StuckDetector {
    params:     StuckParams,
    window:     Option<Window>,
    detections: u32,
}

impl StuckDetector {
    pub fn new(params: StuckParams) -> Self {
        Self { params, window: None, detections: 0 }
    }

    /// How many times the robot has been reported stuck.
    pub fn detections(&self) -> u32 {
        self.detections
    }
}

impl Behavior for StuckDetector {
    fn kind(&self) -> &'static str {
        "StuckDetector"
    }

    fn should_activate(&self, _: &TickData, _: &Coordinator) -> bool {
        true
    }

    fn should_deactivate(&self, _: &TickData, _: &Coordinator) -> bool {
        false
    }

    fn step(&mut self, ctx: &mut BehaviorContext<'_>) -> Output {
        let commanded = ctx.data.state.is_moving(MOTION_EPSILON);
        let ticks = ctx.data.sensors.wheel_ticks();

        // Sampled regardless of the grab owner; Escape preempts with `set_grab`.
        let (true, Some(ticks)) = (commanded, ticks) else {
            self.window = None;
            return Output::Pass;
        };

        let now = ctx.now();
        let Some(window) = self.window else {
            self.window = Some(Window { started: now, ticks });
            return Output::Pass;
        };
        if !now.has_elapsed(window.started, self.params.interval_secs) {
            return Output::Pass;
        }

        self.window = Some(Window { started: now, ticks });
        if ticks != window.ticks {
            return Output::Pass;
        }

        self.detections += 1;
        ctx.publish(EnablingRequest::Escape(EscapeHint::Any));
        ctx.announce("stuck: wheels not turning");
        Output::Signal
    }
}
