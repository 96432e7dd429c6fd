//! Stop: halt short of an obstacle and recommend an escape.

use serde::Deserialize;

use sb_behavior::{
    Behavior, BehaviorContext, BehaviorResult, Coordinator, EnablingRequest, EscapeHint, Output,
};
use sb_core::{DriveCommand, RangeSide, Ranges, TickData};

use crate::limits::{MOTION_EPSILON, require_ordered, require_positive, scaled_distance};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct StopParams {
    /// Seconds of travel: distance = gain × |velocity| before clamping.
    pub gain: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// A side range under this counts as blocked when classifying.
    pub side_clearance: f64,
    /// A rear range under this counts as blocked when classifying.
    pub rear_clearance: f64,
}

impl Default for StopParams {
    fn default() -> Self {
        Self {
            gain:           1.0,
            min_distance:   0.15,
            max_distance:   0.40,
            side_clearance: 0.35,
            rear_clearance: 0.25,
        }
    }
}

impl StopParams {
    pub fn validate(&self) -> BehaviorResult<()> {
        require_positive("stop.gain", self.gain)?;
        require_ordered("stop distance", self.min_distance, self.max_distance)?;
        require_positive("stop.side_clearance", self.side_clearance)?;
        require_positive("stop.rear_clearance", self.rear_clearance)
    }

    /// Velocity-scaled stop distance, always within bounds.
    #[inline]
    pub fn distance_for(&self, velocity: f64) -> f64 {
        scaled_distance(self.gain, velocity, self.min_distance, self.max_distance)
    }
}

/// Pick an escape for a robot that is blocked ahead.
pub fn classify(ranges: &Ranges, side_clearance: f64, rear_clearance: f64) -> EscapeHint {
    let left = ranges.within(RangeSide::Left, side_clearance);
    let right = ranges.within(RangeSide::Right, side_clearance);
    let rear = ranges.within(RangeSide::Rear, rear_clearance);

    match (left, right, rear) {
        (true, true, true)    => EscapeHint::None,
        (true, true, false)   => EscapeHint::FullTurn,
        (true, false, true)   => EscapeHint::RightTurn,
        (true, false, false)  => EscapeHint::Left,
        (false, true, true)   => EscapeHint::LeftTurn,
        (false, true, false)  => EscapeHint::Right,
        (false, false, true)  => {
            let l = ranges.get(RangeSide::Left).unwrap_or(f64::INFINITY);
            let r = ranges.get(RangeSide::Right).unwrap_or(f64::INFINITY);
            if r > l { EscapeHint::RightTurn } else { EscapeHint::LeftTurn }
        }
        (false, false, false) => EscapeHint::Any,
    }
}

pub struct Stop {
    params: StopParams,
}

impl Stop {
    pub fn new(params: StopParams) -> Self {
        Self { params }
    }
}

impl Behavior for Stop {
    fn kind(&self) -> &'static str {
        "Stop"
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

        let p = &self.params;
        let velocity = ctx.data.current_motion().velocity;
        let threshold = p.distance_for(velocity);
        let ranges = &ctx.data.sensors.ranges;

        let hint = if velocity > MOTION_EPSILON && ranges.within(RangeSide::Front, threshold) {
            classify(ranges, p.side_clearance, p.rear_clearance)
        } else if velocity < -MOTION_EPSILON && ranges.within(RangeSide::Rear, threshold) {
            EscapeHint::Forward
        } else {
            return Output::Pass;
        };

        ctx.publish(EnablingRequest::Escape(hint));
        Output::Drive(DriveCommand::STOP)
    }
}
