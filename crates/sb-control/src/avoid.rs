//! AvoidObstacles: continuous, non-owning obstacle avoidance.
//!
//! # Control law
//!
//! The avoidance distance grows linearly with forward speed and is clamped to
//! `[min_distance, max_distance]`.  While moving forward with any of the
//! front/left/right ranges inside it:
//!
//! | Left    | Right   | Response                                         |
//! |---------|---------|--------------------------------------------------|
//! | blocked | blocked | turn away from the closer side, slow to ×0.25    |
//! | blocked | free    | turn right, slow to ×0.25                        |
//! | free    | blocked | turn left, slow to ×0.25                         |
//! | free    | free    | (front only) reverse at ×0.25 while turning      |
//!
//! When the obstacle disappears the last correction fades out linearly over
//! `decay_secs` instead of snapping back, which keeps the robot from
//! oscillating at the edge of the threshold.

use serde::Deserialize;

use sb_behavior::{Behavior, BehaviorContext, BehaviorResult, Coordinator, Output};
use sb_core::{DriveCommand, RangeSide, Stamp, TickData};

use crate::limits::{MOTION_EPSILON, require_ordered, require_positive, scaled_distance};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AvoidParams {
    /// Seconds of travel: distance = gain × |velocity| before clamping.
    pub gain: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// rad/s applied while avoiding.
    pub omega: f64,
    /// Velocity multiplier while avoiding.
    pub slow_factor: f64,
    /// Seconds for the correction to fade after the obstacle is gone.
    pub decay_secs: f64,
}

impl Default for AvoidParams {
    fn default() -> Self {
        Self {
            gain:         1.5,
            min_distance: 0.20,
            max_distance: 0.60,
            omega:        1.0,
            slow_factor:  0.25,
            decay_secs:   0.5,
        }
    }
}

impl AvoidParams {
    pub fn validate(&self) -> BehaviorResult<()> {
        require_positive("avoid.gain", self.gain)?;
        require_ordered("avoid distance", self.min_distance, self.max_distance)?;
        require_positive("avoid.omega", self.omega)?;
        require_positive("avoid.slow_factor", self.slow_factor)?;
        require_positive("avoid.decay_secs", self.decay_secs)
    }

    /// Velocity-scaled avoidance distance, always within bounds.
    #[inline]
    pub fn distance_for(&self, velocity: f64) -> f64 {
        scaled_distance(self.gain, velocity, self.min_distance, self.max_distance)
    }
}

/// The correction applied on the last avoiding tick.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Correction {
    /// Forward velocity the correction was applied to.
    base_velocity: f64,
    omega:         f64,
    /// Signed velocity multiplier (negative when reversing).
    scale:         f64,
    /// Set on the first tick without an obstacle.
    lost_at:       Option<Stamp>,
}

pub struct AvoidObstacles {
    params: AvoidParams,
    last:   Option<Correction>,
}

impl AvoidObstacles {
    pub fn new(params: AvoidParams) -> Self {
        Self { params, last: None }
    }

    /// Forward velocity the law should work from this tick.
    ///
    /// A lower layer's command from this tick wins.  Without one, the
    /// previous commanded velocity is used, except while a correction is in
    /// force: that velocity is this behavior's own scaled output, so the
    /// stored base is used instead of compounding the slow-down.
    fn base_velocity(&self, data: &TickData) -> f64 {
        match (data.command, self.last) {
            (Some(cmd), _)         => cmd.velocity,
            (None, Some(last))     => last.base_velocity,
            (None, None)           => data.state.velocity,
        }
    }

    fn avoid(&mut self, data: &TickData, velocity: f64) -> Option<DriveCommand> {
        let p = &self.params;
        let threshold = p.distance_for(velocity);
        let ranges = &data.sensors.ranges;

        let front = ranges.within(RangeSide::Front, threshold);
        let left = ranges.within(RangeSide::Left, threshold);
        let right = ranges.within(RangeSide::Right, threshold);
        if !(front || left || right) {
            return None;
        }

        let left_d = ranges.get(RangeSide::Left);
        let right_d = ranges.get(RangeSide::Right);
        let (omega, scale) = match (left, right) {
            (true, true) => {
                // Both are valid here; turn away from the closer wall.
                let turn_right = left_d.unwrap_or(0.0) < right_d.unwrap_or(0.0);
                (if turn_right { -p.omega } else { p.omega }, p.slow_factor)
            }
            (true, false) => (-p.omega, p.slow_factor),
            (false, true) => (p.omega, p.slow_factor),
            (false, false) => {
                let toward_right = matches!((left_d, right_d), (Some(l), Some(r)) if r > l);
                (if toward_right { -p.omega } else { p.omega }, -p.slow_factor)
            }
        };

        self.last = Some(Correction { base_velocity: velocity, omega, scale, lost_at: None });
        Some(DriveCommand::new(velocity * scale, omega))
    }

    fn decay(&mut self, now: Stamp, velocity: f64, base_omega: f64) -> Option<DriveCommand> {
        let last = self.last.as_mut()?;
        let lost_at = *last.lost_at.get_or_insert(now);
        let remaining = 1.0 - now.secs_since(lost_at) / self.params.decay_secs;
        if remaining <= 0.0 {
            self.last = None;
            return None;
        }
        let scale = 1.0 + (last.scale - 1.0) * remaining;
        Some(DriveCommand::new(velocity * scale, base_omega + last.omega * remaining))
    }
}

impl Behavior for AvoidObstacles {
    fn kind(&self) -> &'static str {
        "AvoidObstacles"
    }

    fn should_activate(&self, _: &TickData, _: &Coordinator) -> bool {
        true
    }

    fn should_deactivate(&self, _: &TickData, _: &Coordinator) -> bool {
        false
    }

    fn step(&mut self, ctx: &mut BehaviorContext<'_>) -> Output {
        if ctx.is_grabbed_by_other() {
            self.last = None;
            return Output::Pass;
        }

        let velocity = self.base_velocity(ctx.data);
        if velocity > MOTION_EPSILON {
            if let Some(cmd) = self.avoid(ctx.data, velocity) {
                return Output::Drive(cmd);
            }
        }

        let base_omega = ctx.data.command.map_or(0.0, |c| c.omega);
        match self.decay(ctx.now(), velocity.max(0.0), base_omega) {
            Some(cmd) => Output::Drive(cmd),
            None      => Output::Pass,
        }
    }
}
