//! FollowWall: grab-owning, two-phase wall tracking.
//!
//! Phase one is the activate predicate: a side range inside `0.9 × envelope`,
//! and at least `dead_zone_secs` since this behavior last let go of a wall.
//! Phase two is tracking: the behavior holds the grab and steers on the wall
//! field factor `side − target` until the robot faces the goal heading that
//! was stored on activation (the navigation goal bearing, or the pose heading
//! when there is none), or the wall has been lost for `lost_secs`.

use serde::Deserialize;

use sb_behavior::{Behavior, BehaviorContext, BehaviorResult, Coordinator, Output};
use sb_core::geo::angle_diff;
use sb_core::{DriveCommand, RangeSide, Stamp, TickData};

use crate::limits::{clamp_abs, require_positive};

/// Fraction of the envelope a side range must come inside to start tracking.
const ACTIVATION_BAND: f64 = 0.9;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FollowWallParams {
    /// Metres to hold from the wall.
    pub target_distance: f64,
    /// Metres; a side range beyond this is "no wall".
    pub envelope: f64,
    /// A front range under `corner_trigger × target_distance` starts a pivot.
    pub corner_trigger: f64,
    /// A side range over `catchup_ratio × target_distance` starts a catch-up turn.
    pub catchup_ratio: f64,
    /// rad/s per metre of wall field factor.
    pub gain: f64,
    pub max_omega: f64,
    /// m/s while tracking.
    pub speed: f64,
    /// rad/s for the concave-corner pivot.
    pub pivot_omega: f64,
    /// rad/s for the convex-corner catch-up turn.
    pub catchup_omega: f64,
    pub lost_secs: f64,
    pub dead_zone_secs: f64,
    /// Radians; how close to the stored goal heading counts as "reached".
    pub heading_tolerance: f64,
}

impl Default for FollowWallParams {
    fn default() -> Self {
        Self {
            target_distance:   0.4,
            envelope:          0.8,
            corner_trigger:    1.5,
            catchup_ratio:     1.8,
            gain:              2.0,
            max_omega:         1.0,
            speed:             0.2,
            pivot_omega:       1.0,
            catchup_omega:     0.4,
            lost_secs:         2.0,
            dead_zone_secs:    2.0,
            heading_tolerance: 0.2,
        }
    }
}

impl FollowWallParams {
    pub fn validate(&self) -> BehaviorResult<()> {
        require_positive("follow_wall.target_distance", self.target_distance)?;
        require_positive("follow_wall.envelope", self.envelope)?;
        require_positive("follow_wall.corner_trigger", self.corner_trigger)?;
        require_positive("follow_wall.catchup_ratio", self.catchup_ratio)?;
        require_positive("follow_wall.gain", self.gain)?;
        require_positive("follow_wall.max_omega", self.max_omega)?;
        require_positive("follow_wall.speed", self.speed)?;
        require_positive("follow_wall.heading_tolerance", self.heading_tolerance)
    }
}

/// Which side the tracked wall is on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WallSide {
    Left,
    Right,
}

impl WallSide {
    fn range(self) -> RangeSide {
        match self {
            WallSide::Left  => RangeSide::Left,
            WallSide::Right => RangeSide::Right,
        }
    }

    /// Sign of a turn *toward* the wall.
    fn toward(self) -> f64 {
        match self {
            WallSide::Left  => 1.0,
            WallSide::Right => -1.0,
        }
    }
}

pub struct FollowWall {
    params:           FollowWallParams,
    side:             Option<WallSide>,
    goal_heading:     Option<f64>,
    /// Set once the heading has moved away from the goal heading; reaching
    /// it only counts after that.
    departed:         bool,
    lost_since:       Option<Stamp>,
    last_deactivated: Option<Stamp>,
    done:             bool,
}

impl FollowWall {
    pub fn new(params: FollowWallParams) -> Self {
        Self {
            params,
            side:             None,
            goal_heading:     None,
            departed:         false,
            lost_since:       None,
            last_deactivated: None,
            done:             false,
        }
    }

    /// Side being tracked, if active.
    pub fn side(&self) -> Option<WallSide> {
        self.side
    }

    /// The closer side inside the activation band.
    fn detect(&self, data: &TickData) -> Option<WallSide> {
        let band = ACTIVATION_BAND * self.params.envelope;
        let ranges = &data.sensors.ranges;
        let left = ranges.get(RangeSide::Left).filter(|d| *d <= band);
        let right = ranges.get(RangeSide::Right).filter(|d| *d <= band);
        match (left, right) {
            (Some(l), Some(r)) => Some(if l <= r { WallSide::Left } else { WallSide::Right }),
            (Some(_), None)    => Some(WallSide::Left),
            (None, Some(_))    => Some(WallSide::Right),
            (None, None)       => None,
        }
    }

    fn in_dead_zone(&self, now: Stamp) -> bool {
        self.last_deactivated
            .is_some_and(|at| !now.has_elapsed(at, self.params.dead_zone_secs))
    }

    /// `true` once the stored goal heading has been regained.
    fn goal_heading_reached(&mut self, heading: f64) -> bool {
        let Some(goal) = self.goal_heading else {
            return false;
        };
        let error = angle_diff(goal, heading).abs();
        if error > 2.0 * self.params.heading_tolerance {
            self.departed = true;
        }
        self.departed && error <= self.params.heading_tolerance
    }
}

impl Behavior for FollowWall {
    fn kind(&self) -> &'static str {
        "FollowWall"
    }

    fn should_activate(&self, data: &TickData, _: &Coordinator) -> bool {
        !self.in_dead_zone(data.now) && self.detect(data).is_some()
    }

    fn should_deactivate(&self, _: &TickData, _: &Coordinator) -> bool {
        self.done
    }

    fn on_activate(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.side = self.detect(ctx.data);
        // Without a navigation goal, leave once the original heading is regained.
        self.goal_heading = Some(ctx.data.state.goal_bearing.unwrap_or(ctx.data.pose.heading));
        self.departed = false;
        self.lost_since = None;
        self.done = false;
        ctx.try_grab();
    }

    fn step(&mut self, ctx: &mut BehaviorContext<'_>) -> Output {
        let Some(side) = self.side else {
            self.done = true;
            return Output::Pass;
        };

        // A ballistic maneuver took over: let go of the wall.
        if ctx.is_grabbed_by_other() {
            self.done = true;
            return Output::Pass;
        }
        ctx.try_grab();

        let now = ctx.now();
        if self.goal_heading_reached(ctx.data.pose.heading) {
            self.done = true;
            ctx.announce("goal heading regained, leaving wall");
            return Output::Pass;
        }

        let p = &self.params;
        let ranges = &ctx.data.sensors.ranges;
        let side_d = ranges.get(side.range()).filter(|d| *d <= p.envelope);

        match side_d {
            Some(_) => self.lost_since = None,
            None => {
                let since = *self.lost_since.get_or_insert(now);
                if now.secs_since(since) > p.lost_secs {
                    self.done = true;
                    ctx.announce("wall lost");
                    return Output::Pass;
                }
            }
        }

        let toward = side.toward();

        // Concave corner: pivot away from the wall.
        if ranges.within(RangeSide::Front, p.corner_trigger * p.target_distance) {
            return Output::Drive(DriveCommand::new(0.0, -toward * p.pivot_omega));
        }

        match side_d {
            // Convex corner or lost wall: gentle turn back toward it.
            None => Output::Drive(DriveCommand::new(0.5 * p.speed, toward * p.catchup_omega)),
            Some(d) if d > p.catchup_ratio * p.target_distance => {
                Output::Drive(DriveCommand::new(0.5 * p.speed, toward * p.catchup_omega))
            }
            Some(d) => {
                let field = d - p.target_distance;
                let omega = clamp_abs(toward * p.gain * field, p.max_omega);
                Output::Drive(DriveCommand::new(p.speed, omega))
            }
        }
    }

    fn on_deactivate(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.last_deactivated = Some(ctx.now());
        self.side = None;
        self.lost_since = None;
        self.done = false;
        ctx.clear_grab_if_mine();
    }
}
