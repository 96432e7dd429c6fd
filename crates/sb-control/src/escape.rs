//! Escape: the ballistic back-off-and-turn maneuver.
//!
//! # Sequence
//!
//! Escape activates on any `Escape*` enabling request, consumes it, and takes
//! the grab.  Each cycle is three open-loop, wall-clock-timed phases:
//!
//! ```text
//!   Straight  ≤ phase_secs   back off (or drive forward for EscapeForward)
//!   Pivot     ≤ phase_secs   turn in place (twice as long for EscapeFullTurn)
//!   Counter   ≤ phase_secs   drive forward with a small counter-turn; cut
//!                            short when the front range drops under
//!                            `front_clearance`
//! ```
//!
//! Every cycle draws fresh speed and turn multipliers in
//! `[1 - jitter, 1 + jitter]` so repeated escapes don't retrace the same path.
//! By default the behavior deactivates after one completed cycle; a task can
//! override that with an external deactivate predicate to keep it cycling.

use serde::Deserialize;

use sb_behavior::{
    Behavior, BehaviorContext, BehaviorResult, Coordinator, EnablingRequest, EscapeHint, Output,
};
use sb_core::{BehaviorRng, DriveCommand, RangeSide, Stamp, TickData};

use crate::limits::require_positive;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EscapeParams {
    /// m/s for the straight and counter phases.
    pub speed: f64,
    /// rad/s for the pivot.
    pub turn: f64,
    /// Seconds per phase.
    pub phase_secs: f64,
    /// Counter phase ends early when the front range is under this.
    pub front_clearance: f64,
    /// Half-width of the per-cycle jitter band.
    pub jitter: f64,
    /// Counter-turn as a fraction of the pivot turn.
    pub counter_ratio: f64,
}

impl Default for EscapeParams {
    fn default() -> Self {
        Self {
            speed:           0.2,
            turn:            1.2,
            phase_secs:      1.0,
            front_clearance: 0.25,
            jitter:          0.25,
            counter_ratio:   0.3,
        }
    }
}

impl EscapeParams {
    pub fn validate(&self) -> BehaviorResult<()> {
        require_positive("escape.speed", self.speed)?;
        require_positive("escape.turn", self.turn)?;
        require_positive("escape.phase_secs", self.phase_secs)?;
        require_positive("escape.front_clearance", self.front_clearance)?;
        if !(0.0..1.0).contains(&self.jitter) {
            return Err(sb_behavior::BehaviorError::Config(format!(
                "escape.jitter must be in [0, 1), got {}",
                self.jitter
            )));
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EscapePhase {
    Straight,
    Pivot,
    Counter,
}

/// Concrete motion for one cycle, after jitter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EscapePlan {
    /// Straight-phase velocity; negative backs off, zero skips the phase.
    pub straight_velocity: f64,
    /// Pivot turn rate, signed (+left).
    pub turn: f64,
    /// Counter-phase velocity.
    pub counter_velocity: f64,
    /// Counter-phase turn rate.
    pub counter_turn: f64,
    /// Pivot duration in seconds.
    pub pivot_secs: f64,
}

pub struct Escape {
    params:      EscapeParams,
    rng:         BehaviorRng,
    hint:        EscapeHint,
    plan:        Option<EscapePlan>,
    phase:       EscapePhase,
    phase_start: Stamp,
    cycles:      u32,
    one_shot:    bool,
}

impl Escape {
    pub fn new(params: EscapeParams, rng: BehaviorRng) -> Self {
        Self {
            params,
            rng,
            hint:        EscapeHint::Any,
            plan:        None,
            phase:       EscapePhase::Straight,
            phase_start: Stamp::ZERO,
            cycles:      0,
            one_shot:    false,
        }
    }

    /// Terminate (instead of going dormant) after the first completed cycle.
    pub fn one_shot(mut self) -> Self {
        self.one_shot = true;
        self
    }

    /// The current cycle's plan, if a maneuver is running.
    pub fn plan(&self) -> Option<&EscapePlan> {
        self.plan.as_ref()
    }

    pub fn phase(&self) -> EscapePhase {
        self.phase
    }

    /// Completed cycles since activation.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Draw a new jittered plan for `hint`.
    pub fn plan_for(&mut self, hint: EscapeHint) -> EscapePlan {
        let p = &self.params;
        let speed = p.speed * self.rng.jitter(p.jitter);
        let turn = p.turn * self.rng.jitter(p.jitter);
        let random_sign = self.rng.sign();

        // (straight direction, turn sign, pivot length multiplier)
        let (straight, sign, pivot_mult) = match hint {
            EscapeHint::Any       => (-1.0, random_sign, 1.0),
            EscapeHint::Left      => (-1.0, -1.0, 1.0),
            EscapeHint::Right     => (-1.0, 1.0, 1.0),
            EscapeHint::Forward   => (1.0, random_sign, 1.0),
            EscapeHint::LeftTurn  => (0.0, 1.0, 1.0),
            EscapeHint::RightTurn => (0.0, -1.0, 1.0),
            EscapeHint::FullTurn  => (-1.0, random_sign, 2.0),
            EscapeHint::None      => (0.0, 0.0, 1.0),
        };
        let moving = if hint == EscapeHint::None { 0.0 } else { 1.0 };

        EscapePlan {
            straight_velocity: straight * speed,
            turn:              sign * turn,
            counter_velocity:  moving * speed,
            counter_turn:      -sign * turn * p.counter_ratio,
            pivot_secs:        p.phase_secs * pivot_mult,
        }
    }

    fn start_cycle(&mut self, now: Stamp) {
        self.plan = Some(self.plan_for(self.hint));
        self.phase = EscapePhase::Straight;
        self.phase_start = now;
    }

    fn phase_secs(&self, plan: &EscapePlan) -> f64 {
        match self.phase {
            EscapePhase::Straight if plan.straight_velocity == 0.0 => 0.0,
            EscapePhase::Straight => self.params.phase_secs,
            EscapePhase::Pivot    => plan.pivot_secs,
            EscapePhase::Counter  => self.params.phase_secs,
        }
    }

    /// Advance through expired phases; returns the command for `now`.
    fn run(&mut self, data: &TickData) -> DriveCommand {
        let now = data.now;
        loop {
            let Some(plan) = self.plan else {
                self.start_cycle(now);
                continue;
            };

            let blocked = self.phase == EscapePhase::Counter
                && data.sensors.ranges.within(RangeSide::Front, self.params.front_clearance);
            let expired = now.has_elapsed(self.phase_start, self.phase_secs(&plan));

            if !(expired || blocked) {
                return match self.phase {
                    EscapePhase::Straight => DriveCommand::new(plan.straight_velocity, 0.0),
                    EscapePhase::Pivot    => DriveCommand::new(0.0, plan.turn),
                    EscapePhase::Counter  => {
                        DriveCommand::new(plan.counter_velocity, plan.counter_turn)
                    }
                };
            }

            match self.phase {
                EscapePhase::Straight => self.phase = EscapePhase::Pivot,
                EscapePhase::Pivot    => self.phase = EscapePhase::Counter,
                EscapePhase::Counter  => {
                    // Pause for one tick between cycles.
                    self.cycles += 1;
                    self.start_cycle(now);
                    return DriveCommand::STOP;
                }
            }
            self.phase_start = now;
        }
    }
}

impl Behavior for Escape {
    fn kind(&self) -> &'static str {
        "Escape"
    }

    fn should_activate(&self, _: &TickData, coordinator: &Coordinator) -> bool {
        coordinator.request().is_some_and(EnablingRequest::is_escape)
    }

    fn should_deactivate(&self, _: &TickData, _: &Coordinator) -> bool {
        self.cycles >= 1
    }

    fn should_terminate(&self, _: &TickData, _: &Coordinator) -> bool {
        self.one_shot && self.cycles >= 1
    }

    fn on_activate(&mut self, ctx: &mut BehaviorContext<'_>) {
        let request = ctx.take_request_if(EnablingRequest::is_escape);
        self.hint = request
            .as_ref()
            .and_then(EnablingRequest::escape_hint)
            .unwrap_or(EscapeHint::Any);
        self.cycles = 0;
        self.plan = None;
        self.start_cycle(ctx.now());
        ctx.set_grab();
        if let Some(request) = request {
            ctx.announce(&format!("escaping ({request})"));
        }
    }

    fn step(&mut self, ctx: &mut BehaviorContext<'_>) -> Output {
        if ctx.is_grabbed_by_other() {
            // Somebody evicted us; stop the maneuver.
            self.cycles = self.cycles.max(1);
            return Output::Pass;
        }
        ctx.try_grab();
        Output::Drive(self.run(ctx.data))
    }

    fn on_deactivate(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.plan = None;
        ctx.clear_grab_if_mine();
    }
}
