//! `Task`: one behavior instance plus its lifecycle state machine.
//!
//! # Phases
//!
//! ```text
//!            activate               deactivate
//!  Dormant ───────────▶ Activated ─────────────▶ Deactivating ──▶ Dormant
//!     │                     │
//!     └──── exit flag / terminate predicate ────▶ Terminated
//! ```
//!
//! One call to [`Task::resume`] is one resumption: at most one `step` of the
//! behavior.  The exit flag and the terminate predicate are checked first on
//! every resumption, so a closed task always finishes within one call.

use sb_core::{Stamp, TickData};
use tracing::{debug, trace};

use crate::{Behavior, BehaviorContext, Conditions, Coordinator, Notifier, Output};

/// Lifecycle phase of a task.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for the activate predicate.
    Dormant,
    /// Stepping once per tick.
    Activated,
    /// Leaving the active phase; cleanup runs before returning to `Dormant`.
    Deactivating,
    /// Finished; the dispatcher removes the task.
    Terminated,
}

pub struct Task {
    name:       String,
    behavior:   Box<dyn Behavior>,
    conditions: Conditions,
    phase:      Phase,
    fired:      bool,
    fired_at:   Option<Stamp>,
    exit:       bool,
}

impl Task {
    /// Wrap `behavior` under its default name.
    pub fn new<B: Behavior + 'static>(behavior: B) -> Self {
        let name = behavior.kind().to_owned();
        Self::named(name, behavior)
    }

    /// Wrap `behavior` under an explicit identity name (the grab key).
    pub fn named<B: Behavior + 'static>(name: impl Into<String>, behavior: B) -> Self {
        Self {
            name:       name.into(),
            behavior:   Box::new(behavior),
            conditions: Conditions::default(),
            phase:      Phase::Dormant,
            fired:      false,
            fired_at:   None,
            exit:       false,
        }
    }

    /// Attach external predicate overrides.
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// `true` while the behavior's output is authoritative for this tick.
    #[inline]
    pub fn fired(&self) -> bool {
        self.fired
    }

    /// When the behavior last fired.
    #[inline]
    pub fn fired_at(&self) -> Option<Stamp> {
        self.fired_at
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    /// Raise the cooperative-exit flag.  Observed on the next resumption.
    pub fn request_exit(&mut self) {
        self.exit = true;
    }

    // ── Predicates ────────────────────────────────────────────────────────

    fn must_activate(&self, data: &TickData, coordinator: &Coordinator) -> bool {
        match &self.conditions.activate {
            Some(f) => f(data),
            None    => self.behavior.should_activate(data, coordinator),
        }
    }

    fn must_deactivate(&self, data: &TickData, coordinator: &Coordinator) -> bool {
        match &self.conditions.deactivate {
            Some(f) => f(data),
            None    => self.behavior.should_deactivate(data, coordinator),
        }
    }

    fn must_terminate(&self, data: &TickData, coordinator: &Coordinator) -> bool {
        match &self.conditions.terminate {
            Some(f) => f(data),
            None    => self.behavior.should_terminate(data, coordinator),
        }
    }

    // ── Resumption ────────────────────────────────────────────────────────

    /// Advance the task by one resumption against this tick's data.
    pub fn resume(
        &mut self,
        data:        &mut TickData,
        coordinator: &mut Coordinator,
        notifier:    &mut dyn Notifier,
    ) {
        // Fired is a per-tick claim; it is re-established by this step or not at all.
        self.fired = false;

        if self.phase == Phase::Terminated {
            return;
        }

        if self.exit || self.must_terminate(data, coordinator) {
            self.terminate(data, coordinator, notifier);
            return;
        }

        if self.phase == Phase::Dormant {
            if !self.must_activate(data, coordinator) {
                return;
            }
            self.transition(Phase::Activated, data.now, notifier);
            let mut ctx = BehaviorContext::new(&self.name, data, coordinator, notifier);
            self.behavior.on_activate(&mut ctx);
        }

        let output = {
            let mut ctx = BehaviorContext::new(&self.name, data, coordinator, notifier);
            self.behavior.step(&mut ctx)
        };
        self.apply(output, data, coordinator);

        if self.must_deactivate(data, coordinator) {
            self.transition(Phase::Deactivating, data.now, notifier);
            self.leave_active(data, coordinator, notifier);
            self.transition(Phase::Dormant, data.now, notifier);
        }
    }

    /// Write the step's output, honouring the grab.
    fn apply(&mut self, output: Output, data: &mut TickData, coordinator: &Coordinator) {
        match output {
            Output::Pass => {}
            Output::Signal => {
                self.fired = true;
                self.fired_at = Some(data.now);
            }
            Output::Drive(cmd) => {
                if coordinator.is_grabbed_by_other(&self.name) {
                    trace!(behavior = %self.name, owner = ?coordinator.owner(), "output suppressed");
                    return;
                }
                data.command = Some(cmd);
                self.fired = true;
                self.fired_at = Some(data.now);
            }
        }
    }

    /// Run the behavior's deactivation hook and drop its grab.
    fn leave_active(
        &mut self,
        data:        &mut TickData,
        coordinator: &mut Coordinator,
        notifier:    &mut dyn Notifier,
    ) {
        {
            let mut ctx = BehaviorContext::new(&self.name, data, coordinator, notifier);
            self.behavior.on_deactivate(&mut ctx);
        }
        coordinator.clear_grab_if_mine(&self.name);
    }

    fn terminate(
        &mut self,
        data:        &mut TickData,
        coordinator: &mut Coordinator,
        notifier:    &mut dyn Notifier,
    ) {
        if self.phase == Phase::Activated {
            self.leave_active(data, coordinator, notifier);
        }
        coordinator.clear_grab_if_mine(&self.name);
        self.fired = false;
        self.transition(Phase::Terminated, data.now, notifier);
    }

    fn transition(&mut self, to: Phase, at: Stamp, notifier: &mut dyn Notifier) {
        let from = self.phase;
        self.phase = to;
        debug!(behavior = %self.name, ?from, ?to, "phase");
        notifier.on_transition(&self.name, from, to, at);
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("fired", &self.fired)
            .field("exit", &self.exit)
            .finish()
    }
}
