//! The `Behavior` trait: the extension point for control laws.

use sb_core::{DriveCommand, TickData};

use crate::{BehaviorContext, Coordinator};

/// What a behavior produced on one resumption.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Output {
    /// Nothing to say this tick; the behavior is not fired.
    Pass,
    /// Fired without a drive command (e.g. a request was published).
    Signal,
    /// Fired with a drive command.  The task writes it to the tick's output
    /// slot unless another behavior owns the grab.
    Drive(DriveCommand),
}

/// A resumable unit of control logic.
///
/// A behavior is driven by its [`Task`][crate::Task]: once per tick the task
/// asks the predicates whether to activate, deactivate or terminate, and
/// calls [`step`][Self::step] while the behavior is active.  "Wait N seconds"
/// is expressed by storing a stamp and comparing it with `ctx.now()` on later
/// steps; a behavior never blocks.
///
/// # Predicates
///
/// The three predicate methods are the behavior's own policy.  A task may
/// override any of them with an external closure (see
/// [`Conditions`][crate::Conditions]).  The defaults are: never activate,
/// always deactivate (one-shot), never terminate.
///
/// # Required methods
///
/// Only [`kind`][Self::kind] and [`step`][Self::step] are required.
///
/// # Example
///
/// ```rust,ignore
/// struct Halt;
///
/// impl Behavior for Halt {
///     fn kind(&self) -> &'static str { "Halt" }
///     fn should_activate(&self, _: &TickData, _: &Coordinator) -> bool { true }
///     fn step(&mut self, _ctx: &mut BehaviorContext<'_>) -> Output {
///         Output::Drive(DriveCommand::STOP)
///     }
/// }
/// ```
pub trait Behavior {
    /// Default identity name; also the grab key unless the task renames it.
    fn kind(&self) -> &'static str;

    fn should_activate(&self, _data: &TickData, _coordinator: &Coordinator) -> bool {
        false
    }

    fn should_deactivate(&self, _data: &TickData, _coordinator: &Coordinator) -> bool {
        true
    }

    fn should_terminate(&self, _data: &TickData, _coordinator: &Coordinator) -> bool {
        false
    }

    /// Called on the Dormant → Activated edge, before the first `step`.
    fn on_activate(&mut self, _ctx: &mut BehaviorContext<'_>) {}

    /// Called once per tick while active.
    fn step(&mut self, ctx: &mut BehaviorContext<'_>) -> Output;

    /// Called when leaving the active phase for any reason.  The task
    /// releases the grab afterwards if this behavior still holds it.
    fn on_deactivate(&mut self, _ctx: &mut BehaviorContext<'_>) {}
}
