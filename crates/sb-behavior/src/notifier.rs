//! Fire-and-forget notices about what the behaviors are doing.

use sb_core::{DriveCommand, Stamp};
use tracing::{error, info, trace};

use crate::Phase;

/// Callbacks for state transitions and announcements.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Implementations run on the control
/// thread inside the tick and must return promptly: queue or drop, never
/// block.
pub trait Notifier {
    /// A task moved between phases.
    fn on_transition(&mut self, _behavior: &str, _from: Phase, _to: Phase, _at: Stamp) {}

    /// A behavior has something to say (arrival, escape started, …).
    fn announce(&mut self, _behavior: &str, _text: &str) {}

    /// A behavior panicked and was removed from the active set.
    fn on_fault(&mut self, _behavior: &str, _reason: &str) {}

    /// Called once after every dispatcher tick.
    fn on_tick_end(&mut self, _at: Stamp, _active: usize, _command: Option<DriveCommand>) {}
}

/// A [`Notifier`] that does nothing.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {}

/// A [`Notifier`] that routes everything through `tracing`.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn on_transition(&mut self, behavior: &str, from: Phase, to: Phase, at: Stamp) {
        info!(behavior, ?from, ?to, %at, "behavior transition");
    }

    fn announce(&mut self, behavior: &str, text: &str) {
        info!(behavior, "{text}");
    }

    fn on_fault(&mut self, behavior: &str, reason: &str) {
        error!(behavior, reason, "behavior removed after fault");
    }

    fn on_tick_end(&mut self, at: Stamp, active: usize, command: Option<DriveCommand>) {
        trace!(%at, active, ?command, "tick end");
    }
}
