//! Wall-clock time model.
//!
//! # Design
//!
//! Every behavior timer (escape phases, wall-lost grace period, waypoint and
//! turn timeouts, stuck sampling window) is expressed against a `Stamp`: an
//! integer count of milliseconds since the controller started.  The outer loop
//! reads one `Stamp` from its [`Clock`] per tick and stores it in
//! `TickData::now`, so every behavior sees the same instant for the whole tick.
//!
//! Integer milliseconds keep comparisons exact and make tests trivial: a test
//! advances a [`ManualClock`] (or builds a `Stamp` directly) instead of
//! sleeping.

use std::fmt;

// ── Stamp ─────────────────────────────────────────────────────────────────────

/// A monotonic wall-clock instant, in milliseconds since controller start.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Stamp(pub u64);

impl Stamp {
    pub const ZERO: Stamp = Stamp(0);

    /// Build a stamp from (possibly fractional) seconds.
    #[inline]
    pub fn from_secs_f64(secs: f64) -> Stamp {
        Stamp((secs.max(0.0) * 1_000.0).round() as u64)
    }

    /// Milliseconds elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn millis_since(self, earlier: Stamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Seconds elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn secs_since(self, earlier: Stamp) -> f64 {
        self.millis_since(earlier) as f64 / 1_000.0
    }

    /// `true` once at least `secs` have passed since `earlier`.
    #[inline]
    pub fn has_elapsed(self, earlier: Stamp, secs: f64) -> bool {
        self.secs_since(earlier) >= secs
    }

    /// Seconds since controller start.
    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Source of the per-tick [`Stamp`].
pub trait Clock {
    fn now(&self) -> Stamp;
}

/// Hand-advanced clock for simulations and tests.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    current: Stamp,
}

impl ManualClock {
    pub fn new(start: Stamp) -> Self {
        Self { current: start }
    }

    /// Advance by `millis` milliseconds.
    #[inline]
    pub fn advance_millis(&mut self, millis: u64) {
        self.current = Stamp(self.current.0 + millis);
    }

    #[inline]
    pub fn set(&mut self, stamp: Stamp) {
        self.current = stamp;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Stamp {
        self.current
    }
}
