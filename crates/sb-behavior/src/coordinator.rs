//! The arbitration context shared by every behavior of one dispatcher.
//!
//! `Coordinator` holds two pieces of state:
//!
//! - the **grab**: the name of the behavior that currently owns the drive
//!   output across ticks, or nothing.  A behavior that sees the grab owned by
//!   someone else must not write a drive command.  This is how a ballistic
//!   maneuver suppresses the continuous behaviors for several ticks.
//! - the **enabling request**: a one-shot message that lets one behavior ask
//!   another to activate.  Whoever acts on it clears it.
//!
//! Exactly one `Coordinator` exists per dispatcher; it is lent to each task
//! in turn, so there is never more than one writer at a time.

use tracing::debug;

use crate::EnablingRequest;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Coordinator {
    grab:    Option<String>,
    request: Option<EnablingRequest>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Grab ──────────────────────────────────────────────────────────────

    /// Current grab owner.
    #[inline]
    pub fn owner(&self) -> Option<&str> {
        self.grab.as_deref()
    }

    /// Claim the grab unconditionally, evicting any other owner.
    pub fn set_grab(&mut self, name: &str) {
        if self.grab.as_deref() != Some(name) {
            debug!(behavior = name, previous = ?self.grab, "grab set");
            self.grab = Some(name.to_owned());
        }
    }

    /// Claim the grab only if nobody holds it.  Returns `true` if `name` owns
    /// the grab afterwards (including when it already did).
    pub fn try_grab(&mut self, name: &str) -> bool {
        match self.grab.as_deref() {
            None => {
                debug!(behavior = name, "grab taken");
                self.grab = Some(name.to_owned());
                true
            }
            Some(owner) => owner == name,
        }
    }

    /// `true` if the grab is held by a behavior other than `name`.
    #[inline]
    pub fn is_grabbed_by_other(&self, name: &str) -> bool {
        self.grab.as_deref().is_some_and(|owner| owner != name)
    }

    /// `true` if `name` holds the grab.
    #[inline]
    pub fn is_grabbed_by(&self, name: &str) -> bool {
        self.grab.as_deref() == Some(name)
    }

    /// Release the grab whoever holds it.
    pub fn clear_grab(&mut self) {
        if let Some(owner) = self.grab.take() {
            debug!(behavior = %owner, "grab cleared");
        }
    }

    /// Release the grab only if `name` holds it.  Safe on any exit path.
    pub fn clear_grab_if_mine(&mut self, name: &str) -> bool {
        if self.is_grabbed_by(name) {
            self.grab = None;
            debug!(behavior = name, "grab released");
            true
        } else {
            false
        }
    }

    // ── Enabling request ──────────────────────────────────────────────────

    #[inline]
    pub fn request(&self) -> Option<&EnablingRequest> {
        self.request.as_ref()
    }

    /// Publish a request, replacing any unconsumed one.
    pub fn publish(&mut self, request: EnablingRequest) {
        debug!(request = %request, "enabling request published");
        self.request = Some(request);
    }

    pub fn clear_request(&mut self) {
        self.request = None;
    }

    /// Consume the pending request if `accept` approves of it.
    pub fn take_request_if<F>(&mut self, accept: F) -> Option<EnablingRequest>
    where
        F: FnOnce(&EnablingRequest) -> bool,
    {
        if self.request.as_ref().is_some_and(accept) {
            self.request.take()
        } else {
            None
        }
    }

    /// Forget both the grab and the request.  Called on mode install.
    pub fn reset(&mut self) {
        self.grab = None;
        self.request = None;
    }
}
