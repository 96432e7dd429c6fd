//! The view of one tick handed to a single behavior.

use sb_core::{Stamp, TickData};

use crate::{Coordinator, EnablingRequest, Notifier};

/// What a behavior sees while it runs.
///
/// Built by [`Task::resume`][crate::Task::resume] for one behavior and one
/// tick.  The grab helpers are keyed on the task's identity name, so a
/// behavior never has to spell its own name.
pub struct BehaviorContext<'a> {
    name:        &'a str,
    /// The tick's shared record.  Goal-setting behaviors write the
    /// navigation fields of `data.state`; the drive slot is written by the
    /// task after arbitration, not by the behavior.
    pub data:    &'a mut TickData,
    coordinator: &'a mut Coordinator,
    notifier:    &'a mut dyn Notifier,
}

impl<'a> BehaviorContext<'a> {
    pub fn new(
        name:        &'a str,
        data:        &'a mut TickData,
        coordinator: &'a mut Coordinator,
        notifier:    &'a mut dyn Notifier,
    ) -> Self {
        Self { name, data, coordinator, notifier }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.name
    }

    #[inline]
    pub fn now(&self) -> Stamp {
        self.data.now
    }

    #[inline]
    pub fn coordinator(&self) -> &Coordinator {
        self.coordinator
    }

    // ── Grab ──────────────────────────────────────────────────────────────

    pub fn set_grab(&mut self) {
        self.coordinator.set_grab(self.name);
    }

    pub fn try_grab(&mut self) -> bool {
        self.coordinator.try_grab(self.name)
    }

    #[inline]
    pub fn is_grabbed_by_other(&self) -> bool {
        self.coordinator.is_grabbed_by_other(self.name)
    }

    #[inline]
    pub fn owns_grab(&self) -> bool {
        self.coordinator.is_grabbed_by(self.name)
    }

    pub fn clear_grab_if_mine(&mut self) -> bool {
        self.coordinator.clear_grab_if_mine(self.name)
    }

    // ── Enabling request ──────────────────────────────────────────────────

    #[inline]
    pub fn request(&self) -> Option<&EnablingRequest> {
        self.coordinator.request()
    }

    pub fn publish(&mut self, request: EnablingRequest) {
        self.coordinator.publish(request);
    }

    pub fn take_request_if<F>(&mut self, accept: F) -> Option<EnablingRequest>
    where
        F: FnOnce(&EnablingRequest) -> bool,
    {
        self.coordinator.take_request_if(accept)
    }

    // ── Notices ───────────────────────────────────────────────────────────

    pub fn announce(&mut self, text: &str) {
        self.notifier.announce(self.name, text);
    }
}
