//! The `Dispatcher`: cooperative scheduler over the active task set.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use sb_behavior::{Coordinator, NoopNotifier, Notifier, Task};
use sb_core::TickData;
use tracing::{debug, error, warn};

use crate::{DispatchError, DispatchResult};

/// Holds the ordered task set and the arbitration state they share.
///
/// One call to [`tick`][Dispatcher::tick] resumes every task exactly once, in
/// registration order, against the same [`TickData`].  There is no
/// suppression by order: every task runs, and a lower layer only yields
/// because its task drops drive output while another behavior holds the
/// grab.
///
/// # Per-tick sequence
///
/// ```text
/// for task in registration order:
///     resume under catch_unwind      (a panic removes the task, frees its grab)
/// remove Terminated tasks
/// stale-grab sweep                   (owner gone or not fired → release)
/// notifier.on_tick_end
/// ```
pub struct Dispatcher {
    tasks:       Vec<Task>,
    coordinator: Coordinator,
    notifier:    Box<dyn Notifier>,
}

impl Dispatcher {
    /// An empty dispatcher that discards notices.
    pub fn new() -> Self {
        Self::with_notifier(Box::new(NoopNotifier))
    }

    pub fn with_notifier(notifier: Box<dyn Notifier>) -> Self {
        Self {
            tasks:       Vec::new(),
            coordinator: Coordinator::new(),
            notifier,
        }
    }

    // ── Task set ──────────────────────────────────────────────────────────

    /// Append `task`; names are grab keys and must be unique.
    pub fn add(&mut self, task: Task) -> DispatchResult<()> {
        if self.tasks.iter().any(|t| t.name() == task.name()) {
            return Err(DispatchError::DuplicateBehavior(task.name().to_owned()));
        }
        debug!(behavior = %task.name(), slot = self.tasks.len(), "task added");
        self.tasks.push(task);
        Ok(())
    }

    /// Tasks still in the set.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    /// Task names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(Task::name).collect()
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name() == name)
    }

    #[inline]
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    #[inline]
    pub fn coordinator_mut(&mut self) -> &mut Coordinator {
        &mut self.coordinator
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Resume every task once; returns the active count afterwards.
    pub fn tick(&mut self, data: &mut TickData) -> usize {
        let mut faulted = Vec::with_capacity(self.tasks.len());

        for task in self.tasks.iter_mut() {
            let coordinator = &mut self.coordinator;
            let notifier = self.notifier.as_mut();
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                task.resume(data, coordinator, notifier);
            }));

            match result {
                Ok(()) => faulted.push(false),
                Err(payload) => {
                    let reason = panic_reason(payload.as_ref());
                    error!(behavior = %task.name(), %reason, "behavior panicked, removing");
                    coordinator.clear_grab_if_mine(task.name());
                    notifier.on_fault(task.name(), &reason);
                    faulted.push(true);
                }
            }
        }

        let mut faulted = faulted.into_iter();
        self.tasks.retain(|task| {
            let faulted = faulted.next().unwrap_or(false);
            if !faulted && task.is_terminated() {
                debug!(behavior = %task.name(), "task finished");
            }
            !faulted && !task.is_terminated()
        });

        self.sweep_stale_grab();

        let active = self.tasks.len();
        self.notifier.on_tick_end(data.now, active, data.command);
        active
    }

    /// Release a grab whose owner is gone or did not assert authority this
    /// tick.
    fn sweep_stale_grab(&mut self) {
        let Some(owner) = self.coordinator.owner() else {
            return;
        };
        let live = self.tasks.iter().any(|t| t.name() == owner && t.fired());
        if !live {
            warn!(owner, "releasing stale grab");
            self.coordinator.clear_grab();
        }
    }

    // ── Shutdown ──────────────────────────────────────────────────────────

    /// Ask every task to finish at its next resumption.
    pub fn close(&mut self) {
        for task in self.tasks.iter_mut() {
            task.request_exit();
        }
    }

    /// Tick until no task remains, at most `limit` times.
    ///
    /// Returns the number of ticks used.  On exhaustion the remaining tasks
    /// are force-removed (their grab released) and
    /// [`DispatchError::DrainExhausted`] names them.
    pub fn drain(&mut self, data: &mut TickData, limit: usize) -> DispatchResult<usize> {
        let mut iterations = 0;
        while !self.tasks.is_empty() {
            if iterations >= limit {
                return Err(self.force_remove(limit));
            }
            self.tick(data);
            iterations += 1;
        }
        Ok(iterations)
    }

    fn force_remove(&mut self, limit: usize) -> DispatchError {
        let remaining: Vec<String> = self.tasks.iter().map(|t| t.name().to_owned()).collect();
        warn!(limit, ?remaining, "drain exhausted, force-removing tasks");
        for task in self.tasks.drain(..) {
            self.coordinator.clear_grab_if_mine(task.name());
        }
        DispatchError::DrainExhausted { limit, remaining }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tasks", &self.tasks)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
