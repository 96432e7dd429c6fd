//! Externally supplied predicate overrides.

use sb_core::TickData;

/// A pure predicate over the tick's data.
pub type Predicate = Box<dyn Fn(&TickData) -> bool>;

/// Optional activate / deactivate / terminate overrides for one task.
///
/// Unset predicates fall back to the behavior's own methods, whose defaults
/// are activate = never, deactivate = always, terminate = never.
///
/// ```rust,ignore
/// let conditions = Conditions::new()
///     .activate(|d| d.sensors.ranges.front.is_some())
///     .deactivate(|_| false);
/// ```
#[derive(Default)]
pub struct Conditions {
    pub(crate) activate:   Option<Predicate>,
    pub(crate) deactivate: Option<Predicate>,
    pub(crate) terminate:  Option<Predicate>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate<F>(mut self, f: F) -> Self
    where
        F: Fn(&TickData) -> bool + 'static,
    {
        self.activate = Some(Box::new(f));
        self
    }

    pub fn deactivate<F>(mut self, f: F) -> Self
    where
        F: Fn(&TickData) -> bool + 'static,
    {
        self.deactivate = Some(Box::new(f));
        self
    }

    pub fn terminate<F>(mut self, f: F) -> Self
    where
        F: Fn(&TickData) -> bool + 'static,
    {
        self.terminate = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for Conditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conditions")
            .field("activate", &self.activate.is_some())
            .field("deactivate", &self.deactivate.is_some())
            .field("terminate", &self.terminate.is_some())
            .finish()
    }
}
