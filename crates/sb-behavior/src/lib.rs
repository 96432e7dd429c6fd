//! `sb-behavior` — behavior trait, task lifecycle, and grab arbitration.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                        |
//! |-----------------|-----------------------------------------------------------------|
//! | [`coordinator`] | `Coordinator`: grab owner and enabling request                  |
//! | [`request`]     | `EnablingRequest`, `EscapeHint`                                 |
//! | [`model`]       | `Behavior` trait, `Output`                                      |
//! | [`conditions`]  | `Conditions`: external predicate overrides                      |
//! | [`context`]     | `BehaviorContext<'a>`: one behavior's view of one tick          |
//! | [`task`]        | `Task`, `Phase`: the per-behavior state machine                 |
//! | [`notifier`]    | `Notifier` trait, `NoopNotifier`, `LogNotifier`                 |
//! | [`error`]       | `BehaviorError`, `BehaviorResult<T>`                            |
//!
//! # Design notes
//!
//! Every active behavior is resumed every tick.  There is no suppression by
//! registration order: a behavior that wants several uninterrupted ticks of
//! control claims the grab, and every other behavior's drive output is
//! dropped by its task while the grab is held.  Continuous behaviors that
//! share the output without the grab compose last-writer-wins.

pub mod conditions;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod notifier;
pub mod request;
pub mod task;


pub use conditions::{Conditions, Predicate};
pub use context::BehaviorContext;
pub use coordinator::Coordinator;
pub use error::{BehaviorError, BehaviorResult};
pub use model::{Behavior, Output};
pub use notifier::{LogNotifier, NoopNotifier, Notifier};
pub use request::{EnablingRequest, EscapeHint};
pub use task::{Phase, Task};
