//! `sb-control` — the concrete control laws.
//!
//! Every type here implements [`sb_behavior::Behavior`] and is installed into
//! a dispatcher by the composer in `sb-dispatch`.  Each law comes with a
//! `*Params` struct that deserializes from the `[behaviors.*]` tables of the
//! robot config and validates itself.
//!
//! | Module          | Behavior          | Kind                                  |
//! |-----------------|-------------------|---------------------------------------|
//! | [`cruise`]      | `Cruise`          | continuous, lowest layer              |
//! | [`go_to_angle`] | `GoToAngle`       | continuous, steers to goal bearing    |
//! | [`go_to_goal`]  | `GoToGoal`        | writes goal bearing from a point      |
//! | [`avoid`]       | `AvoidObstacles`  | continuous, non-owning                |
//! | [`follow_wall`] | `FollowWall`      | grab-owning                           |
//! | [`stop`]        | `Stop`            | halts, publishes an escape request    |
//! | [`stuck`]       | `StuckDetector`   | publishes `EscapeAny`                 |
//! | [`escape`]      | `Escape`          | ballistic, grab-owning                |
//! | [`teleop`]      | `JoystickTeleop`  | control-device driven                 |
//! | [`chase`]       | `CameraChase`     | target pursuit                        |
//! | [`route`]       | `RouteFollowing`  | waypoint hand-off, grabs to pivot     |
//!
//! Headings are radians, counter-clockwise positive; a positive `omega`
//! turns left.

pub mod avoid;
pub mod chase;
pub mod cruise;
pub mod escape;
pub mod follow_wall;
pub mod go_to_angle;
pub mod go_to_goal;
pub mod limits;
pub mod params;
pub mod route;
pub mod stop;
pub mod stuck;
pub mod teleop;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use avoid::{AvoidObstacles, AvoidParams};
pub use chase::{CameraChase, ChaseParams};
pub use cruise::{Cruise, CruiseParams};
pub use escape::{Escape, EscapeParams, EscapePhase, EscapePlan};
pub use follow_wall::{FollowWall, FollowWallParams, WallSide};
pub use go_to_angle::{GoToAngle, GoToAngleParams};
pub use go_to_goal::{GoToGoal, GoToGoalParams};
pub use params::BehaviorParams;
pub use route::{RouteFollowing, RouteParams, Waypoint};
pub use stop::{Stop, StopParams, classify};
pub use stuck::{StuckDetector, StuckParams};
pub use teleop::{HALT_BUTTON, JoystickTeleop, TeleopParams};
