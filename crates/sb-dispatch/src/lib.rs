//! `sb-dispatch` — scheduler, mode composer, and outer control loop.
//!
//! # One tick
//!
//! ```text
//! Controller::tick(sensors, pose, control)
//!   ① TickData built from the clock stamp, sensors, copied robot state, pose
//!   ② Dispatcher::tick: every task resumed once, in registration order;
//!                        panicking tasks removed; stale grab released
//!   ③ active == 0      → DriveActuator::drive(STOP)
//!      command written → DriveActuator::drive(command)
//!   ④ robot state copied back (goal hand-offs, last commanded motion)
//! ```
//!
//! # Switching modes
//!
//! [`Composer::install`] closes the current set, drains it to zero active
//! tasks (bounded by `drain_limit`), resets the coordinator, and adds the new
//! mode's behaviors.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sb_core::{ManualClock, RobotPose, SensorSnapshot, Stamp};
//! use sb_dispatch::{Controller, Mode, RobotConfig};
//!
//! let config = RobotConfig::load("robot.toml")?;
//! let mut controller = Controller::new(&config, ManualClock::new(Stamp::ZERO), motors)?;
//! controller.install(Mode::Wander, RobotPose::default())?;
//! loop {
//!     let sent = controller.tick(read_sensors(), read_pose(), Vec::new());
//! }
//! ```

pub mod composer;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;


pub use composer::{Composer, Mode};
pub use config::RobotConfig;
pub use controller::{Controller, DriveActuator};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchResult};
