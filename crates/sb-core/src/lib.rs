//! `sb-core` — foundational types for the subsumption behavior coordinator.
//!
//! This crate is a dependency of every other `sb-*` crate.  It intentionally
//! has no `sb-*` dependencies and minimal external ones (`rand`, `serde` and
//! `thiserror`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`time`]      | `Stamp`, `Clock`, `ManualClock`                           |
//! | [`rng`]       | `BehaviorRng` (per-behavior, seedable)                    |
//! | [`geo`]       | `GeoPoint`, haversine distance, angle helpers             |
//! | [`sensors`]   | `SensorSnapshot`, `RangeReading`, `Ranges`, target, GPS   |
//! | [`pose`]      | `RobotPose`, `RobotState`                                 |
//! | [`drive`]     | `DriveCommand`, `DriveGeometry`                           |
//! | [`control`]   | `ControlCommand` (`speed|v|turn`, `buttonN`)              |
//! | [`tick`]      | `TickData`: the per-tick record every behavior sees       |
//! | [`error`]     | `CoreError`, `CoreResult`                                 |

pub mod control;
pub mod drive;
pub mod error;
pub mod geo;
pub mod pose;
pub mod rng;
pub mod sensors;
pub mod tick;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use control::ControlCommand;
pub use drive::{DriveCommand, DriveGeometry};
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use pose::{RobotPose, RobotState};
pub use rng::BehaviorRng;
pub use sensors::{
    BatteryReading, GpsFix, RangeReading, RangeSide, Ranges, SensorSnapshot, TargetReading,
};
pub use tick::TickData;
pub use time::{Clock, ManualClock, Stamp};
