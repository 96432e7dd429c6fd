//! Robot configuration, loadable from TOML.
//!
//! Every field has a default, so an empty file is a valid config:
//!
//! ```toml
//! seed        = 7
//! drain_limit = 16
//!
//! [geometry]
//! speed_factor = 0.005   # m/s per speed unit
//! turn_factor  = 0.02    # rad/s per turn unit
//!
//! [behaviors.escape]
//! jitter = 0.25
//!
//! [behaviors.follow_wall]
//! target_distance = 0.35
//! ```

use std::path::Path;

use serde::Deserialize;

use sb_control::BehaviorParams;
use sb_core::{CoreError, DriveGeometry};

use crate::{DispatchError, DispatchResult};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Global seed; each behavior's RNG is derived from it and its slot.
    pub seed: u64,
    /// Upper bound on drain ticks when switching modes.
    pub drain_limit: usize,
    pub geometry: DriveGeometry,
    pub behaviors: BehaviorParams,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            seed:        0,
            drain_limit: 16,
            geometry:    DriveGeometry::default(),
            behaviors:   BehaviorParams::default(),
        }
    }
}

impl RobotConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> DispatchResult<Self> {
        let config: RobotConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> DispatchResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(CoreError::from)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> DispatchResult<()> {
        if self.drain_limit == 0 {
            return Err(DispatchError::Config("drain_limit must be at least 1".into()));
        }
        let g = &self.geometry;
        for (what, factor) in [("speed_factor", g.speed_factor), ("turn_factor", g.turn_factor)] {
            if !(factor.is_finite() && factor > 0.0) {
                return Err(DispatchError::Config(format!(
                    "geometry.{what} must be positive, got {factor}"
                )));
            }
        }
        self.behaviors.validate()?;
        Ok(())
    }
}
