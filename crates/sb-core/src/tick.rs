//! The per-tick data record shared by every behavior.

use crate::{ControlCommand, DriveCommand, RobotPose, RobotState, SensorSnapshot, Stamp};

/// Everything one tick of the controller knows.
///
/// `TickData` is built fresh by the outer loop at every tick boundary, lent
/// to each behavior in registration order, and discarded afterwards.  The
/// `command` slot starts empty; behaviors that win arbitration write into it
/// and the last accepted write is what the actuator receives.
#[derive(Clone, Debug, Default)]
pub struct TickData {
    /// Wall-clock instant of this tick.
    pub now: Stamp,
    pub sensors: SensorSnapshot,
    pub state: RobotState,
    pub pose: RobotPose,
    /// Control-device messages received since the previous tick.
    pub control: Vec<ControlCommand>,
    /// Output slot; `None` means no behavior produced a command.
    pub command: Option<DriveCommand>,
}

impl TickData {
    pub fn new(now: Stamp, sensors: SensorSnapshot, state: RobotState, pose: RobotPose) -> Self {
        Self { now, sensors, state, pose, control: Vec::new(), command: None }
    }

    /// The motion a behavior should treat as "current": this tick's command
    /// if an earlier behavior already wrote one, otherwise the previous
    /// tick's commanded motion.
    #[inline]
    pub fn current_motion(&self) -> DriveCommand {
        self.command
            .unwrap_or(DriveCommand::new(self.state.velocity, self.state.omega))
    }
}
