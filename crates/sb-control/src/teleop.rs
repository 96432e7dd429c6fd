//! JoystickTeleop: drive from control-device commands.

use serde::Deserialize;

use sb_behavior::{Behavior, BehaviorContext, BehaviorResult, Coordinator, Output};
use sb_core::{ControlCommand, DriveCommand, DriveGeometry, Stamp, TickData};

use crate::limits::require_positive;

/// The button that halts the robot.
pub const HALT_BUTTON: u8 = 0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TeleopParams {
    /// Seconds without input before the held command decays to a stop.
    pub hold_timeout_secs: f64,
}

impl Default for TeleopParams {
    fn default() -> Self {
        Self { hold_timeout_secs: 1.0 }
    }
}

impl TeleopParams {
    pub fn validate(&self) -> BehaviorResult<()> {
        require_positive("teleop.hold_timeout_secs", self.hold_timeout_secs)
    }
}

pub struct JoystickTeleop {
    params:    TeleopParams,
    geometry:  DriveGeometry,
    held:      Option<(DriveCommand, Stamp)>,
    timed_out: bool,
}

impl JoystickTeleop {
    pub fn new(params: TeleopParams, geometry: DriveGeometry) -> Self {
        Self { params, geometry, held: None, timed_out: false }
    }
}

impl Behavior for JoystickTeleop {
    fn kind(&self) -> &'static str {
        "JoystickTeleop"
    }

    fn should_activate(&self, _: &TickData, _: &Coordinator) -> bool {
        true
    }

    fn should_deactivate(&self, _: &TickData, _: &Coordinator) -> bool {
        false
    }

    fn step(&mut self, ctx: &mut BehaviorContext<'_>) -> Output {
        let now = ctx.now();
        for command in &ctx.data.control {
            match *command {
                ControlCommand::Speed { speed, turn } => {
                    self.held = Some((self.geometry.command(speed, turn), now));
                }
                ControlCommand::Button(HALT_BUTTON) => {
                    self.held = Some((DriveCommand::STOP, now));
                }
                ControlCommand::Button(_) => {}
            }
        }

        let Some((command, at)) = self.held else {
            return Output::Pass;
        };
        if ctx.is_grabbed_by_other() {
            return Output::Pass;
        }

        if now.has_elapsed(at, self.params.hold_timeout_secs) {
            if !self.timed_out {
                self.timed_out = true;
                ctx.announce("control link idle, stopping");
            }
            return Output::Drive(DriveCommand::STOP);
        }
        self.timed_out = false;
        Output::Drive(command)
    }
}
