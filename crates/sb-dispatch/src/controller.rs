//! The outer control loop: one call per tick boundary.

use sb_behavior::Notifier;
use sb_core::{
    Clock, ControlCommand, DriveCommand, RobotPose, RobotState, SensorSnapshot, TickData,
};
use tracing::{debug, warn};

use crate::{Composer, DispatchResult, Dispatcher, Mode, RobotConfig};

/// The motor side of the robot.
pub trait DriveActuator {
    /// Apply a velocity / turn-rate command.
    fn drive(&mut self, command: DriveCommand);

    /// Zero the wheel odometry.
    fn reset_odometry(&mut self) {}
}

/// Owns the dispatcher, the persistent robot state, and the actuator.
///
/// # Tick boundary
///
/// ```text
/// now  = clock.now()
/// data = TickData { now, sensors, state (copied), pose, control }
/// active = dispatcher.tick(&mut data)
/// active == 0        → actuator.drive(STOP)
/// data.command = Some → actuator.drive(command)
/// state = data.state, with velocity/omega set from the sent command
/// ```
pub struct Controller<C: Clock, A: DriveActuator> {
    clock:      C,
    actuator:   A,
    dispatcher: Dispatcher,
    composer:   Composer,
    state:      RobotState,
    mode:       Option<Mode>,
    ticks:      u64,
}

impl<C: Clock, A: DriveActuator> Controller<C, A> {
    pub fn new(config: &RobotConfig, clock: C, actuator: A) -> DispatchResult<Self> {
        Ok(Self {
            clock,
            actuator,
            dispatcher: Dispatcher::new(),
            composer:   Composer::new(config)?,
            state:      RobotState::default(),
            mode:       None,
            ticks:      0,
        })
    }

    /// Route transitions, announcements, and faults to `notifier`.
    ///
    /// Replaces the dispatcher, so call it before the first `install`.
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.dispatcher = Dispatcher::with_notifier(notifier);
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn state(&self) -> &RobotState {
        &self.state
    }

    pub fn mode(&self) -> Option<&Mode> {
        self.mode.as_ref()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// Ticks run since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // ── Mode switching ────────────────────────────────────────────────────

    /// Drain the current mode and install `mode`.  The robot is stopped
    /// while the set is empty.
    pub fn install(&mut self, mode: Mode, pose: RobotPose) -> DispatchResult<()> {
        let mut data = TickData::new(
            self.clock.now(),
            SensorSnapshot::default(),
            self.state.clone(),
            pose,
        );
        self.composer.install(&mut self.dispatcher, &mode, &mut data)?;
        self.actuator.drive(DriveCommand::STOP);
        self.state = data.state;
        self.state.velocity = 0.0;
        self.state.omega = 0.0;
        self.mode = Some(mode);
        Ok(())
    }

    /// Zero odometry and forget any goal expressed in the old frame.
    pub fn reset_odometry(&mut self) {
        self.actuator.reset_odometry();
        self.state.clear_goal();
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Run one tick; returns the command sent to the actuator, if any.
    pub fn tick(
        &mut self,
        sensors: SensorSnapshot,
        pose:    RobotPose,
        control: Vec<ControlCommand>,
    ) -> Option<DriveCommand> {
        let mut data = TickData::new(self.clock.now(), sensors, self.state.clone(), pose);
        data.control = control;

        let active = self.dispatcher.tick(&mut data);
        self.ticks += 1;

        let sent = if active == 0 {
            debug!(at = %data.now, "no active behaviors, stopping");
            Some(DriveCommand::STOP)
        } else {
            data.command
        };

        self.state = data.state;
        if let Some(command) = sent {
            debug!(velocity = command.velocity, omega = command.omega, "drive");
            self.actuator.drive(command);
            self.state.velocity = command.velocity;
            self.state.omega = command.omega;
        }
        sent
    }

    /// Close and drain the current mode, then stop the robot.
    pub fn shutdown(&mut self, pose: RobotPose) -> DispatchResult<()> {
        let mut data = TickData::new(
            self.clock.now(),
            SensorSnapshot::default(),
            self.state.clone(),
            pose,
        );
        self.dispatcher.close();
        let result = self.dispatcher.drain(&mut data, self.composer.drain_limit());
        if let Err(err) = &result {
            warn!(%err, "shutdown drain incomplete");
        }
        self.actuator.drive(DriveCommand::STOP);
        self.state = data.state;
        self.state.velocity = 0.0;
        self.state.omega = 0.0;
        self.mode = None;
        result.map(|_| ())
    }
}
