//! wander — drive the behavior coordinator around a simulated arena.
//!
//! ```text
//! cargo run -p wander -- --mode wander --seconds 120
//! cargo run -p wander -- --mode goto --goal 2.0,-2.0
//! cargo run -p wander -- --mode route --waypoints "2,2;-2,2;-2,-2"
//! cargo run -p wander -- --mode teleop --control "speed|60|10"
//! RUST_LOG=debug cargo run -p wander -- --config robot.toml
//! ```

mod world;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use sb_behavior::{EnablingRequest, LogNotifier};
use sb_control::Waypoint;
use sb_core::{Clock, ControlCommand, DriveCommand, ManualClock, Stamp};
use sb_dispatch::{Controller, DriveActuator, Mode, RobotConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use world::World;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ModeArg {
    Wander,
    Teleop,
    Escape,
    Route,
    Chase,
    Goto,
}

#[derive(Parser)]
#[command(name = "wander")]
#[command(about = "Run the subsumption behavior coordinator in a simulated arena")]
struct Args {
    /// Robot configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Behavior set to install
    #[arg(long, value_enum, default_value = "wander")]
    mode: ModeArg,

    /// Simulated run time in seconds
    #[arg(long, default_value = "60")]
    seconds: f64,

    /// Tick period in milliseconds
    #[arg(long, default_value = "100")]
    tick_ms: u64,

    /// Override the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Goal point for goto mode, as "x,y"
    #[arg(long, value_parser = parse_point)]
    goal: Option<(f64, f64)>,

    /// Waypoints for route mode, as "x,y;x,y;..."
    #[arg(long, value_delimiter = ';', value_parser = parse_point)]
    waypoints: Vec<(f64, f64)>,

    /// Request for escape mode (Escape, EscapeLeft, EscapeFullTurn, ...)
    #[arg(long, default_value = "Escape")]
    request: String,

    /// Control-device message repeated every tick in teleop mode
    #[arg(long)]
    control: Vec<String>,
}

fn parse_point(text: &str) -> Result<(f64, f64), String> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got {text:?}"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("{x:?}: {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("{y:?}: {e}"))?;
    Ok((x, y))
}

/// Motor stand-in: keeps the last command for the world to integrate.
#[derive(Default)]
struct SimMotors {
    command:         DriveCommand,
    odometry_resets: u32,
}

impl DriveActuator for SimMotors {
    fn drive(&mut self, command: DriveCommand) {
        self.command = command;
    }

    fn reset_odometry(&mut self) {
        self.odometry_resets += 1;
    }
}

fn build_mode(args: &Args) -> Result<Mode> {
    Ok(match args.mode {
        ModeArg::Wander => Mode::Wander,
        ModeArg::Teleop => Mode::Teleop,
        ModeArg::Chase  => Mode::Chase,
        ModeArg::Escape => {
            let request: EnablingRequest = args
                .request
                .parse()
                .with_context(|| format!("bad escape request {:?}", args.request))?;
            Mode::Escape(request)
        }
        ModeArg::Goto => {
            let Some((x, y)) = args.goal else {
                bail!("--mode goto needs --goal x,y");
            };
            Mode::GoTo { x, y }
        }
        ModeArg::Route => {
            if args.waypoints.is_empty() {
                bail!("--mode route needs --waypoints");
            }
            Mode::Route(args.waypoints.iter().map(|&(x, y)| Waypoint::Local { x, y }).collect())
        }
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if args.tick_ms == 0 {
        bail!("--tick-ms must be positive");
    }

    let mut config = match &args.config {
        Some(path) => RobotConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RobotConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let control = args
        .control
        .iter()
        .map(|text| ControlCommand::parse(text))
        .collect::<Result<Vec<_>, _>>()?;
    let mode = build_mode(&args)?;

    let mut world = World::arena();
    let mut controller = Controller::new(&config, ManualClock::new(Stamp::ZERO), SimMotors::default())?
        .with_notifier(Box::new(LogNotifier));

    info!(%mode, seed = config.seed, seconds = args.seconds, "starting");
    controller.install(mode, world.pose())?;

    let dt = args.tick_ms as f64 / 1_000.0;
    let ticks = (args.seconds / dt).ceil() as u64;
    let report_every = (1_000 / args.tick_ms).max(1);

    for i in 0..ticks {
        let now = controller.clock().now();
        controller.tick(world.sense(now), world.pose(), control.clone());
        world.step(controller.actuator().command, dt);
        controller.clock_mut().advance_millis(args.tick_ms);

        if i % report_every == 0 {
            let pose = world.pose();
            info!(
                at = %now,
                x = format_args!("{:.2}", pose.x),
                y = format_args!("{:.2}", pose.y),
                heading = format_args!("{:.2}", pose.heading),
                active = controller.dispatcher().active_count(),
                grab = ?controller.dispatcher().coordinator().owner(),
                "pose"
            );
        }
    }

    if let Err(err) = controller.shutdown(world.pose()) {
        warn!(%err, "shutdown");
    }
    world.reset_odometry();
    controller.reset_odometry();

    info!(
        ticks = controller.ticks(),
        travelled = format_args!("{:.2}", world.travelled()),
        bumps = world.bumps(),
        odometry_resets = controller.actuator().odometry_resets,
        "done"
    );
    Ok(())
}
