//! Unit tests for sb-control.

use sb_behavior::{
    Behavior, BehaviorContext, BehaviorError, Coordinator, EnablingRequest, EscapeHint,
    NoopNotifier, Notifier, Output, Phase, Task,
};
use sb_core::{
    BehaviorRng, ControlCommand, DriveCommand, DriveGeometry, RangeReading, Ranges, Stamp,
    TargetReading, TickData,
};

use crate::*;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn reading(meters: f64) -> Option<RangeReading> {
    Some(RangeReading::new(meters, 0.02, 4.0))
}

fn ranges(
    front: Option<f64>,
    left:  Option<f64>,
    right: Option<f64>,
    rear:  Option<f64>,
) -> Ranges {
    Ranges {
        front: front.and_then(reading),
        left:  left.and_then(reading),
        right: right.and_then(reading),
        rear:  rear.and_then(reading),
    }
}

fn tick_at(millis: u64) -> TickData {
    TickData { now: Stamp(millis), ..Default::default() }
}

/// Counts announcements.
#[derive(Default)]
struct Recorder {
    notices: Vec<String>,
}

impl Notifier for Recorder {
    fn announce(&mut self, _behavior: &str, text: &str) {
        self.notices.push(text.to_owned());
    }
}

fn step_with<B: Behavior>(
    behavior:    &mut B,
    data:        &mut TickData,
    coordinator: &mut Coordinator,
    notifier:    &mut dyn Notifier,
) -> Output {
    let name = behavior.kind();
    let mut ctx = BehaviorContext::new(name, data, coordinator, notifier);
    behavior.step(&mut ctx)
}

fn step<B: Behavior>(behavior: &mut B, data: &mut TickData, coordinator: &mut Coordinator) -> Output {
    step_with(behavior, data, coordinator, &mut NoopNotifier)
}

fn activate<B: Behavior>(behavior: &mut B, data: &mut TickData, coordinator: &mut Coordinator) {
    let name = behavior.kind();
    let mut notifier = NoopNotifier;
    let mut ctx = BehaviorContext::new(name, data, coordinator, &mut notifier);
    behavior.on_activate(&mut ctx);
}

fn resume_all(tasks: &mut [Task], data: &mut TickData, coordinator: &mut Coordinator) {
    let mut notifier = NoopNotifier;
    for task in tasks.iter_mut() {
        task.resume(data, coordinator, &mut notifier);
    }
}

fn drive(output: Output) -> DriveCommand {
    match output {
        Output::Drive(cmd) => cmd,
        other => panic!("expected a drive command, got {other:?}"),
    }
}

// ── Thresholds ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod threshold_tests {
    use super::*;

    #[test]
    fn avoid_and_stop_distances_stay_in_bounds_across_unit_range() {
        let geometry = DriveGeometry::default();
        let avoid = AvoidParams::default();
        let stop = StopParams::default();
        for units in -100..=100 {
            let v = geometry.velocity(units as f64);
            let a = avoid.distance_for(v);
            let s = stop.distance_for(v);
            assert!((avoid.min_distance..=avoid.max_distance).contains(&a), "avoid {a} at {v}");
            assert!((stop.min_distance..=stop.max_distance).contains(&s), "stop {s} at {v}");
        }
        assert_eq!(avoid.distance_for(0.0), avoid.min_distance);
        assert_eq!(stop.distance_for(0.0), stop.min_distance);
    }

    #[test]
    fn non_finite_velocity_uses_minimum() {
        let avoid = AvoidParams::default();
        assert_eq!(avoid.distance_for(f64::NAN), avoid.min_distance);
        assert_eq!(avoid.distance_for(f64::INFINITY), avoid.min_distance);
    }

    #[test]
    fn clamp_abs_zeroes_nan() {
        assert_eq!(limits::clamp_abs(f64::NAN, 1.0), 0.0);
        assert_eq!(limits::clamp_abs(3.0, 1.0), 1.0);
        assert_eq!(limits::clamp_abs(-3.0, 1.0), -1.0);
    }

    #[test]
    fn default_params_validate() {
        assert!(BehaviorParams::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_jitter_rejected() {
        let mut params = BehaviorParams::default();
        params.escape.jitter = 1.0;
        assert!(matches!(params.validate(), Err(BehaviorError::Config(_))));
    }

    #[test]
    fn inverted_bounds_rejected() {
        let params = AvoidParams { min_distance: 0.8, max_distance: 0.2, ..Default::default() };
        assert!(params.validate().is_err());
    }
}

// ── Cruise / GoToAngle / GoToGoal ─────────────────────────────────────────────

#[cfg(test)]
mod navigation_tests {
    use super::*;

    #[test]
    fn cruise_drives_straight() {
        let mut cruise = Cruise::new(CruiseParams::default());
        let mut data = tick_at(0);
        let mut coordinator = Coordinator::new();
        let cmd = drive(step(&mut cruise, &mut data, &mut coordinator));
        assert_eq!(cmd, DriveCommand::new(0.2, 0.0));
    }

    #[test]
    fn cruise_yields_to_grab_owner() {
        let mut cruise = Cruise::new(CruiseParams::default());
        let mut data = tick_at(0);
        let mut coordinator = Coordinator::new();
        coordinator.set_grab("Escape");
        assert_eq!(step(&mut cruise, &mut data, &mut coordinator), Output::Pass);
    }

    #[test]
    fn go_to_angle_prefers_absolute_bearing() {
        let mut data = tick_at(0);
        data.pose.heading = 0.5;
        data.state.goal_bearing = Some(0.5);
        data.state.goal_bearing_rel = Some(1.0);
        let mut gta = GoToAngle::new(GoToAngleParams::default());
        let cmd = drive(step(&mut gta, &mut data, &mut Coordinator::new()));
        assert!(close(cmd.omega, 0.0));
        assert!(close(cmd.velocity, 0.2));
    }

    #[test]
    fn go_to_angle_inactive_without_goal() {
        let gta = GoToAngle::new(GoToAngleParams::default());
        assert!(!gta.should_activate(&tick_at(0), &Coordinator::new()));
    }

    #[test]
    fn go_to_goal_hands_bearing_to_go_to_angle() {
        let mut tasks = vec![
            Task::new(GoToGoal::new(GoToGoalParams::default())),
            Task::new(GoToAngle::new(GoToAngleParams::default())),
        ];
        let mut coordinator = Coordinator::new();

        let mut data = tick_at(0);
        data.state.goal_xy = Some((3.0, 4.0));
        resume_all(&mut tasks, &mut data, &mut coordinator);

        assert_eq!(data.state.goal_distance, Some(5.0));
        let cmd = data.command.expect("GoToAngle should steer");
        // atan2(4, 3) ≈ 0.927 rad: omega saturates, velocity scales by cos.
        assert!(close(cmd.omega, 1.0));
        assert!(close(cmd.velocity, 0.2 * 0.6));
        assert_eq!(tasks[1].phase(), Phase::Activated);

        let mut data = TickData { now: Stamp(100), state: data.state.clone(), ..Default::default() };
        data.pose.x = 2.9;
        data.pose.y = 3.9;
        resume_all(&mut tasks, &mut data, &mut coordinator);

        assert_eq!(data.command, Some(DriveCommand::STOP));
        assert_eq!(data.state.goal_xy, None);
        assert_eq!(data.state.goal_bearing, None);
        assert_eq!(tasks[0].phase(), Phase::Dormant);
        assert_eq!(tasks[1].phase(), Phase::Dormant);
    }
}

// ── AvoidObstacles ────────────────────────────────────────────────────────────

#[cfg(test)]
mod avoid_tests {
    use super::*;

    fn moving(millis: u64, velocity: f64) -> TickData {
        let mut data = tick_at(millis);
        data.state.velocity = velocity;
        data
    }

    #[test]
    fn left_obstacle_turns_right_and_slows() {
        let mut avoid = AvoidObstacles::new(AvoidParams::default());
        let mut data = moving(0, 0.2);
        data.sensors.ranges = ranges(None, Some(0.10), Some(0.50), None);
        let cmd = drive(step(&mut avoid, &mut data, &mut Coordinator::new()));
        assert!(close(cmd.omega, -1.0));
        assert!(close(cmd.velocity, 0.05));
    }

    #[test]
    fn both_sides_blocked_turns_away_from_closer() {
        let mut avoid = AvoidObstacles::new(AvoidParams::default());
        let mut data = moving(0, 0.2);
        data.sensors.ranges = ranges(None, Some(0.25), Some(0.15), None);
        let cmd = drive(step(&mut avoid, &mut data, &mut Coordinator::new()));
        assert!(close(cmd.omega, 1.0));
    }

    #[test]
    fn front_only_reverses() {
        let mut avoid = AvoidObstacles::new(AvoidParams::default());
        let mut data = moving(0, 0.2);
        data.sensors.ranges = ranges(Some(0.1), Some(2.0), Some(1.0), None);
        let cmd = drive(step(&mut avoid, &mut data, &mut Coordinator::new()));
        assert!(cmd.velocity < 0.0);
        assert!(close(cmd.omega, 1.0), "turns toward the roomier left side");
    }

    #[test]
    fn correction_decays_linearly() {
        let mut avoid = AvoidObstacles::new(AvoidParams::default());
        let mut coordinator = Coordinator::new();

        let mut data = moving(0, 0.2);
        data.sensors.ranges = ranges(None, Some(0.10), None, None);
        drive(step(&mut avoid, &mut data, &mut coordinator));

        // Obstacle gone: first clear tick holds the full correction.
        let mut data = moving(100, 0.05);
        let cmd = drive(step(&mut avoid, &mut data, &mut coordinator));
        assert!(close(cmd.omega, -1.0));

        let mut data = moving(350, 0.05);
        let cmd = drive(step(&mut avoid, &mut data, &mut coordinator));
        assert!(close(cmd.omega, -0.5));
        assert!(close(cmd.velocity, 0.2 * (1.0 - 0.75 * 0.5)));

        let mut data = moving(600, 0.05);
        assert_eq!(step(&mut avoid, &mut data, &mut coordinator), Output::Pass);
    }

    #[test]
    fn stationary_robot_ignores_obstacles() {
        let mut avoid = AvoidObstacles::new(AvoidParams::default());
        let mut data = moving(0, 0.0);
        data.sensors.ranges = ranges(Some(0.05), Some(0.05), Some(0.05), None);
        assert_eq!(step(&mut avoid, &mut data, &mut Coordinator::new()), Output::Pass);
    }

    #[test]
    fn invalid_reading_is_ignored() {
        let mut avoid = AvoidObstacles::new(AvoidParams::default());
        let mut data = moving(0, 0.2);
        data.sensors.ranges.left = Some(RangeReading::new(0.01, 0.02, 4.0));
        assert_eq!(step(&mut avoid, &mut data, &mut Coordinator::new()), Output::Pass);
    }
}

// ── Stop + Escape ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod stop_tests {
    use super::*;

    #[test]
    fn classification_table() {
        let cases = [
            (ranges(None, Some(0.1), Some(0.1), Some(0.1)), EscapeHint::None),
            (ranges(None, Some(0.1), Some(0.1), None), EscapeHint::FullTurn),
            (ranges(None, Some(0.1), None, Some(0.1)), EscapeHint::RightTurn),
            (ranges(None, Some(0.1), None, None), EscapeHint::Left),
            (ranges(None, None, Some(0.1), Some(0.1)), EscapeHint::LeftTurn),
            (ranges(None, None, Some(0.1), None), EscapeHint::Right),
            (ranges(None, None, None, None), EscapeHint::Any),
        ];
        for (r, expected) in cases {
            assert_eq!(classify(&r, 0.35, 0.25), expected, "{r:?}");
        }
    }

    #[test]
    fn rear_blocked_pivots_toward_roomier_side() {
        let r = ranges(None, Some(0.5), Some(1.5), Some(0.1));
        assert_eq!(classify(&r, 0.35, 0.25), EscapeHint::RightTurn);
        let r = ranges(None, Some(1.5), Some(0.5), Some(0.1));
        assert_eq!(classify(&r, 0.35, 0.25), EscapeHint::LeftTurn);
    }

    #[test]
    fn front_and_left_blocked_requests_escape_left() {
        let mut stop = Stop::new(StopParams::default());
        let mut coordinator = Coordinator::new();
        let mut data = tick_at(0);
        data.state.velocity = 0.2;
        data.sensors.ranges = ranges(Some(0.1), Some(0.2), Some(1.0), None);

        let cmd = drive(step(&mut stop, &mut data, &mut coordinator));
        assert_eq!(cmd, DriveCommand::STOP);
        assert_eq!(coordinator.request(), Some(&EnablingRequest::Escape(EscapeHint::Left)));

        // Escape consumes the request and pivots right.
        let mut escape = Escape::new(EscapeParams::default(), BehaviorRng::new(7, 0));
        assert!(escape.should_activate(&data, &coordinator));
        activate(&mut escape, &mut data, &mut coordinator);
        assert_eq!(coordinator.request(), None);
        assert_eq!(coordinator.owner(), Some("Escape"));

        let plan = *escape.plan().expect("plan drawn on activation");
        assert!(plan.turn < 0.0);
        assert!((0.9..=1.5).contains(&plan.turn.abs()), "turn {}", plan.turn);
        assert!(plan.straight_velocity < 0.0);
    }

    #[test]
    fn reversing_into_rear_obstacle_requests_forward() {
        let mut stop = Stop::new(StopParams::default());
        let mut coordinator = Coordinator::new();
        let mut data = tick_at(0);
        data.state.velocity = -0.2;
        data.sensors.ranges = ranges(None, None, None, Some(0.1));
        drive(step(&mut stop, &mut data, &mut coordinator));
        assert_eq!(coordinator.request(), Some(&EnablingRequest::Escape(EscapeHint::Forward)));
    }

    #[test]
    fn clear_path_passes() {
        let mut stop = Stop::new(StopParams::default());
        let mut coordinator = Coordinator::new();
        let mut data = tick_at(0);
        data.state.velocity = 0.2;
        data.sensors.ranges = ranges(Some(1.0), None, None, None);
        assert_eq!(step(&mut stop, &mut data, &mut coordinator), Output::Pass);
        assert_eq!(coordinator.request(), None);
    }

    #[test]
    fn stop_then_escape_in_one_tick() {
        let mut tasks = vec![
            Task::new(Stop::new(StopParams::default())),
            Task::new(Escape::new(EscapeParams::default(), BehaviorRng::new(1, 1))),
        ];
        let mut coordinator = Coordinator::new();
        let mut data = tick_at(0);
        data.state.velocity = 0.2;
        data.sensors.ranges = ranges(Some(0.1), Some(0.2), Some(1.0), None);
        resume_all(&mut tasks, &mut data, &mut coordinator);

        assert_eq!(tasks[1].phase(), Phase::Activated);
        assert_eq!(coordinator.owner(), Some("Escape"));
        let cmd = data.command.expect("escape drives");
        assert!(cmd.velocity < 0.0);
    }
}

// ── Escape ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod escape_tests {
    use super::*;

    fn escape_task(one_shot: bool) -> Task {
        let escape = Escape::new(EscapeParams::default(), BehaviorRng::new(42, 3));
        Task::new(if one_shot { escape.one_shot() } else { escape })
    }

    #[test]
    fn one_cycle_runs_three_timed_phases() {
        let mut task = escape_task(false);
        let mut coordinator = Coordinator::new();
        coordinator.publish(EnablingRequest::Escape(EscapeHint::Any));

        let mut seen = Vec::new();
        for millis in (0..=3000).step_by(100) {
            let mut data = tick_at(millis);
            task.resume(&mut data, &mut coordinator, &mut NoopNotifier);
            seen.push((millis, data.command, task.phase()));
        }

        let at = |ms: u64| seen.iter().find(|(t, ..)| *t == ms).copied().expect("tick");
        let (_, straight, _) = at(500);
        let straight = straight.expect("straight");
        assert!(straight.velocity < 0.0 && straight.omega == 0.0);

        let (_, pivot, _) = at(1500);
        let pivot = pivot.expect("pivot");
        assert!(pivot.velocity == 0.0 && pivot.omega != 0.0);

        let (_, counter, _) = at(2500);
        let counter = counter.expect("counter");
        assert!(counter.velocity > 0.0);
        assert!(counter.omega.signum() == -pivot.omega.signum());

        let (_, end, phase) = at(3000);
        assert_eq!(end, Some(DriveCommand::STOP));
        assert_eq!(phase, Phase::Dormant);
        assert_eq!(coordinator.owner(), None);
    }

    #[test]
    fn one_shot_terminates_after_cycle() {
        let mut task = escape_task(true);
        let mut coordinator = Coordinator::new();
        coordinator.publish(EnablingRequest::Escape(EscapeHint::Right));
        for millis in (0..=3100).step_by(100) {
            let mut data = tick_at(millis);
            task.resume(&mut data, &mut coordinator, &mut NoopNotifier);
        }
        assert!(task.is_terminated());
        assert_eq!(coordinator.owner(), None);
    }

    #[test]
    fn counter_phase_cut_short_by_front_obstacle() {
        let mut task = escape_task(false);
        let mut coordinator = Coordinator::new();
        coordinator.publish(EnablingRequest::Escape(EscapeHint::Any));
        for millis in (0..=2000).step_by(100) {
            let mut data = tick_at(millis);
            data.sensors.ranges = ranges(Some(0.1), None, None, None);
            task.resume(&mut data, &mut coordinator, &mut NoopNotifier);
        }
        assert_eq!(task.phase(), Phase::Dormant);
    }

    #[test]
    fn turn_in_place_hints_skip_straight_phase() {
        let mut escape = Escape::new(EscapeParams::default(), BehaviorRng::new(0, 0));
        let plan = escape.plan_for(EscapeHint::LeftTurn);
        assert_eq!(plan.straight_velocity, 0.0);
        assert!(plan.turn > 0.0);

        let mut coordinator = Coordinator::new();
        coordinator.publish(EnablingRequest::Escape(EscapeHint::LeftTurn));
        let mut data = tick_at(0);
        activate(&mut escape, &mut data, &mut coordinator);
        let cmd = drive(step(&mut escape, &mut data, &mut coordinator));
        assert_eq!(escape.phase(), EscapePhase::Pivot);
        assert!(cmd.omega > 0.0 && cmd.velocity == 0.0);
    }

    #[test]
    fn full_turn_pivots_twice_as_long() {
        let mut escape = Escape::new(EscapeParams::default(), BehaviorRng::new(0, 0));
        assert_eq!(escape.plan_for(EscapeHint::FullTurn).pivot_secs, 2.0);
        assert_eq!(escape.plan_for(EscapeHint::Any).pivot_secs, 1.0);
    }

    #[test]
    fn jitter_is_deterministic_per_seed() {
        let mut a = Escape::new(EscapeParams::default(), BehaviorRng::new(9, 2));
        let mut b = Escape::new(EscapeParams::default(), BehaviorRng::new(9, 2));
        assert_eq!(a.plan_for(EscapeHint::Any), b.plan_for(EscapeHint::Any));
    }

    #[test]
    fn ignores_named_requests() {
        let escape = Escape::new(EscapeParams::default(), BehaviorRng::new(0, 0));
        let mut coordinator = Coordinator::new();
        coordinator.publish(EnablingRequest::Named("Dock".into()));
        assert!(!escape.should_activate(&tick_at(0), &coordinator));
    }
}

// ── StuckDetector ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod stuck_tests {
    use super::*;

    fn run(velocity: f64, ticks: impl Fn(u64) -> (i64, i64), until_ms: u64) -> (u32, u32) {
        let mut stuck = StuckDetector::new(StuckParams::default());
        let mut coordinator = Coordinator::new();
        let mut signals = 0;
        for millis in (0..=until_ms).step_by(100) {
            let mut data = tick_at(millis);
            data.state.velocity = velocity;
            let (l, r) = ticks(millis);
            data.sensors.left_ticks = Some(l);
            data.sensors.right_ticks = Some(r);
            if step(&mut stuck, &mut data, &mut coordinator) == Output::Signal {
                signals += 1;
                assert_eq!(coordinator.request(), Some(&EnablingRequest::Escape(EscapeHint::Any)));
                coordinator.clear_request();
            }
        }
        (signals, stuck.detections())
    }

    #[test]
    fn frozen_wheels_fire_once_per_interval() {
        let (signals, detections) = run(10.0, |_| (100, 100), 6000);
        assert_eq!(signals, 3);
        assert_eq!(detections, 3);
    }

    #[test]
    fn never_fires_when_not_commanded() {
        let (signals, _) = run(0.0, |_| (100, 100), 6000);
        assert_eq!(signals, 0);
    }

    #[test]
    fn turning_wheels_do_not_fire() {
        let (signals, _) = run(10.0, |ms| (ms as i64, ms as i64), 6000);
        assert_eq!(signals, 0);
    }

    #[test]
    fn fires_while_another_behavior_holds_the_grab() {
        let mut stuck = StuckDetector::new(StuckParams::default());
        let mut coordinator = Coordinator::new();
        coordinator.set_grab("FollowWall");
        let mut signals = Vec::new();
        for millis in (0..=2000).step_by(100) {
            let mut data = tick_at(millis);
            data.state.velocity = 0.2;
            data.sensors.left_ticks = Some(100);
            data.sensors.right_ticks = Some(100);
            if step(&mut stuck, &mut data, &mut coordinator) == Output::Signal {
                signals.push(millis);
            }
        }
        assert_eq!(signals, vec![2000]);
        assert_eq!(coordinator.request(), Some(&EnablingRequest::Escape(EscapeHint::Any)));
        assert_eq!(coordinator.owner(), Some("FollowWall"));
    }

    #[test]
    fn missing_encoders_never_fire() {
        let mut stuck = StuckDetector::new(StuckParams::default());
        let mut coordinator = Coordinator::new();
        for millis in (0..=6000).step_by(100) {
            let mut data = tick_at(millis);
            data.state.velocity = 10.0;
            assert_eq!(step(&mut stuck, &mut data, &mut coordinator), Output::Pass);
        }
    }
}

// ── FollowWall ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod follow_wall_tests {
    use super::*;

    fn with_left(millis: u64, left: Option<f64>) -> TickData {
        let mut data = tick_at(millis);
        data.sensors.ranges = ranges(None, left, None, None);
        data
    }

    #[test]
    fn tracks_wall_inside_envelope() {
        let mut wall = FollowWall::new(FollowWallParams::default());
        let mut coordinator = Coordinator::new();
        let mut data = with_left(0, Some(0.3));
        assert!(wall.should_activate(&data, &coordinator));
        activate(&mut wall, &mut data, &mut coordinator);
        assert_eq!(wall.side(), Some(WallSide::Left));
        assert_eq!(coordinator.owner(), Some("FollowWall"));

        // 0.1 m too close to a left wall: steer right.
        let cmd = drive(step(&mut wall, &mut data, &mut coordinator));
        assert!(close(cmd.omega, -0.2));
        assert!(close(cmd.velocity, 0.2));
    }

    #[test]
    fn concave_corner_pivots_away() {
        let mut wall = FollowWall::new(FollowWallParams::default());
        let mut coordinator = Coordinator::new();
        let mut data = with_left(0, Some(0.4));
        data.sensors.ranges.front = reading(0.3);
        activate(&mut wall, &mut data, &mut coordinator);
        let cmd = drive(step(&mut wall, &mut data, &mut coordinator));
        assert_eq!(cmd, DriveCommand::new(0.0, -1.0));
    }

    #[test]
    fn lost_wall_then_dead_zone_blocks_reactivation() {
        let mut task = Task::new(FollowWall::new(FollowWallParams::default()));
        let mut coordinator = Coordinator::new();

        let mut data = with_left(0, Some(0.3));
        task.resume(&mut data, &mut coordinator, &mut NoopNotifier);
        assert_eq!(task.phase(), Phase::Activated);

        // Wall gone from 100 ms; lost for more than 2 s at 2200 ms.
        for millis in (100..=2100).step_by(100) {
            let mut data = with_left(millis, None);
            task.resume(&mut data, &mut coordinator, &mut NoopNotifier);
            assert_eq!(task.phase(), Phase::Activated, "at {millis}");
        }
        let mut data = with_left(2200, None);
        task.resume(&mut data, &mut coordinator, &mut NoopNotifier);
        assert_eq!(task.phase(), Phase::Dormant);
        assert_eq!(coordinator.owner(), None);

        // Wall back, but inside the 2 s dead zone.
        for millis in (2300..=4100).step_by(100) {
            let mut data = with_left(millis, Some(0.3));
            task.resume(&mut data, &mut coordinator, &mut NoopNotifier);
            assert_eq!(task.phase(), Phase::Dormant, "at {millis}");
        }
        let mut data = with_left(4200, Some(0.3));
        task.resume(&mut data, &mut coordinator, &mut NoopNotifier);
        assert_eq!(task.phase(), Phase::Activated);
    }

    #[test]
    fn releases_when_evicted() {
        let mut wall = FollowWall::new(FollowWallParams::default());
        let mut coordinator = Coordinator::new();
        let mut data = with_left(0, Some(0.3));
        activate(&mut wall, &mut data, &mut coordinator);
        coordinator.set_grab("Escape");
        assert_eq!(step(&mut wall, &mut data, &mut coordinator), Output::Pass);
        assert!(wall.should_deactivate(&data, &coordinator));
    }

    #[test]
    fn without_goal_bearing_leaves_on_original_heading() {
        let mut wall = FollowWall::new(FollowWallParams::default());
        let mut coordinator = Coordinator::new();
        let mut data = with_left(0, Some(0.4));
        data.pose.heading = 0.5;
        assert_eq!(data.state.goal_bearing, None);
        activate(&mut wall, &mut data, &mut coordinator);

        // Still on the original heading: not departed yet, keep tracking.
        drive(step(&mut wall, &mut data, &mut coordinator));
        assert!(!wall.should_deactivate(&data, &coordinator));

        data.pose.heading = -0.5;
        drive(step(&mut wall, &mut data, &mut coordinator));
        assert!(!wall.should_deactivate(&data, &coordinator));

        data.pose.heading = 0.45;
        assert_eq!(step(&mut wall, &mut data, &mut coordinator), Output::Pass);
        assert!(wall.should_deactivate(&data, &coordinator));
    }

    #[test]
    fn regained_goal_heading_ends_tracking() {
        let mut wall = FollowWall::new(FollowWallParams::default());
        let mut coordinator = Coordinator::new();
        let mut data = with_left(0, Some(0.4));
        data.state.goal_bearing = Some(0.0);
        activate(&mut wall, &mut data, &mut coordinator);

        data.pose.heading = -1.0;
        drive(step(&mut wall, &mut data, &mut coordinator));
        data.pose.heading = 0.05;
        assert_eq!(step(&mut wall, &mut data, &mut coordinator), Output::Pass);
        assert!(wall.should_deactivate(&data, &coordinator));
    }
}

// ── JoystickTeleop ────────────────────────────────────────────────────────────

#[cfg(test)]
mod teleop_tests {
    use super::*;

    #[test]
    fn holds_command_until_timeout() {
        let mut teleop = JoystickTeleop::new(TeleopParams::default(), DriveGeometry::default());
        let mut coordinator = Coordinator::new();
        let mut notes = Recorder::default();

        let mut data = tick_at(0);
        assert_eq!(step_with(&mut teleop, &mut data, &mut coordinator, &mut notes), Output::Pass);

        let mut data = tick_at(100);
        data.control.push(ControlCommand::Speed { speed: 50.0, turn: -20.0 });
        let cmd = drive(step_with(&mut teleop, &mut data, &mut coordinator, &mut notes));
        assert!(close(cmd.velocity, 0.25));
        assert!(close(cmd.omega, -0.4));

        let mut data = tick_at(600);
        assert_eq!(step_with(&mut teleop, &mut data, &mut coordinator, &mut notes), Output::Drive(cmd));

        for millis in [1100, 1200, 1300] {
            let mut data = tick_at(millis);
            let out = step_with(&mut teleop, &mut data, &mut coordinator, &mut notes);
            assert_eq!(out, Output::Drive(DriveCommand::STOP));
        }
        assert_eq!(notes.notices.len(), 1);
    }

    #[test]
    fn halt_button_stops() {
        let mut teleop = JoystickTeleop::new(TeleopParams::default(), DriveGeometry::default());
        let mut coordinator = Coordinator::new();
        let mut data = tick_at(0);
        data.control.push(ControlCommand::Speed { speed: 100.0, turn: 0.0 });
        data.control.push(ControlCommand::Button(HALT_BUTTON));
        let cmd = drive(step(&mut teleop, &mut data, &mut coordinator));
        assert_eq!(cmd, DriveCommand::STOP);
    }

    #[test]
    fn out_of_range_units_clamp() {
        let mut teleop = JoystickTeleop::new(TeleopParams::default(), DriveGeometry::default());
        let mut data = tick_at(0);
        data.control.push(ControlCommand::Speed { speed: 500.0, turn: 0.0 });
        let cmd = drive(step(&mut teleop, &mut data, &mut Coordinator::new()));
        assert!(close(cmd.velocity, 0.5));
    }
}

// ── CameraChase ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod chase_tests {
    use super::*;

    fn with_target(now: u64, seen: u64, bearing: f64, inclination: f64) -> TickData {
        let mut data = tick_at(now);
        data.sensors.target = Some(TargetReading { bearing, inclination, stamp: Stamp(seen) });
        data
    }

    #[test]
    fn steers_toward_fresh_target() {
        let mut chase = CameraChase::new(ChaseParams::default());
        let mut data = with_target(100, 50, 0.2, 0.1);
        assert!(chase.should_activate(&data, &Coordinator::new()));
        let cmd = drive(step(&mut chase, &mut data, &mut Coordinator::new()));
        assert!(close(cmd.omega, 0.3));
        assert!(close(cmd.velocity, 0.25 * 0.2_f64.cos()));
    }

    #[test]
    fn stale_target_is_ignored() {
        let chase = CameraChase::new(ChaseParams::default());
        let data = with_target(600, 0, 0.2, 0.1);
        assert!(!chase.should_activate(&data, &Coordinator::new()));
    }

    #[test]
    fn losing_the_target_stops_before_deactivating() {
        let mut chase = CameraChase::new(ChaseParams::default());
        let mut coordinator = Coordinator::new();
        let mut data = with_target(100, 50, 0.3, 0.1);
        activate(&mut chase, &mut data, &mut coordinator);
        let cmd = drive(step(&mut chase, &mut data, &mut coordinator));
        assert!(cmd.velocity > 0.0);
        assert!(!chase.should_deactivate(&data, &coordinator));

        // Last fix at 50 ms is older than 0.5 s by 700 ms.
        let mut data = with_target(700, 50, 0.3, 0.1);
        assert!(!chase.should_deactivate(&data, &coordinator));
        assert_eq!(step(&mut chase, &mut data, &mut coordinator), Output::Drive(DriveCommand::STOP));
        assert!(chase.should_deactivate(&data, &coordinator));
    }

    #[test]
    fn close_target_stops_forward_motion() {
        let mut chase = CameraChase::new(ChaseParams::default());
        let mut data = with_target(0, 0, -0.1, 0.4);
        let cmd = drive(step(&mut chase, &mut data, &mut Coordinator::new()));
        assert_eq!(cmd.velocity, 0.0);
        assert!(cmd.omega < 0.0);
    }
}

// ── RouteFollowing ────────────────────────────────────────────────────────────

#[cfg(test)]
mod route_tests {
    use super::*;

    fn at(millis: u64, x: f64, y: f64, heading: f64) -> TickData {
        let mut data = tick_at(millis);
        data.pose.x = x;
        data.pose.y = y;
        data.pose.heading = heading;
        data
    }

    #[test]
    fn walks_waypoints_and_pivots_on_sharp_turns() {
        let waypoints = vec![Waypoint::Local { x: 1.0, y: 0.0 }, Waypoint::Local { x: 1.0, y: 1.0 }];
        let mut route = RouteFollowing::new(RouteParams::default(), waypoints);
        let mut coordinator = Coordinator::new();

        let mut data = at(0, 0.0, 0.0, 0.0);
        assert!(route.should_activate(&data, &coordinator));
        activate(&mut route, &mut data, &mut coordinator);
        assert_eq!(step(&mut route, &mut data, &mut coordinator), Output::Signal);
        assert_eq!(data.state.goal_xy, Some((1.0, 0.0)));
        assert_eq!(data.state.goal_distance, Some(1.0));

        let mut data = at(100, 0.6, 0.0, 0.0);
        assert_eq!(step(&mut route, &mut data, &mut coordinator), Output::Drive(DriveCommand::STOP));
        assert_eq!(route.current_index(), 1);

        // Next waypoint is ~68° to the left: grab and pivot.
        let mut data = at(200, 0.6, 0.0, 0.0);
        let cmd = drive(step(&mut route, &mut data, &mut coordinator));
        assert_eq!(cmd, DriveCommand::new(0.0, 0.8));
        assert_eq!(coordinator.owner(), Some("RouteFollowing"));

        let aligned = 1.0_f64.atan2(0.4);
        let mut data = at(300, 0.6, 0.0, aligned);
        assert_eq!(step(&mut route, &mut data, &mut coordinator), Output::Signal);
        assert_eq!(coordinator.owner(), None);

        let mut data = at(400, 1.0, 0.8, aligned);
        assert_eq!(step(&mut route, &mut data, &mut coordinator), Output::Drive(DriveCommand::STOP));
        assert!(route.is_finished());
        assert_eq!(data.state.goal_xy, None);
        assert!(route.should_deactivate(&data, &coordinator));
    }

    #[test]
    fn pivot_gives_up_after_turn_timeout() {
        let waypoints = vec![Waypoint::Local { x: -5.0, y: 0.0 }];
        let mut route = RouteFollowing::new(RouteParams::default(), waypoints);
        let mut coordinator = Coordinator::new();
        let mut data = at(0, 0.0, 0.0, 0.0);
        activate(&mut route, &mut data, &mut coordinator);
        drive(step(&mut route, &mut data, &mut coordinator));
        assert_eq!(coordinator.owner(), Some("RouteFollowing"));

        let mut data = at(4000, 0.0, 0.0, 0.0);
        assert_eq!(step(&mut route, &mut data, &mut coordinator), Output::Signal);
        assert_eq!(coordinator.owner(), None);
    }

    #[test]
    fn slow_waypoint_is_skipped() {
        let waypoints = vec![Waypoint::Local { x: 10.0, y: 0.0 }, Waypoint::Local { x: 20.0, y: 0.0 }];
        let mut route = RouteFollowing::new(RouteParams::default(), waypoints);
        let mut coordinator = Coordinator::new();
        let mut data = at(0, 0.0, 0.0, 0.0);
        activate(&mut route, &mut data, &mut coordinator);

        let mut data = at(60_000, 1.0, 0.0, 0.0);
        assert_eq!(step(&mut route, &mut data, &mut coordinator), Output::Signal);
        assert_eq!(route.current_index(), 1);
    }

    #[test]
    fn geo_waypoint_without_position_waits() {
        let target = sb_core::GeoPoint::new(45.0, 7.0);
        let mut route = RouteFollowing::new(RouteParams::default(), vec![Waypoint::Geo(target)]);
        let mut coordinator = Coordinator::new();
        let mut data = at(0, 0.0, 0.0, 0.0);
        activate(&mut route, &mut data, &mut coordinator);
        assert_eq!(step(&mut route, &mut data, &mut coordinator), Output::Pass);
        assert_eq!(data.state.goal_geo, None);
    }

    #[test]
    fn losing_position_mid_pivot_releases_the_wheels() {
        let here = sb_core::GeoPoint::new(0.0, 0.0);
        let east = sb_core::GeoPoint::new(0.0, 0.001);
        let mut route = RouteFollowing::new(RouteParams::default(), vec![Waypoint::Geo(east)]);
        let mut coordinator = Coordinator::new();

        // Facing north, waypoint due east: pivot right.
        let mut data = at(0, 0.0, 0.0, 1.57);
        data.pose.geo = Some(here);
        activate(&mut route, &mut data, &mut coordinator);
        let cmd = drive(step(&mut route, &mut data, &mut coordinator));
        assert_eq!(cmd, DriveCommand::new(0.0, -0.8));
        assert_eq!(coordinator.owner(), Some("RouteFollowing"));

        let mut data = at(100, 0.0, 0.0, 1.2);
        assert_eq!(step(&mut route, &mut data, &mut coordinator), Output::Pass);
        assert_eq!(coordinator.owner(), None);

        // Fix back with a small error: no stale pivot resumes.
        let mut data = at(200, 0.0, 0.0, 0.5);
        data.pose.geo = Some(here);
        assert_eq!(step(&mut route, &mut data, &mut coordinator), Output::Signal);
        assert_eq!(coordinator.owner(), None);
    }

    #[test]
    fn pivot_ends_when_grab_is_taken_away() {
        let waypoints = vec![Waypoint::Local { x: -5.0, y: 0.0 }];
        let mut route = RouteFollowing::new(RouteParams::default(), waypoints);
        let mut coordinator = Coordinator::new();
        let mut data = at(0, 0.0, 0.0, 0.0);
        activate(&mut route, &mut data, &mut coordinator);
        drive(step(&mut route, &mut data, &mut coordinator));

        coordinator.set_grab("Escape");
        let mut data = at(100, 0.0, 0.0, 0.0);
        assert_eq!(step(&mut route, &mut data, &mut coordinator), Output::Signal);
        assert_eq!(coordinator.owner(), Some("Escape"));
    }

    #[test]
    fn empty_route_never_activates() {
        let route = RouteFollowing::new(RouteParams::default(), Vec::new());
        assert!(!route.should_activate(&tick_at(0), &Coordinator::new()));
    }
}
