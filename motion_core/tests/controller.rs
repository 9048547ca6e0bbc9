//! Controller behavior driven deterministically through `step()` with a
//! manual clock. The periodic worker is parked on an hour-long tick so it
//! fires exactly once (immediately on enable) and then stays out of the way.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use motion_core::mocks::{FailingPosition, FixedPosition, RecordingOutput, ScriptedPosition};
use motion_core::{EnableError, Gains, MotionController, generate};
use motion_traits::Clock;

#[derive(Clone)]
struct ManualClock {
    base: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    fn advance(&self, d: Duration) {
        *self.offset.lock().unwrap() += d;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }

    fn sleep(&self, _d: Duration) {}
}

const PARKED: Duration = Duration::from_secs(3600);

fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not met in time");
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn enable_refuses_until_configured() {
    let mut controller = MotionController::builder()
        .with_source(FixedPosition(0.0))
        .with_output(RecordingOutput::new())
        .with_clock(ManualClock::new())
        .with_tick(PARKED)
        .build();

    assert_eq!(
        controller.enable(),
        Err(EnableError::NonPositiveTolerance(0.0))
    );

    controller.set_tolerance(0.02);
    assert_eq!(controller.enable(), Err(EnableError::MissingProfile));

    controller.set_profile(generate(10.0, 2.0, 1.0, 0.1).unwrap());
    assert_eq!(controller.enable(), Ok(()));
    assert!(controller.is_enabled());

    assert_eq!(controller.enable(), Err(EnableError::AlreadyEnabled));
    controller.disable();
    assert!(!controller.is_enabled());
}

#[test]
fn on_target_disables_without_an_output() {
    let clock = ManualClock::new();
    let output = RecordingOutput::new();
    let commands = output.commands();

    let mut controller = MotionController::builder()
        .with_source(FixedPosition(0.95))
        .with_output(output)
        .with_clock(clock)
        .with_tick(PARKED)
        .with_tolerance(0.1)
        .with_profile(generate(1.0, 1.0, 1.0, 0.01).unwrap())
        .build();

    controller.enable().unwrap();
    // |1.0 - 0.95| < 0.1, so the first tick settles and self-disables.
    wait_until(|| !controller.is_enabled());

    assert!(controller.on_target());
    assert!(commands.lock().unwrap().is_empty());

    // Settling cleared the tolerance and detached the profile, so a bare
    // re-enable is refused.
    assert_eq!(
        controller.enable(),
        Err(EnableError::NonPositiveTolerance(0.0))
    );
}

#[test]
fn zero_dt_first_tick_commands_zero() {
    let clock = ManualClock::new();
    let output = RecordingOutput::new();
    let commands = output.commands();

    let mut controller = MotionController::builder()
        .with_source(FixedPosition(0.0))
        .with_output(output)
        .with_clock(clock)
        .with_tick(PARKED)
        .with_gains(Gains {
            kp: 2.0,
            kd: 0.5,
            ..Gains::default()
        })
        .with_tolerance(0.01)
        .with_profile(generate(10.0, 2.0, 1.0, 0.1).unwrap())
        .build();

    controller.enable().unwrap();
    wait_until(|| !commands.lock().unwrap().is_empty());

    // dt = 0 drives the derivative term non-finite; the command is forced
    // to zero instead of leaking NaN to the output.
    assert_eq!(commands.lock().unwrap()[0], 0.0);
    assert!(controller.is_enabled());
    controller.disable();
}

#[test]
fn large_error_saturates_at_minus_one() {
    let clock = ManualClock::new();
    let output = RecordingOutput::new();
    let commands = output.commands();

    let mut controller = MotionController::builder()
        .with_source(FixedPosition(50.0))
        .with_output(output)
        .with_clock(clock.clone())
        .with_tick(PARKED)
        .with_gains(Gains {
            kp: 1000.0,
            ..Gains::default()
        })
        .with_tolerance(0.01)
        .with_profile(generate(10.0, 2.0, 1.0, 0.1).unwrap())
        .build();

    controller.enable().unwrap();
    wait_until(|| !commands.lock().unwrap().is_empty());

    clock.advance(Duration::from_millis(100));
    controller.step();

    let recorded = commands.lock().unwrap().clone();
    // Setpoint is far below the measured 50.0, so the raw command is a huge
    // negative number; it must leave the controller as exactly -1.
    assert_eq!(recorded[1], -1.0);
    controller.disable();
}

#[test]
fn feedforward_blends_velocity_and_acceleration() {
    let clock = ManualClock::new();
    let output = RecordingOutput::new();
    let commands = output.commands();

    // Source sits exactly on the setpoint position at t = 1 s (0.5 units
    // into the acceleration ramp), so feedback terms contribute nothing
    // through kp (zero error) and kd/ki are disabled.
    let mut controller = MotionController::builder()
        .with_source(FixedPosition(0.5))
        .with_output(output)
        .with_clock(clock.clone())
        .with_tick(PARKED)
        .with_gains(Gains {
            kv: 0.5,
            ka: 0.25,
            ..Gains::default()
        })
        .with_tolerance(0.01)
        .with_profile(generate(10.0, 2.0, 1.0, 0.1).unwrap())
        .build();

    controller.enable().unwrap();
    wait_until(|| !commands.lock().unwrap().is_empty());

    clock.advance(Duration::from_secs(1));
    controller.step();

    let recorded = commands.lock().unwrap().clone();
    // Setpoint at t=1: velocity 1.0, acceleration 1.0 -> 0.5*1 + 0.25*1.
    assert!((recorded[1] - 0.75).abs() < 1e-12);
    controller.disable();
}

#[test]
fn derivative_term_tracks_error_rate() {
    let clock = ManualClock::new();
    let output = RecordingOutput::new();
    let commands = output.commands();

    // Reading stays at 0 while the setpoint moves, so the error grows by
    // exactly the setpoint's travel each step. The script then runs out and
    // holds its last value.
    let mut controller = MotionController::builder()
        .with_source(ScriptedPosition::new(vec![0.0, 0.0]))
        .with_output(output)
        .with_clock(clock.clone())
        .with_tick(PARKED)
        .with_gains(Gains {
            kd: 1.0,
            ..Gains::default()
        })
        .with_tolerance(0.01)
        .with_profile(generate(10.0, 2.0, 1.0, 0.1).unwrap())
        .build();

    controller.enable().unwrap();
    wait_until(|| !commands.lock().unwrap().is_empty());

    clock.advance(Duration::from_millis(100));
    controller.step();

    let recorded = commands.lock().unwrap().clone();
    // error went 0 -> 0.005 over dt = 0.1: kd * 0.005 / 0.1.
    assert!((recorded[1] - 0.05).abs() < 1e-9, "kd term {}", recorded[1]);
    controller.disable();
}

#[test]
fn error_integral_accumulates_trapezoids() {
    let clock = ManualClock::new();

    let mut controller = MotionController::builder()
        .with_source(FixedPosition(-1.0))
        .with_output(RecordingOutput::new())
        .with_clock(clock.clone())
        .with_tick(PARKED)
        .with_gains(Gains {
            ki: 1.0,
            ..Gains::default()
        })
        .with_tolerance(0.01)
        .with_profile(generate(10.0, 2.0, 1.0, 0.1).unwrap())
        .build();

    controller.enable().unwrap();
    wait_until(|| controller.distance_from_target() != 0.0);
    // First tick: error 1.0 over dt = 0, area 0.
    assert_eq!(controller.error_integral(), 0.0);

    clock.advance(Duration::from_millis(100));
    controller.step();

    // error_prev = 1.0, error = 1.005 (setpoint moved 0.005), dt = 0.1:
    // trapezoid area 0.1 * (1.0 + 1.005) / 2.
    assert!((controller.error_integral() - 0.10025).abs() < 1e-12);
    controller.disable();
}

#[test]
fn read_failure_skips_the_step() {
    let clock = ManualClock::new();
    let output = RecordingOutput::new();
    let commands = output.commands();

    let mut controller = MotionController::builder()
        .with_source(FailingPosition)
        .with_output(output)
        .with_clock(clock.clone())
        .with_tick(PARKED)
        .with_tolerance(0.01)
        .with_profile(generate(1.0, 1.0, 1.0, 0.01).unwrap())
        .build();

    controller.enable().unwrap();
    std::thread::sleep(Duration::from_millis(50));

    clock.advance(Duration::from_millis(10));
    controller.step();

    // A failed read leaves the run untouched: still enabled, nothing sent.
    assert!(controller.is_enabled());
    assert!(commands.lock().unwrap().is_empty());
    assert_eq!(controller.error_integral(), 0.0);
    controller.disable();
}

#[test]
fn reconfiguration_is_ignored_while_enabled() {
    let clock = ManualClock::new();

    let mut controller = MotionController::builder()
        .with_source(FixedPosition(0.0))
        .with_output(RecordingOutput::new())
        .with_clock(clock.clone())
        .with_tick(PARKED)
        .with_tolerance(0.01)
        .with_profile(generate(1.0, 1.0, 1.0, 0.01).unwrap())
        .build();

    controller.enable().unwrap();
    wait_until(|| controller.distance_from_target() != 0.0);

    // Wide enough to settle instantly if it were applied.
    controller.set_tolerance(5.0);
    clock.advance(Duration::from_millis(10));
    controller.step();

    assert!(controller.is_enabled(), "tolerance change must not apply mid-run");
    controller.disable();
}

/// End to end on the real clock: the worker free-runs at its period and
/// stops producing once disabled.
#[test]
fn worker_runs_at_its_period_until_disabled() {
    let output = RecordingOutput::new();
    let commands = output.commands();

    let mut controller = MotionController::builder()
        .with_source(FixedPosition(0.0))
        .with_output(output)
        .with_tick(Duration::from_millis(5))
        .with_gains(Gains {
            kp: 0.5,
            ..Gains::default()
        })
        .with_tolerance(0.01)
        .with_profile(generate(10.0, 2.0, 1.0, 0.1).unwrap())
        .build();

    controller.enable().unwrap();
    wait_until(|| commands.lock().unwrap().len() >= 5);
    controller.disable();

    let n = commands.lock().unwrap().len();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(commands.lock().unwrap().len(), n, "no ticks after disable");

    for &c in commands.lock().unwrap().iter() {
        assert!((-1.0..=1.0).contains(&c), "command {c} out of range");
    }
}
