//! Move execution: config mapping, plant assembly, and closed-loop tracking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use eyre::WrapErr;
use motion_config::Config;
use motion_core::{Gains, MotionController, MotionProfile, generate};
use motion_hardware::SimPlant;
use motion_traits::clock::MonotonicClock;

/// How a tracked move ended.
#[derive(Debug, Clone, Copy)]
pub struct RunOutcome {
    /// Settled within tolerance (the controller disabled itself).
    pub settled: bool,
    pub timed_out: bool,
    pub interrupted: bool,
    pub final_position: f64,
    pub distance_from_target: f64,
    pub elapsed_s: f64,
}

pub fn gains_from(cfg: &Config) -> Gains {
    Gains {
        kv: cfg.gains.kv,
        ka: cfg.gains.ka,
        kp: cfg.gains.kp,
        ki: cfg.gains.ki,
        kd: cfg.gains.kd,
    }
}

/// Plan a profile from the configured limits, with optional overrides.
pub fn plan_profile(
    cfg: &Config,
    target: f64,
    cruise_velocity: Option<f64>,
    acceleration: Option<f64>,
    sample_interval: Option<f64>,
) -> eyre::Result<MotionProfile> {
    generate(
        target,
        cruise_velocity.unwrap_or(cfg.profile.cruise_velocity),
        acceleration.unwrap_or(cfg.profile.acceleration),
        sample_interval.unwrap_or(cfg.profile.sample_interval),
    )
    .wrap_err("cannot plan the requested move")
}

/// Track `target` against the simulated axis until the controller settles,
/// the timeout expires, or `shutdown` is raised (Ctrl-C).
pub fn run_move(
    cfg: &Config,
    target: f64,
    tolerance_override: Option<f64>,
    timeout_s: f64,
    shutdown: &Arc<AtomicBool>,
) -> eyre::Result<RunOutcome> {
    let profile = plan_profile(cfg, target, None, None, None)?;
    let total_time = profile.total_time();
    let tolerance = tolerance_override.unwrap_or(cfg.control.tolerance);

    let plant = SimPlant::new(cfg.plant.max_velocity, MonotonicClock::new());
    let mut controller = MotionController::builder()
        .with_source(plant.position_source())
        .with_output(plant.actuator())
        .with_gains(gains_from(cfg))
        .with_tick(Duration::from_millis(cfg.control.tick_ms))
        .with_tolerance(tolerance)
        .with_profile(profile)
        .build();

    tracing::info!(target, tolerance, total_time, "starting move");
    let started = Instant::now();
    controller.enable()?;

    let mut timed_out = false;
    let mut interrupted = false;
    while controller.is_enabled() {
        if shutdown.load(Ordering::Relaxed) {
            tracing::warn!("interrupted; disabling controller");
            interrupted = true;
            controller.disable();
            break;
        }
        if started.elapsed().as_secs_f64() > timeout_s {
            tracing::warn!(timeout_s, "move did not settle in time; disabling");
            timed_out = true;
            controller.disable();
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    let settled = controller.on_target();
    let final_position = plant
        .position()
        .wrap_err("cannot read final simulated position")?;
    let outcome = RunOutcome {
        settled,
        timed_out,
        interrupted,
        final_position,
        distance_from_target: target - final_position,
        elapsed_s: started.elapsed().as_secs_f64(),
    };
    tracing::info!(
        settled = outcome.settled,
        final_position = outcome.final_position,
        elapsed_s = outcome.elapsed_s,
        "move finished"
    );
    Ok(outcome)
}
