//! The fixed-rate profile-tracking controller.
//!
//! A [`MotionController`] owns a position source and an output sink, consumes
//! one [`MotionProfile`] at a time, and drives a feedforward + PID control
//! step at a fixed cadence while enabled. It disables itself once the
//! measured position is within tolerance of the target, or when an external
//! caller disables it.
//!
//! All mutable run state lives behind a single mutex, so a control step and
//! an externally invoked `enable()`/`disable()` are mutually exclusive; an
//! in-flight step always runs to completion.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use motion_traits::clock::{Clock, MonotonicClock};
use motion_traits::{MotionOutput, PositionSource};

use crate::config::{DEFAULT_TICK, Gains};
use crate::error::EnableError;
use crate::integral::signed_trapezoid_area;
use crate::profile::MotionProfile;
use crate::ticker::Ticker;

const MILLIS_PER_SEC: f64 = 1_000.0;

/// Everything a control step reads or writes, guarded as one unit.
struct RunState {
    source: Box<dyn PositionSource + Send>,
    output: Box<dyn MotionOutput + Send>,
    gains: Gains,
    clock: Arc<dyn Clock + Send + Sync>,

    profile: Option<MotionProfile>,
    tolerance: f64,
    enabled: bool,
    on_target: bool,

    error: f64,
    error_prev: f64,
    error_integral: f64,
    distance_from_target: f64,

    epoch: Instant,
    t_start_ms: u64,
    t_prev_ms: u64,
    t_current_ms: u64,
}

impl RunState {
    /// One worker iteration: advance the timestamps, then run the control
    /// step. Returns whether the controller is still enabled.
    fn tick(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.t_prev_ms = self.t_current_ms;
        self.t_current_ms = self.clock.ms_since(self.epoch);
        self.calculate();
        self.enabled
    }

    fn calculate(&mut self) {
        let Some(profile) = self.profile.as_ref() else {
            tracing::error!("control step with no profile; disabling");
            self.disable_in_place();
            return;
        };

        let elapsed = (self.t_current_ms - self.t_start_ms) as f64 / MILLIS_PER_SEC;
        let dt = (self.t_current_ms - self.t_prev_ms) as f64 / MILLIS_PER_SEC;

        let setpoint = profile.sample_at(elapsed);
        let target_position = profile.target_position();
        tracing::trace!(
            elapsed,
            dt,
            setpoint_position = setpoint.position,
            setpoint_velocity = setpoint.velocity,
            setpoint_acceleration = setpoint.acceleration,
            "control step"
        );

        let current_position = match self.source.read() {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "position read failed; skipping step");
                return;
            }
        };

        self.error_prev = self.error;
        self.error = setpoint.position - current_position;

        self.distance_from_target = target_position - current_position;
        if self.distance_from_target.abs() < self.tolerance {
            tracing::info!(
                position = current_position,
                tolerance = self.tolerance,
                "on target; disabling"
            );
            self.on_target = true;
            self.disable_in_place();
            return;
        }

        self.error_integral += signed_trapezoid_area(self.error_prev, self.error, dt);
        tracing::debug!(
            error = self.error,
            error_prev = self.error_prev,
            integral = self.error_integral,
            "tracking"
        );

        let g = self.gains;
        let mut command = g.kv * setpoint.velocity
            + g.ka * setpoint.acceleration
            + g.kp * self.error
            + g.ki * self.error_integral
            + g.kd * (self.error - self.error_prev) / dt;

        if !command.is_finite() {
            tracing::debug!(command, "non-finite command forced to zero");
            command = 0.0;
        }
        let command = command.clamp(-1.0, 1.0);

        tracing::trace!(command, "command");
        if let Err(e) = self.output.apply(command) {
            tracing::warn!(error = %e, "output apply failed");
        }
    }

    /// Shared disable semantics: clearing the tolerance and detaching the
    /// profile is deliberate — a disabled controller must be re-configured
    /// before it can be enabled again.
    fn disable_in_place(&mut self) {
        self.enabled = false;
        self.tolerance = 0.0;
        self.profile = None;
    }
}

/// Closed-loop tracker of a [`MotionProfile`].
///
/// Built with [`MotionController::builder`], which requires a position source
/// and an output sink at compile time (the type-state markers stand in for
/// the null checks a dynamic language would do at `enable()` time).
/// Tolerance and profile are runtime configuration; `enable()` refuses to
/// start without them.
pub struct MotionController {
    state: Arc<Mutex<RunState>>,
    clock: Arc<dyn Clock + Send + Sync>,
    tick_period: Duration,
    worker: Option<Ticker>,
}

impl core::fmt::Debug for MotionController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let (enabled, on_target, tolerance) = self
            .state
            .lock()
            .map(|s| (s.enabled, s.on_target, s.tolerance))
            .unwrap_or((false, false, 0.0));
        f.debug_struct("MotionController")
            .field("enabled", &enabled)
            .field("on_target", &on_target)
            .field("tolerance", &tolerance)
            .field("tick_period", &self.tick_period)
            .finish()
    }
}

impl MotionController {
    /// Start building a controller.
    pub fn builder() -> MotionControllerBuilder<Missing, Missing> {
        MotionControllerBuilder::default()
    }

    /// Assign the profile to track. Replaces any previous profile. Ignored
    /// (with a warning) while enabled: re-planning a move in flight is not
    /// supported.
    pub fn set_profile(&self, profile: MotionProfile) {
        if let Ok(mut st) = self.state.lock() {
            if st.enabled {
                tracing::warn!("profile assignment ignored while enabled");
                return;
            }
            st.profile = Some(profile);
        }
    }

    /// Set the settling tolerance, in the same units as position. Must be
    /// positive for `enable()` to accept it. Ignored while enabled.
    pub fn set_tolerance(&self, tolerance: f64) {
        if let Ok(mut st) = self.state.lock() {
            if st.enabled {
                tracing::warn!("tolerance change ignored while enabled");
                return;
            }
            st.tolerance = tolerance;
        }
    }

    /// Begin tracking: reset the run state and start the periodic worker.
    ///
    /// Refuses (logged, state unchanged) when already enabled, when the
    /// tolerance is not positive, or when no profile is assigned. The
    /// specific refusal is returned so callers are not forced to poll
    /// `is_enabled()` to learn what went wrong.
    pub fn enable(&mut self) -> Result<(), EnableError> {
        {
            let mut st = match self.state.lock() {
                Ok(st) => st,
                Err(_) => return Err(EnableError::AlreadyEnabled),
            };
            if st.enabled {
                tracing::warn!("enable refused: already enabled");
                return Err(EnableError::AlreadyEnabled);
            }
            if st.tolerance <= 0.0 {
                tracing::warn!(tolerance = st.tolerance, "enable refused: tolerance not positive");
                return Err(EnableError::NonPositiveTolerance(st.tolerance));
            }
            if st.profile.is_none() {
                tracing::warn!("enable refused: no profile assigned");
                return Err(EnableError::MissingProfile);
            }

            st.epoch = st.clock.now();
            st.t_start_ms = 0;
            st.t_prev_ms = 0;
            st.t_current_ms = 0;
            st.on_target = false;
            st.error = 0.0;
            st.error_prev = 0.0;
            st.error_integral = 0.0;
            st.distance_from_target = 0.0;
            st.enabled = true;
        }

        // A worker from a previous run has already stopped itself; reap it
        // before starting the next one.
        if let Some(old) = self.worker.take() {
            old.stop();
        }

        let state = Arc::clone(&self.state);
        let ticker = Ticker::spawn(Arc::clone(&self.clock), self.tick_period, move || {
            match state.lock() {
                Ok(mut st) => st.tick(),
                // A panicked tick poisoned the state; stop driving it.
                Err(_) => false,
            }
        });
        self.worker = Some(ticker);
        tracing::info!(tick = ?self.tick_period, "controller enabled");
        Ok(())
    }

    /// Stop tracking. Clears the tolerance and detaches the profile, so both
    /// must be supplied again before the next `enable()`. An in-flight
    /// control step runs to completion before the worker is joined.
    pub fn disable(&mut self) {
        if let Ok(mut st) = self.state.lock() {
            st.disable_in_place();
        }
        if let Some(worker) = self.worker.take() {
            worker.stop();
        }
        tracing::info!("controller disabled");
    }

    /// Run one control step immediately, exactly as the periodic worker
    /// does. No-op while disabled. Intended for simulation and tests that
    /// drive the controller with a manual clock.
    pub fn step(&self) {
        if let Ok(mut st) = self.state.lock() {
            st.tick();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().map(|s| s.enabled).unwrap_or(false)
    }

    /// Whether the last run ended by settling within tolerance.
    pub fn on_target(&self) -> bool {
        self.state.lock().map(|s| s.on_target).unwrap_or(false)
    }

    /// Signed distance from the target at the last control step.
    pub fn distance_from_target(&self) -> f64 {
        self.state.lock().map(|s| s.distance_from_target).unwrap_or(0.0)
    }

    /// Telemetry: accumulated signed error integral, in position-seconds.
    pub fn error_integral(&self) -> f64 {
        self.state.lock().map(|s| s.error_integral).unwrap_or(0.0)
    }
}

impl Drop for MotionController {
    fn drop(&mut self) {
        if let Ok(mut st) = self.state.lock() {
            st.disable_in_place();
        }
        // Ticker joins its thread on drop.
    }
}

// ── Type-state builder ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for [`MotionController`]. The source and output collaborators are
/// enforced at compile time; everything else has defaults.
pub struct MotionControllerBuilder<Src, Out> {
    source: Option<Box<dyn PositionSource + Send>>,
    output: Option<Box<dyn MotionOutput + Send>>,
    gains: Gains,
    tick_period: Duration,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    tolerance: f64,
    profile: Option<MotionProfile>,
    _src: PhantomData<Src>,
    _out: PhantomData<Out>,
}

impl Default for MotionControllerBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            source: None,
            output: None,
            gains: Gains::default(),
            tick_period: DEFAULT_TICK,
            clock: None,
            tolerance: 0.0,
            profile: None,
            _src: PhantomData,
            _out: PhantomData,
        }
    }
}

impl<Src, Out> MotionControllerBuilder<Src, Out> {
    pub fn with_source(
        self,
        source: impl PositionSource + Send + 'static,
    ) -> MotionControllerBuilder<Set, Out> {
        MotionControllerBuilder {
            source: Some(Box::new(source)),
            output: self.output,
            gains: self.gains,
            tick_period: self.tick_period,
            clock: self.clock,
            tolerance: self.tolerance,
            profile: self.profile,
            _src: PhantomData,
            _out: PhantomData,
        }
    }

    pub fn with_output(
        self,
        output: impl MotionOutput + Send + 'static,
    ) -> MotionControllerBuilder<Src, Set> {
        MotionControllerBuilder {
            source: self.source,
            output: Some(Box::new(output)),
            gains: self.gains,
            tick_period: self.tick_period,
            clock: self.clock,
            tolerance: self.tolerance,
            profile: self.profile,
            _src: PhantomData,
            _out: PhantomData,
        }
    }

    pub fn with_gains(mut self, gains: Gains) -> Self {
        self.gains = gains;
        self
    }

    /// Control-step cadence. Defaults to [`DEFAULT_TICK`].
    pub fn with_tick(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Pre-enable configuration; may also be set later via `set_tolerance`.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Pre-enable configuration; may also be set later via `set_profile`.
    pub fn with_profile(mut self, profile: MotionProfile) -> Self {
        self.profile = Some(profile);
        self
    }
}

impl MotionControllerBuilder<Set, Set> {
    pub fn build(self) -> MotionController {
        let clock: Arc<dyn Clock + Send + Sync> = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let epoch = clock.now();
        let state = RunState {
            // Both are Some by type-state construction.
            source: self.source.unwrap_or_else(|| unreachable!()),
            output: self.output.unwrap_or_else(|| unreachable!()),
            gains: self.gains,
            clock: Arc::clone(&clock),
            profile: self.profile,
            tolerance: self.tolerance,
            enabled: false,
            on_target: false,
            error: 0.0,
            error_prev: 0.0,
            error_integral: 0.0,
            distance_from_target: 0.0,
            epoch,
            t_start_ms: 0,
            t_prev_ms: 0,
            t_current_ms: 0,
        };
        MotionController {
            state: Arc::new(Mutex::new(state)),
            clock,
            tick_period: self.tick_period,
            worker: None,
        }
    }
}
