//! Runtime controller configuration.

use std::time::Duration;

/// Feedforward and feedback gains, fixed at controller construction.
///
/// `kv`/`ka` scale the profile's velocity/acceleration setpoints
/// (feedforward); `kp`/`ki`/`kd` act on the measured position error (PID).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Gains {
    pub kv: f64,
    pub ka: f64,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

/// Default control-step cadence when none is configured.
pub const DEFAULT_TICK: Duration = Duration::from_millis(10);
