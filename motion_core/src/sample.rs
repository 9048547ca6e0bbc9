//! One discrete point of a motion profile.

/// Position, velocity, and acceleration the axis should have at `time`
/// seconds into a move. Produced only by the generator; immutable once
/// created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    /// Seconds since the start of the move; a multiple of the profile's
    /// sample interval.
    pub time: f64,
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

impl MotionSample {
    /// The settled state: at `position` with zero velocity and acceleration.
    pub(crate) fn settled(time: f64, position: f64) -> Self {
        Self {
            time,
            position,
            velocity: 0.0,
            acceleration: 0.0,
        }
    }
}
