pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Reads the current scalar position of the axis being controlled.
///
/// Unit-agnostic: whatever unit the profile's target position uses.
pub trait PositionSource {
    fn read(&mut self) -> Result<f64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Accepts a bounded actuator command in `[-1.0, 1.0]`.
pub trait MotionOutput {
    fn apply(
        &mut self,
        command: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
