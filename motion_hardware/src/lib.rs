//! Simulated axis hardware.
//!
//! [`SimPlant`] models a velocity-commanded single axis: the applied command
//! in `[-1, 1]` scales a maximum velocity, and position integrates whenever
//! either side touches the plant. The plant hands out a [`SimPosition`]
//! sensor and a [`SimActuator`] drive that share the same state, so a
//! controller wired to both closes the loop against a consistent simulation.

pub mod error;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use motion_traits::clock::Clock;
use motion_traits::{MotionOutput, PositionSource};

pub use error::HwError;

struct PlantState {
    position: f64,
    command: f64,
    max_velocity: f64,
    last_update: Instant,
}

impl PlantState {
    /// Integrate position up to `now` under the currently applied command.
    fn advance(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.position += self.command * self.max_velocity * dt;
        self.last_update = now;
    }
}

/// A shared simulated axis.
#[derive(Clone)]
pub struct SimPlant {
    state: Arc<Mutex<PlantState>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl SimPlant {
    /// `max_velocity` is the axis speed at a full-scale command, units per
    /// second.
    pub fn new(max_velocity: f64, clock: impl Clock + Send + Sync + 'static) -> Self {
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(clock);
        let state = PlantState {
            position: 0.0,
            command: 0.0,
            max_velocity,
            last_update: clock.now(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            clock,
        }
    }

    pub fn position_source(&self) -> SimPosition {
        SimPosition {
            plant: self.clone(),
        }
    }

    pub fn actuator(&self) -> SimActuator {
        SimActuator {
            plant: self.clone(),
        }
    }

    /// Current simulated position, integrated up to now.
    pub fn position(&self) -> error::Result<f64> {
        let mut st = self.state.lock().map_err(|_| HwError::Poisoned)?;
        st.advance(self.clock.now());
        Ok(st.position)
    }
}

/// Position sensor half of a [`SimPlant`].
#[derive(Clone)]
pub struct SimPosition {
    plant: SimPlant,
}

impl PositionSource for SimPosition {
    fn read(&mut self) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        let mut st = self
            .plant
            .state
            .lock()
            .map_err(|_| HwError::Poisoned)?;
        st.advance(self.plant.clock.now());
        tracing::trace!(position = st.position, "simulated position read");
        Ok(st.position)
    }
}

/// Drive half of a [`SimPlant`].
#[derive(Clone)]
pub struct SimActuator {
    plant: SimPlant,
}

impl MotionOutput for SimActuator {
    fn apply(&mut self, command: f64) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !command.is_finite() || !(-1.0..=1.0).contains(&command) {
            return Err(HwError::CommandRange(command).into());
        }
        let mut st = self
            .plant
            .state
            .lock()
            .map_err(|_| HwError::Poisoned)?;
        // Finish integrating under the old command before switching.
        st.advance(self.plant.clock.now());
        st.command = command;
        tracing::trace!(command, "simulated command applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

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

    #[test]
    fn plant_starts_at_rest_at_origin() {
        let clock = ManualClock::new();
        let plant = SimPlant::new(1.0, clock.clone());
        clock.advance(Duration::from_secs(5));
        assert_eq!(plant.position().unwrap(), 0.0);
    }

    #[rstest]
    #[case(1.0, 1.0, 2.0, 2.0)]
    #[case(2.0, 0.5, 1.0, 1.0)]
    #[case(1.0, -1.0, 3.0, -3.0)]
    fn position_integrates_command(
        #[case] max_velocity: f64,
        #[case] command: f64,
        #[case] seconds: f64,
        #[case] expected: f64,
    ) {
        let clock = ManualClock::new();
        let plant = SimPlant::new(max_velocity, clock.clone());
        let mut drive = plant.actuator();

        drive.apply(command).unwrap();
        clock.advance(Duration::from_secs_f64(seconds));

        let pos = plant.position().unwrap();
        assert!((pos - expected).abs() < 1e-9, "pos {pos} != {expected}");
    }

    #[test]
    fn command_change_preserves_earlier_travel() {
        let clock = ManualClock::new();
        let plant = SimPlant::new(1.0, clock.clone());
        let mut drive = plant.actuator();
        let mut sensor = plant.position_source();

        drive.apply(1.0).unwrap();
        clock.advance(Duration::from_secs(2));
        drive.apply(-0.5).unwrap();
        clock.advance(Duration::from_secs(2));

        // 2 s at +1.0 then 2 s at -0.5: 2.0 - 1.0.
        let pos = sensor.read().unwrap();
        assert!((pos - 1.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_command_is_refused() {
        let clock = ManualClock::new();
        let plant = SimPlant::new(1.0, clock.clone());
        let mut drive = plant.actuator();

        assert!(drive.apply(1.5).is_err());
        assert!(drive.apply(f64::NAN).is_err());
        clock.advance(Duration::from_secs(1));
        // Refused commands leave the plant untouched.
        assert_eq!(plant.position().unwrap(), 0.0);
    }
}
