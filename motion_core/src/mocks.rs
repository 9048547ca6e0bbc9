//! Test doubles for the controller collaborators.
//!
//! Shared by the inline unit tests and the integration tests under
//! `tests/`; compiled into the library so both can use them.

use std::sync::{Arc, Mutex};

use motion_traits::{MotionOutput, PositionSource};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Always reports the same position.
#[derive(Debug, Clone)]
pub struct FixedPosition(pub f64);

impl PositionSource for FixedPosition {
    fn read(&mut self) -> Result<f64, BoxError> {
        Ok(self.0)
    }
}

/// Replays a scripted sequence of readings, then holds the last one.
#[derive(Debug, Clone)]
pub struct ScriptedPosition {
    readings: Vec<f64>,
    next: usize,
}

impl ScriptedPosition {
    pub fn new(readings: Vec<f64>) -> Self {
        Self { readings, next: 0 }
    }
}

impl PositionSource for ScriptedPosition {
    fn read(&mut self) -> Result<f64, BoxError> {
        let idx = self.next.min(self.readings.len().saturating_sub(1));
        self.next += 1;
        self.readings
            .get(idx)
            .copied()
            .ok_or_else(|| "no scripted readings".into())
    }
}

/// Fails every read.
#[derive(Debug, Clone, Default)]
pub struct FailingPosition;

impl PositionSource for FailingPosition {
    fn read(&mut self) -> Result<f64, BoxError> {
        Err("sensor offline".into())
    }
}

/// Records every command it is given.
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    commands: Arc<Mutex<Vec<f64>>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for inspecting commands after the output is moved into a
    /// controller.
    pub fn commands(&self) -> Arc<Mutex<Vec<f64>>> {
        Arc::clone(&self.commands)
    }
}

impl MotionOutput for RecordingOutput {
    fn apply(&mut self, command: f64) -> Result<(), BoxError> {
        if let Ok(mut v) = self.commands.lock() {
            v.push(command);
        }
        Ok(())
    }
}
