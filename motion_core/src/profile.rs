//! The motion profile container: an ordered, fixed-step sequence of samples
//! plus the move's target position and total duration.

use std::path::Path;

use crate::sample::MotionSample;

/// A generated point-to-point motion profile.
///
/// Samples are uniformly spaced by the sample interval, times strictly
/// increasing from 0. The tail of the sequence is settled: position equals
/// the target, velocity and acceleration are zero. Created once by
/// [`crate::generator::generate`] and read-only thereafter; assigning a
/// profile to a controller replaces (never merges with) any previous one.
#[derive(Debug, Clone)]
pub struct MotionProfile {
    samples: Vec<MotionSample>,
    target_position: f64,
    total_time: f64,
    sample_interval: f64,
}

impl MotionProfile {
    pub(crate) fn new(
        samples: Vec<MotionSample>,
        target_position: f64,
        sample_interval: f64,
    ) -> Self {
        debug_assert!(!samples.is_empty(), "profile must hold at least one sample");
        let total_time = samples.last().map(|s| s.time).unwrap_or(0.0);
        Self {
            samples,
            target_position,
            total_time,
            sample_interval,
        }
    }

    /// The original signed target position requested by the caller.
    pub fn target_position(&self) -> f64 {
        self.target_position
    }

    /// Estimated time to execute the move: the last sample's time, seconds.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Uniform spacing between samples, seconds.
    pub fn sample_interval(&self) -> f64 {
        self.sample_interval
    }

    pub fn samples(&self) -> &[MotionSample] {
        &self.samples
    }

    /// Map a continuous time to the nearest generated sample.
    ///
    /// The index is `round(time / sample_interval)`, which absorbs the
    /// floating-point drift a naive truncating division would accumulate.
    /// Any out-of-range index clamps to the terminal settled sample. This
    /// includes negative times (whose index is negative): lookups before the
    /// start of the profile deliberately return the end state, not the
    /// initial one.
    pub fn sample_at(&self, time: f64) -> MotionSample {
        let index = (time / self.sample_interval).round();
        if index >= 0.0 && (index as usize) < self.samples.len() {
            return self.samples[index as usize];
        }
        self.samples[self.samples.len() - 1]
    }

    /// Render the profile as delimited text: a header line followed by one
    /// `time, position, velocity, acceleration` row per sample, CRLF line
    /// endings. Write-only; nothing in this system parses it back.
    pub fn to_csv_string(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::with_capacity(48 * (self.samples.len() + 1));
        out.push_str("time, position, velocity, acceleration\r\n");
        for s in &self.samples {
            let _ = write!(
                out,
                "{:.6}, {:.6}, {:.6}, {:.6}\r\n",
                s.time, s.position, s.velocity, s.acceleration
            );
        }
        out
    }

    /// Export the profile to a flat file. Best-effort: an I/O failure is
    /// logged and swallowed, never surfaced to the caller.
    pub fn write_csv(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        match std::fs::write(path, self.to_csv_string()) {
            Ok(()) => tracing::info!(path = %path.display(), "profile CSV written"),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "profile CSV export failed");
            }
        }
    }
}
