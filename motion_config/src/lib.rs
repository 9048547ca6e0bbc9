#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the motion controller.
//!
//! `Config` and sub-structs are deserialized from TOML and validated. Every
//! field has a default, so an empty file (or no file at all) yields a usable
//! simulation setup.

use serde::Deserialize;

/// Feedforward and PID gain values.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct GainsCfg {
    pub kv: f64,
    pub ka: f64,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Default for GainsCfg {
    fn default() -> Self {
        Self {
            kv: 1.0,
            ka: 0.0,
            kp: 2.0,
            ki: 0.0,
            kd: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ControlCfg {
    /// Control-step period in milliseconds.
    pub tick_ms: u64,
    /// Settling tolerance, in position units. Must be positive.
    pub tolerance: f64,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            tolerance: 0.02,
        }
    }
}

/// Profile-planning limits shared by every move unless overridden on the
/// command line.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ProfileCfg {
    pub cruise_velocity: f64,
    pub acceleration: f64,
    /// Spacing of generated samples, seconds.
    pub sample_interval: f64,
}

impl Default for ProfileCfg {
    fn default() -> Self {
        Self {
            cruise_velocity: 0.5,
            acceleration: 0.5,
            sample_interval: 0.01,
        }
    }
}

/// Simulated-plant parameters.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct PlantCfg {
    /// Axis velocity at a full-scale (1.0) command, units per second.
    pub max_velocity: f64,
}

impl Default for PlantCfg {
    fn default() -> Self {
        Self { max_velocity: 1.0 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub gains: GainsCfg,
    pub control: ControlCfg,
    pub profile: ProfileCfg,
    pub plant: PlantCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Reject values the controller or generator would refuse at run time,
    /// so a bad file fails at startup with a readable message.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.control.tick_ms == 0 {
            eyre::bail!("control.tick_ms must be at least 1");
        }
        if !(self.control.tolerance > 0.0) || !self.control.tolerance.is_finite() {
            eyre::bail!(
                "control.tolerance must be positive and finite, got {}",
                self.control.tolerance
            );
        }
        if !(self.profile.cruise_velocity > 0.0) || !self.profile.cruise_velocity.is_finite() {
            eyre::bail!(
                "profile.cruise_velocity must be positive and finite, got {}",
                self.profile.cruise_velocity
            );
        }
        if !(self.profile.acceleration > 0.0) || !self.profile.acceleration.is_finite() {
            eyre::bail!(
                "profile.acceleration must be positive and finite, got {}",
                self.profile.acceleration
            );
        }
        if !(self.profile.sample_interval > 0.0) || !self.profile.sample_interval.is_finite() {
            eyre::bail!(
                "profile.sample_interval must be positive and finite, got {}",
                self.profile.sample_interval
            );
        }
        if !(self.plant.max_velocity > 0.0) || !self.plant.max_velocity.is_finite() {
            eyre::bail!(
                "plant.max_velocity must be positive and finite, got {}",
                self.plant.max_velocity
            );
        }
        for (name, g) in [
            ("kv", self.gains.kv),
            ("ka", self.gains.ka),
            ("kp", self.gains.kp),
            ("ki", self.gains.ki),
            ("kd", self.gains.kd),
        ] {
            if !g.is_finite() {
                eyre::bail!("gains.{name} must be finite, got {g}");
            }
        }
        Ok(())
    }
}
