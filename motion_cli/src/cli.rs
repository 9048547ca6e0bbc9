//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured result output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "motion", version, about = "Motion profile generator and tracker")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/motion.toml")]
    pub config: PathBuf,

    /// Emit results as JSON instead of human-readable text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan a move and report (or export) the profile without running it
    Generate {
        /// Signed displacement from the current position
        #[arg(long, allow_hyphen_values = true)]
        target: f64,
        /// Override the configured cruise velocity (units/s)
        #[arg(long, value_name = "VEL")]
        cruise_velocity: Option<f64>,
        /// Override the configured acceleration rate (units/s^2)
        #[arg(long, value_name = "ACCEL")]
        acceleration: Option<f64>,
        /// Override the configured sample interval (s)
        #[arg(long, value_name = "SECONDS")]
        sample_interval: Option<f64>,
        /// Write the sampled profile to this CSV file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
    /// Plan a move and track it against the simulated axis
    Run {
        /// Signed displacement from the current position
        #[arg(long, allow_hyphen_values = true)]
        target: f64,
        /// Override the configured settling tolerance
        #[arg(long, value_name = "UNITS")]
        tolerance: Option<f64>,
        /// Give up if the move has not settled after this many seconds
        #[arg(long, value_name = "SECONDS", default_value_t = 30.0)]
        timeout_s: f64,
    },
}
