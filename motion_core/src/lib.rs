#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Single-axis motion profiling and closed-loop tracking (hardware-agnostic).
//!
//! This crate generates time-parameterized point-to-point motion profiles
//! (trapezoidal or triangular velocity shape) and tracks them with a
//! fixed-rate feedforward + PID controller. All hardware interactions go
//! through the `motion_traits::PositionSource` and `motion_traits::MotionOutput`
//! traits; timing goes through `motion_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Profiling**: `generator::generate` synthesizes a [`MotionProfile`] of
//!   uniformly spaced [`MotionSample`]s (`generator`, `profile` modules)
//! - **Tracking**: [`MotionController`] samples the profile each tick and
//!   blends feedforward with PID feedback into a bounded command
//!   (`controller` module)
//! - **Scheduling**: a dedicated fixed-rate worker drives the control steps
//!   (`ticker` module)
//! - **Integration**: sign-aware trapezoidal accumulation of the error signal
//!   (`integral` module)
//!
//! All diagnostics are emitted through `tracing`; this crate never installs a
//! subscriber. Library consumers pick the level (per-tick detail is at
//! `debug`/`trace`, configuration failures at `warn`).

pub mod config;
pub mod controller;
pub mod error;
pub mod generator;
pub mod integral;
pub mod mocks;
pub mod profile;
pub mod sample;
pub mod ticker;

pub use config::Gains;
pub use controller::{MotionController, MotionControllerBuilder};
pub use error::{EnableError, GenerateError};
pub use generator::generate;
pub use profile::MotionProfile;
pub use sample::MotionSample;
