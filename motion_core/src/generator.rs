//! Trapezoidal motion profile planning.
//!
//! [`generate`] plans a move from rest to rest over a signed displacement,
//! under a cruise-velocity and acceleration-rate limit, and discretizes the
//! plan into fixed-interval [`MotionSample`]s. When the displacement is too
//! short to reach cruise velocity the plan degenerates to a triangle.
//!
//! Planning is always done on the magnitude of the displacement; negative
//! moves are planned forward and mirrored by negating the kinematic fields.

use crate::error::GenerateError;
use crate::profile::MotionProfile;
use crate::sample::MotionSample;

/// Plan a move of `target_position` (signed, from the current position)
/// limited by `cruise_velocity` and `acceleration` (both magnitudes), sampled
/// every `sample_interval` seconds.
///
/// # Errors
///
/// Rejects a zero or non-finite target and non-positive or non-finite
/// limits; a plan from garbage limits would silently produce a garbage
/// trajectory, so the inputs are checked up front.
pub fn generate(
    target_position: f64,
    cruise_velocity: f64,
    acceleration: f64,
    sample_interval: f64,
) -> Result<MotionProfile, GenerateError> {
    if target_position == 0.0 || !target_position.is_finite() {
        return Err(GenerateError::TargetPosition(target_position));
    }
    if cruise_velocity <= 0.0 || !cruise_velocity.is_finite() {
        return Err(GenerateError::CruiseVelocity(cruise_velocity));
    }
    if acceleration <= 0.0 || !acceleration.is_finite() {
        return Err(GenerateError::AccelerationRate(acceleration));
    }
    if sample_interval <= 0.0 || !sample_interval.is_finite() {
        return Err(GenerateError::SampleInterval(sample_interval));
    }

    let reverse = target_position < 0.0;
    let distance = target_position.abs();

    let accel_distance = 0.5 * cruise_velocity * cruise_velocity / acceleration;
    let cruise_distance = distance - 2.0 * accel_distance;

    let mut samples = if cruise_distance < 0.0 {
        triangular(distance, acceleration, sample_interval)
    } else {
        trapezoidal(
            distance,
            cruise_velocity,
            acceleration,
            cruise_distance,
            sample_interval,
        )
    };

    if reverse {
        for s in &mut samples {
            // Exact zeros stay +0.0 so the settled tail compares clean.
            if s.position != 0.0 {
                s.position = -s.position;
            }
            if s.velocity != 0.0 {
                s.velocity = -s.velocity;
            }
            if s.acceleration != 0.0 {
                s.acceleration = -s.acceleration;
            }
        }
    }

    let profile = MotionProfile::new(samples, target_position, sample_interval);
    tracing::debug!(
        target_position,
        cruise_velocity,
        acceleration,
        sample_interval,
        total_time = profile.total_time(),
        samples = profile.samples().len(),
        "profile generated"
    );
    Ok(profile)
}

/// Full three-phase plan: accelerate to cruise, hold, decelerate to rest.
fn trapezoidal(
    distance: f64,
    cruise_velocity: f64,
    acceleration: f64,
    cruise_distance: f64,
    dt: f64,
) -> Vec<MotionSample> {
    let accel_time = cruise_velocity / acceleration;
    let cruise_time = cruise_distance / cruise_velocity;
    let total_time = 2.0 * accel_time + cruise_time;

    let mut samples = Vec::with_capacity(((total_time / dt) as usize).saturating_add(2));

    // Sample times come from index * dt, not accumulation, so a phase
    // boundary landing on a sample stays exact.
    let mut index: u32 = 0;
    let mut position = 0.0;
    let mut velocity = 0.0;
    loop {
        let time = f64::from(index) * dt;
        let sample = if time <= accel_time {
            velocity = acceleration * time;
            position = 0.5 * acceleration * time * time;
            MotionSample {
                time,
                position,
                velocity,
                acceleration,
            }
        } else if time <= accel_time + cruise_time {
            velocity = cruise_velocity;
            position += velocity * dt;
            MotionSample {
                time,
                position,
                velocity,
                acceleration: 0.0,
            }
        } else if time < total_time {
            let velocity_prev = velocity;
            velocity = acceleration * (total_time - time);
            position += velocity * dt + 0.5 * (velocity_prev - velocity) * dt;
            MotionSample {
                time,
                position,
                velocity,
                acceleration: -acceleration,
            }
        } else {
            MotionSample::settled(time, distance)
        };
        samples.push(sample);
        index += 1;
        // The trajectory ends with exactly one settled sample, so a lookup
        // at or past total_time resolves to rest at the target.
        if time >= total_time {
            break;
        }
    }
    samples
}

/// Degenerate plan when cruise velocity is unreachable: accelerate to the
/// halfway point, then decelerate.
fn triangular(distance: f64, acceleration: f64, dt: f64) -> Vec<MotionSample> {
    let accel_time = (distance / acceleration).sqrt();
    let total_time = 2.0 * accel_time;

    let mut samples = Vec::with_capacity(((total_time / dt) as usize).saturating_add(2));

    let mut index: u32 = 0;
    let mut position = 0.0;
    let mut velocity = 0.0;
    loop {
        let time = f64::from(index) * dt;
        let sample = if time <= accel_time {
            velocity = acceleration * time;
            position = 0.5 * acceleration * time * time;
            MotionSample {
                time,
                position,
                velocity,
                acceleration,
            }
        } else if time < total_time {
            let velocity_prev = velocity;
            velocity = acceleration * (total_time - time);
            position += velocity * dt + 0.5 * (velocity_prev - velocity) * dt;
            MotionSample {
                time,
                position,
                velocity,
                acceleration: -acceleration,
            }
        } else {
            MotionSample::settled(time, distance)
        };
        samples.push(sample);
        index += 1;
        if time >= total_time {
            break;
        }
    }
    samples
}
