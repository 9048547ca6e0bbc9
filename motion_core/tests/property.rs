//! Invariants of profile generation over randomized plans.

use motion_core::generate;
use proptest::prelude::*;

prop_compose! {
    fn plan_strategy()(
        magnitude in 0.1f64..30.0,
        negative in any::<bool>(),
        cruise in 0.5f64..5.0,
        accel in 0.5f64..5.0,
        dt in 0.05f64..0.2,
    ) -> (f64, f64, f64, f64) {
        let target = if negative { -magnitude } else { magnitude };
        (target, cruise, accel, dt)
    }
}

proptest! {
    #[test]
    fn sample_times_step_by_the_interval((target, cruise, accel, dt) in plan_strategy()) {
        let profile = generate(target, cruise, accel, dt).unwrap();
        let samples = profile.samples();
        prop_assert!(!samples.is_empty());
        prop_assert_eq!(samples[0].time, 0.0);
        for pair in samples.windows(2) {
            let step = pair[1].time - pair[0].time;
            prop_assert!((step - dt).abs() < 1e-9, "step {} vs dt {}", step, dt);
        }
    }

    #[test]
    fn velocity_never_exceeds_the_plan_limit((target, cruise, accel, dt) in plan_strategy()) {
        let profile = generate(target, cruise, accel, dt).unwrap();
        // Peak of a triangle; a trapezoid is capped lower, at the cruise
        // velocity, which this bound also covers.
        let peak = (target.abs() * accel).sqrt().min(cruise);
        for s in profile.samples() {
            prop_assert!(
                s.velocity.abs() <= peak + 1e-9,
                "velocity {} above limit {}",
                s.velocity,
                peak
            );
        }
    }

    #[test]
    fn profile_ends_settled_at_the_target((target, cruise, accel, dt) in plan_strategy()) {
        let profile = generate(target, cruise, accel, dt).unwrap();
        let last = profile.samples()[profile.samples().len() - 1];
        prop_assert_eq!(last.position, target);
        prop_assert_eq!(last.velocity, 0.0);
        prop_assert_eq!(last.acceleration, 0.0);
        // Lookups past the end stay pinned there.
        let past = profile.sample_at(profile.total_time() * 2.0 + 1.0);
        prop_assert_eq!(past.position, target);
    }

    #[test]
    fn mirrored_plans_negate_exactly((target, cruise, accel, dt) in plan_strategy()) {
        let fwd = generate(target.abs(), cruise, accel, dt).unwrap();
        let rev = generate(-target.abs(), cruise, accel, dt).unwrap();
        prop_assert_eq!(fwd.samples().len(), rev.samples().len());
        for (f, r) in fwd.samples().iter().zip(rev.samples()) {
            prop_assert_eq!(f.time, r.time);
            prop_assert_eq!(-f.position, r.position);
            prop_assert_eq!(-f.velocity, r.velocity);
            prop_assert_eq!(-f.acceleration, r.acceleration);
        }
    }
}
