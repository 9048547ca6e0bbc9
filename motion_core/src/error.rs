use thiserror::Error;

/// Why `enable()` refused to start. Non-fatal: the controller logs the
/// refusal and leaves all state unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnableError {
    #[error("cannot enable: tolerance is {0}; set a positive tolerance with set_tolerance()")]
    NonPositiveTolerance(f64),
    #[error("cannot enable: no motion profile assigned; set one with set_profile()")]
    MissingProfile,
    #[error("cannot enable: controller is already enabled; disable() it first")]
    AlreadyEnabled,
}

/// Generator precondition violations. Callers pass positive magnitudes for
/// cruise velocity and acceleration; the generator handles signs itself.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerateError {
    #[error("target position must be nonzero and finite, got {0}")]
    TargetPosition(f64),
    #[error("cruise velocity must be positive and finite, got {0}")]
    CruiseVelocity(f64),
    #[error("acceleration rate must be positive and finite, got {0}")]
    AccelerationRate(f64),
    #[error("sample interval must be positive and finite, got {0}")]
    SampleInterval(f64),
}
