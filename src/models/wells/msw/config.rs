use uom::si::{
    f64::{Acceleration, Pressure},
    pressure::pascal,
};

use crate::support::units::standard_gravity;

/// Which pressure-loss terms enter the segment equations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MswConfig {
    pub friction: bool,
    pub acceleration: bool,
    pub gravity: Acceleration,
}

impl Default for MswConfig {
    fn default() -> Self {
        Self {
            friction: true,
            acceleration: false,
            gravity: standard_gravity(),
        }
    }
}

/// Tolerances of the well convergence check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceTolerances {
    /// Flux residuals above this are [`Severity::TooLarge`](super::Severity::TooLarge).
    pub max_residual_allowed: f64,

    /// Flux and rate-control tolerance.
    pub tolerance_wells: f64,

    /// Flux tolerance that still applies when tolerances are relaxed.
    pub relaxed_inner_tolerance_flow: f64,

    /// Segment pressure equation and pressure-control tolerance.
    pub tolerance_pressure: Pressure,

    /// Pressure tolerance that still applies when tolerances are relaxed.
    pub relaxed_inner_tolerance_pressure: Pressure,
}

impl Default for ConvergenceTolerances {
    fn default() -> Self {
        Self {
            max_residual_allowed: 1.0e7,
            tolerance_wells: 1.0e-4,
            relaxed_inner_tolerance_flow: 1.0e-3,
            tolerance_pressure: Pressure::new::<pascal>(1.0e3),
            relaxed_inner_tolerance_pressure: Pressure::new::<pascal>(1.0e4),
        }
    }
}
