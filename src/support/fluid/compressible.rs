//! Slightly compressible fluid model.
//!
//! Density follows `ρ = ρ_ref · exp(c · (p − p_ref))` with constant
//! compressibility `c`; viscosity is constant.

use num_dual::{Dual64, DualNum};
use uom::si::f64::{DynamicViscosity, MassDensity, Pressure};

use crate::support::{phases::Phase, units::ToSi};

use super::{PropertyError, SegmentFluid};

/// Parameters of one phase of a [`CompressibleFluid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressiblePhase {
    pub reference_density: MassDensity,
    pub reference_pressure: Pressure,
    /// Compressibility in 1/Pa.
    pub compressibility: f64,
    pub viscosity: DynamicViscosity,
}

/// Exponential-density fluid model with per-phase parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompressibleFluid {
    phases: [Option<CompressiblePhase>; 3],
}

impl CompressibleFluid {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_phase(mut self, phase: Phase, parameters: CompressiblePhase) -> Self {
        self.phases[phase.canonical_index()] = Some(parameters);
        self
    }

    fn parameters(&self, phase: Phase) -> Result<&CompressiblePhase, PropertyError> {
        self.phases[phase.canonical_index()]
            .as_ref()
            .ok_or(PropertyError::MissingPhase { phase })
    }
}

impl SegmentFluid for CompressibleFluid {
    fn density(&self, phase: Phase, pressure: Dual64) -> Result<Dual64, PropertyError> {
        let params = self.parameters(phase)?;
        let exponent = (pressure - params.reference_pressure.to_si()) * params.compressibility;
        let density = exponent.exp() * params.reference_density.to_si();
        if !density.re.is_finite() || density.re <= 0.0 {
            return Err(PropertyError::Calculation {
                context: format!("{phase} density {} at p = {} Pa", density.re, pressure.re),
            });
        }
        Ok(density)
    }

    fn viscosity(&self, phase: Phase, _pressure: Dual64) -> Result<Dual64, PropertyError> {
        Ok(Dual64::from(self.parameters(phase)?.viscosity.to_si()))
    }
}
