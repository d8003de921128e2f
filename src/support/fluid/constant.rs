//! Fluid model with pressure-independent phase properties.

use num_dual::Dual64;
use uom::si::f64::{DynamicViscosity, MassDensity};

use crate::support::{phases::Phase, units::ToSi};

use super::{PropertyError, SegmentFluid};

/// Density and viscosity of one phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseProperties {
    pub density: MassDensity,
    pub viscosity: DynamicViscosity,
}

impl PhaseProperties {
    #[must_use]
    pub fn new(density: MassDensity, viscosity: DynamicViscosity) -> Self {
        Self { density, viscosity }
    }
}

/// Constant density and viscosity per phase.
///
/// Properties carry no pressure derivative. Phases without properties fail
/// with [`PropertyError::MissingPhase`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstantFluid {
    phases: [Option<PhaseProperties>; 3],
}

impl ConstantFluid {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this model with `properties` assigned to `phase`.
    #[must_use]
    pub fn with_phase(mut self, phase: Phase, properties: PhaseProperties) -> Self {
        self.phases[phase.canonical_index()] = Some(properties);
        self
    }

    fn properties(&self, phase: Phase) -> Result<&PhaseProperties, PropertyError> {
        self.phases[phase.canonical_index()]
            .as_ref()
            .ok_or(PropertyError::MissingPhase { phase })
    }
}

impl SegmentFluid for ConstantFluid {
    fn density(&self, phase: Phase, _pressure: Dual64) -> Result<Dual64, PropertyError> {
        Ok(Dual64::from(self.properties(phase)?.density.to_si()))
    }

    fn viscosity(&self, phase: Phase, _pressure: Dual64) -> Result<Dual64, PropertyError> {
        Ok(Dual64::from(self.properties(phase)?.viscosity.to_si()))
    }
}
