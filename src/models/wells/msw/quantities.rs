//! Fluid quantities derived from the primary variables each iteration.

use num_dual::Dual64;

use crate::support::{
    fluid::{PropertyError, SegmentFluid},
    phases::Phase,
};

use super::{Evaluation, PrimaryVariables, SegmentSet, evaluation::clear_derivatives};

/// Derived state of one segment under one derivative seeding.
#[derive(Debug, Clone, Copy)]
pub(super) struct SegmentState {
    pub(super) pressure: Dual64,
    pub(super) total_rate: Dual64,
    pub(super) fractions: [Dual64; 3],
    pub(super) phase_densities: [Dual64; 3],
    pub(super) phase_viscosities: [Dual64; 3],
    /// Fraction-weighted mixture density.
    pub(super) density: Dual64,
    /// Fraction-weighted mixture viscosity.
    pub(super) viscosity: Dual64,
    pub(super) mass_rate: Dual64,
}

/// Phase fractions, properties, mass rates and upwinding of every segment.
///
/// The state is held once per primary slot so that any term built from it
/// can be collected into an [`Evaluation`].
#[derive(Debug, Clone)]
pub struct SegmentQuantities {
    upwind: Vec<usize>,
    slots: Vec<Vec<SegmentState>>,
}

impl SegmentQuantities {
    pub(super) fn compute(
        segments: &SegmentSet,
        primary: &PrimaryVariables,
        fluid: &impl SegmentFluid,
    ) -> Result<Self, PropertyError> {
        let layout = primary.layout();
        let count = segments.len();

        let upwind = (0..count)
            .map(|seg| match segments.outlet(seg) {
                Some(outlet) if primary.total_rate(seg) > 0.0 => outlet,
                Some(_) => seg,
                None => 0,
            })
            .collect();

        let slots = (0..layout.num_well_eq())
            .map(|slot| {
                (0..count)
                    .map(|seg| {
                        segment_state(primary, seg, slot, fluid, |phase| {
                            layout.phase_usage().is_active(phase)
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { upwind, slots })
    }

    /// Segment whose properties are carried into segment `seg`.
    ///
    /// The top segment upwinds to itself. Other segments use their own
    /// properties when the total rate is not positive and their outlet's
    /// otherwise.
    #[must_use]
    pub fn upwind(&self, seg: usize) -> usize {
        self.upwind[seg]
    }

    /// Mixture density of segment `seg`, in kg/m³.
    #[must_use]
    pub fn density(&self, seg: usize) -> f64 {
        self.states()[seg].density.re
    }

    /// Mixture viscosity of segment `seg`, in Pa·s.
    #[must_use]
    pub fn viscosity(&self, seg: usize) -> f64 {
        self.states()[seg].viscosity.re
    }

    /// Mass rate of segment `seg`, in kg/s.
    #[must_use]
    pub fn mass_rate(&self, seg: usize) -> f64 {
        self.states()[seg].mass_rate.re
    }

    #[must_use]
    pub fn fraction(&self, seg: usize, phase: Phase) -> f64 {
        self.states()[seg].fractions[phase.canonical_index()].re
    }

    /// Evaluates `term` under every seeding.
    pub(super) fn evaluate(&self, term: impl Fn(&[SegmentState]) -> Dual64) -> Evaluation {
        Evaluation::from_slots(self.slots.iter().map(|states| term(states)))
    }

    fn states(&self) -> &[SegmentState] {
        &self.slots[0]
    }
}

/// The state carried into segment `seg` from `upwind`.
///
/// Derivatives are dropped when `upwind` is another segment, so that a
/// segment's row never picks up derivatives of a neighbour's unknowns.
pub(super) fn upwind_state(states: &[SegmentState], seg: usize, upwind: usize) -> SegmentState {
    let state = states[upwind];
    if seg == upwind {
        return state;
    }
    SegmentState {
        pressure: clear_derivatives(state.pressure),
        total_rate: clear_derivatives(state.total_rate),
        fractions: state.fractions.map(clear_derivatives),
        phase_densities: state.phase_densities.map(clear_derivatives),
        phase_viscosities: state.phase_viscosities.map(clear_derivatives),
        density: clear_derivatives(state.density),
        viscosity: clear_derivatives(state.viscosity),
        mass_rate: clear_derivatives(state.mass_rate),
    }
}

fn segment_state(
    primary: &PrimaryVariables,
    seg: usize,
    slot: usize,
    fluid: &impl SegmentFluid,
    is_active: impl Fn(Phase) -> bool,
) -> Result<SegmentState, PropertyError> {
    let variables = primary.seeded(seg, slot);
    let zero = Dual64::from(0.0);

    let mut phase_densities = [zero; 3];
    let mut phase_viscosities = [zero; 3];
    let mut density = zero;
    let mut viscosity = zero;
    for phase in Phase::ALL.into_iter().filter(|&phase| is_active(phase)) {
        let i = phase.canonical_index();
        phase_densities[i] = fluid.density(phase, variables.pressure)?;
        phase_viscosities[i] = fluid.viscosity(phase, variables.pressure)?;
        density = density + variables.fractions[i] * phase_densities[i];
        viscosity = viscosity + variables.fractions[i] * phase_viscosities[i];
    }

    Ok(SegmentState {
        pressure: variables.pressure,
        total_rate: variables.total_rate,
        fractions: variables.fractions,
        phase_densities,
        phase_viscosities,
        density,
        viscosity,
        mass_rate: variables.total_rate * density,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::models::wells::msw::test_support::{
        OIL_DENSITY, WATER_DENSITY, two_segment_well, water_oil_fluid,
    };

    #[test]
    fn mixture_properties_and_mass_rate() {
        let mut well = two_segment_well(false, false);
        well.primary_variables_mut()
            .segment_mut(1)
            .copy_from_slice(&[-0.01, 0.25, 1.0e7]);
        well.compute_segment_quantities(&water_oil_fluid()).unwrap();
        let quantities = well.quantities().unwrap();

        let density = 0.25 * WATER_DENSITY + 0.75 * OIL_DENSITY;
        assert_relative_eq!(quantities.density(1), density);
        assert_relative_eq!(quantities.viscosity(1), 0.25 * 1.0e-3 + 0.75 * 2.0e-3);
        assert_relative_eq!(quantities.mass_rate(1), -0.01 * density);
        assert_relative_eq!(quantities.fraction(1, Phase::Oil), 0.75);
        assert_relative_eq!(quantities.fraction(1, Phase::Gas), 0.0);
    }

    #[test]
    fn upwinding_follows_the_flow_direction() {
        let mut well = two_segment_well(false, false);
        let fluid = water_oil_fluid();

        well.primary_variables_mut().segment_mut(1)[0] = -1.0;
        well.compute_segment_quantities(&fluid).unwrap();
        assert_eq!(well.quantities().unwrap().upwind(0), 0);
        assert_eq!(well.quantities().unwrap().upwind(1), 1);

        well.primary_variables_mut().segment_mut(1)[0] = 0.0;
        well.compute_segment_quantities(&fluid).unwrap();
        assert_eq!(well.quantities().unwrap().upwind(1), 1);

        well.primary_variables_mut().segment_mut(1)[0] = 1.0;
        well.compute_segment_quantities(&fluid).unwrap();
        assert_eq!(well.quantities().unwrap().upwind(1), 0);
    }

    #[test]
    fn density_derivative_follows_the_water_fraction() {
        let mut well = two_segment_well(false, false);
        well.primary_variables_mut()
            .segment_mut(1)
            .copy_from_slice(&[-0.01, 0.25, 1.0e7]);
        well.compute_segment_quantities(&water_oil_fluid()).unwrap();

        let eval = well.quantities().unwrap().evaluate(|states| states[1].density);
        assert_eq!(eval.derivatives.len(), 3);
        assert_relative_eq!(eval.derivatives[0], 0.0);
        assert_relative_eq!(eval.derivatives[1], WATER_DENSITY - OIL_DENSITY);
        assert_relative_eq!(eval.derivatives[2], 0.0);
    }
}
