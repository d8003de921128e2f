use tracing::trace;

use crate::support::{fluid::SegmentFluid, phases::PhaseUsage};

use super::{
    MswConfig, MswError, PrimaryVariables, SegmentQuantities, SegmentSet, VariableLayout,
    WellLinearSystem,
};

/// Equation assembly and convergence checking for one multisegment well.
///
/// Each Newton iteration the driver updates the primary variables, calls
/// [`compute_segment_quantities`](Self::compute_segment_quantities), fills
/// the mass-balance rows of the [`WellLinearSystem`], and assembles the
/// pressure and control equations here.
#[derive(Debug, Clone)]
pub struct MultisegmentWellEval {
    name: String,
    segments: SegmentSet,
    layout: VariableLayout,
    primary: PrimaryVariables,
    quantities: Option<SegmentQuantities>,
    linear_system: WellLinearSystem,
    config: MswConfig,
}

impl MultisegmentWellEval {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        segments: SegmentSet,
        phase_usage: PhaseUsage,
        config: MswConfig,
    ) -> Self {
        let layout = VariableLayout::new(phase_usage);
        let count = segments.len();
        Self {
            name: name.into(),
            segments,
            layout,
            primary: PrimaryVariables::new(layout, count),
            quantities: None,
            linear_system: WellLinearSystem::new(count, layout.num_well_eq()),
            config,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn segments(&self) -> &SegmentSet {
        &self.segments
    }

    #[must_use]
    pub fn layout(&self) -> &VariableLayout {
        &self.layout
    }

    #[must_use]
    pub fn config(&self) -> &MswConfig {
        &self.config
    }

    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn primary_variables(&self) -> &PrimaryVariables {
        &self.primary
    }

    /// Mutable access to the primary variables.
    ///
    /// Invalidates the segment quantities.
    pub fn primary_variables_mut(&mut self) -> &mut PrimaryVariables {
        self.quantities = None;
        &mut self.primary
    }

    /// Quantities of the last [`compute_segment_quantities`](Self::compute_segment_quantities),
    /// if the primary variables have not changed since.
    #[must_use]
    pub fn quantities(&self) -> Option<&SegmentQuantities> {
        self.quantities.as_ref()
    }

    #[must_use]
    pub fn linear_system(&self) -> &WellLinearSystem {
        &self.linear_system
    }

    pub fn linear_system_mut(&mut self) -> &mut WellLinearSystem {
        &mut self.linear_system
    }

    /// Recomputes fractions, properties, mass rates and upwinding from the
    /// current primary variables.
    ///
    /// # Errors
    ///
    /// Returns [`MswError::Property`] if the fluid cannot be evaluated.
    pub fn compute_segment_quantities(&mut self, fluid: &impl SegmentFluid) -> Result<(), MswError> {
        let quantities = SegmentQuantities::compute(&self.segments, &self.primary, fluid)?;
        trace!(well = %self.name, segments = self.segments.len(), "computed segment quantities");
        self.quantities = Some(quantities);
        Ok(())
    }

    pub(super) fn current_quantities(&self) -> Result<&SegmentQuantities, MswError> {
        self.quantities.as_ref().ok_or(MswError::StaleQuantities)
    }
}
