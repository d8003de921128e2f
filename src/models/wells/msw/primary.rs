//! Per-segment primary variables and their slot layout.

use num_dual::Dual64;

use crate::support::phases::{Phase, PhaseUsage};

/// Slot of the total rate in every segment.
pub const WQ_TOTAL: usize = 0;

/// Position of each primary variable within a segment.
///
/// Slots are `WQTotal`, then `WFrac` when water is active alongside another
/// phase, then `GFrac` when gas and oil are both active, and `SPres` last.
/// There is one well equation per slot; the `SPres` row of the top segment
/// holds the control equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableLayout {
    phase_usage: PhaseUsage,
    wfrac: Option<usize>,
    gfrac: Option<usize>,
    num_well_eq: usize,
}

impl VariableLayout {
    #[must_use]
    pub fn new(phase_usage: PhaseUsage) -> Self {
        let mut next = WQ_TOTAL + 1;
        let mut take = |present: bool| {
            present.then(|| {
                next += 1;
                next - 1
            })
        };
        let wfrac = take(phase_usage.is_active(Phase::Water) && phase_usage.num_phases() > 1);
        let gfrac = take(phase_usage.is_active(Phase::Gas) && phase_usage.is_active(Phase::Oil));
        Self {
            phase_usage,
            wfrac,
            gfrac,
            num_well_eq: next + 1,
        }
    }

    #[must_use]
    pub fn phase_usage(&self) -> &PhaseUsage {
        &self.phase_usage
    }

    #[must_use]
    pub fn wfrac(&self) -> Option<usize> {
        self.wfrac
    }

    #[must_use]
    pub fn gfrac(&self) -> Option<usize> {
        self.gfrac
    }

    #[must_use]
    pub fn spres(&self) -> usize {
        self.num_well_eq - 1
    }

    /// One mass-balance component per active phase.
    #[must_use]
    pub fn num_components(&self) -> usize {
        self.phase_usage.num_phases()
    }

    #[must_use]
    pub fn num_well_eq(&self) -> usize {
        self.num_well_eq
    }

    /// The phase whose fraction is `1 - WFrac - GFrac`.
    ///
    /// Oil when active, otherwise gas, otherwise water.
    #[must_use]
    pub fn remainder_phase(&self) -> Phase {
        [Phase::Oil, Phase::Gas]
            .into_iter()
            .find(|&phase| self.phase_usage.is_active(phase))
            .unwrap_or(Phase::Water)
    }
}

/// Primary variable values of every segment of a well.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryVariables {
    layout: VariableLayout,
    values: Vec<f64>,
}

impl PrimaryVariables {
    /// All-zero variables for `num_segments` segments.
    #[must_use]
    pub fn new(layout: VariableLayout, num_segments: usize) -> Self {
        Self {
            layout,
            values: vec![0.0; num_segments * layout.num_well_eq()],
        }
    }

    #[must_use]
    pub fn layout(&self) -> &VariableLayout {
        &self.layout
    }

    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.values.len() / self.layout.num_well_eq()
    }

    /// Values of segment `seg`, indexed by slot.
    ///
    /// # Panics
    ///
    /// Panics if `seg` is out of range.
    #[must_use]
    pub fn segment(&self, seg: usize) -> &[f64] {
        let n = self.layout.num_well_eq();
        &self.values[seg * n..(seg + 1) * n]
    }

    /// Mutable values of segment `seg`, indexed by slot.
    ///
    /// # Panics
    ///
    /// Panics if `seg` is out of range.
    pub fn segment_mut(&mut self, seg: usize) -> &mut [f64] {
        let n = self.layout.num_well_eq();
        &mut self.values[seg * n..(seg + 1) * n]
    }

    #[must_use]
    pub fn total_rate(&self, seg: usize) -> f64 {
        self.segment(seg)[WQ_TOTAL]
    }

    #[must_use]
    pub fn pressure(&self, seg: usize) -> f64 {
        self.segment(seg)[self.layout.spres()]
    }

    /// Segment `seg` as dual numbers with variable `slot` seeded.
    pub(super) fn seeded(&self, seg: usize, slot: usize) -> SeededVariables {
        let variable = |index: usize| {
            Dual64::new(
                self.segment(seg)[index],
                if index == slot { 1.0 } else { 0.0 },
            )
        };
        let one = Dual64::from(1.0);
        let zero = Dual64::from(0.0);

        let mut fractions = [zero; 3];
        let mut remainder = one;
        for (phase, index) in [
            (Phase::Water, self.layout.wfrac),
            (Phase::Gas, self.layout.gfrac),
        ] {
            if let Some(index) = index {
                let fraction = variable(index);
                fractions[phase.canonical_index()] = fraction;
                remainder = remainder - fraction;
            }
        }
        fractions[self.layout.remainder_phase().canonical_index()] = remainder;

        SeededVariables {
            total_rate: variable(WQ_TOTAL),
            pressure: variable(self.layout.spres()),
            fractions,
        }
    }
}

/// One segment's unknowns as duals, with fractions of all three phases.
///
/// Inactive phases have zero fraction.
#[derive(Debug, Clone, Copy)]
pub(super) struct SeededVariables {
    pub(super) total_rate: Dual64,
    pub(super) pressure: Dual64,
    pub(super) fractions: [Dual64; 3],
}
