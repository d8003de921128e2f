use twine_core::Model;

use super::{ConvergenceReport, ConvergenceTolerances, MswError, MultisegmentWellEval, WellState};

/// Input of a [`ConvergenceCheck`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceInput {
    /// Average formation volume factor per component.
    pub b_avg: Vec<f64>,
    pub relax_tolerance: bool,
}

/// Model adapter that checks the assembled residual of one well.
///
/// Borrows the evaluator and its state for the duration of a Newton
/// iteration and delegates to
/// [`MultisegmentWellEval::get_well_convergence`].
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceCheck<'a> {
    well: &'a MultisegmentWellEval,
    well_state: &'a WellState,
    tolerances: ConvergenceTolerances,
}

impl<'a> ConvergenceCheck<'a> {
    #[must_use]
    pub fn new(
        well: &'a MultisegmentWellEval,
        well_state: &'a WellState,
        tolerances: ConvergenceTolerances,
    ) -> Self {
        Self {
            well,
            well_state,
            tolerances,
        }
    }
}

impl Model for ConvergenceCheck<'_> {
    type Input = ConvergenceInput;
    type Output = ConvergenceReport;
    type Error = MswError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        self.well.get_well_convergence(
            self.well_state,
            &input.b_avg,
            &self.tolerances,
            input.relax_tolerance,
        )
    }
}
