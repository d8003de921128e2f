//! Multisegment well pressure equations and convergence checks.
//!
//! A multisegment well is a tree of [`Segment`]s rooted at the top segment.
//! Each segment carries a total rate, phase fractions and a pressure as
//! primary variables. The [`MultisegmentWellEval`] owns those variables and
//! a per-well [`WellLinearSystem`], and per Newton iteration:
//!
//! 1. derives densities, viscosities, mass rates and upwinding from a
//!    [`SegmentFluid`](crate::support::fluid::SegmentFluid)
//!    ([`MultisegmentWellEval::compute_segment_quantities`]),
//! 2. assembles the segment pressure equations and the control equation,
//! 3. measures convergence of the residual
//!    ([`MultisegmentWellEval::get_well_convergence`]).
//!
//! Mass-balance rows are filled by the caller, which couples the well to the
//! reservoir. Derivatives come from forward-mode dual numbers, see
//! [`Evaluation`].

mod assemble;
mod config;
mod convergence;
mod device;
mod error;
mod eval;
mod evaluation;
mod icd;
mod linear_system;
mod model;
mod pressure_loss;
mod primary;
mod quantities;
mod report;
mod segment;
mod segment_set;
mod well_state;

#[cfg(test)]
mod test_support;

pub use assemble::ControlEquation;
pub use config::{ConvergenceTolerances, MswConfig};
pub use device::{AutoIcd, Device, SpiralIcd, Valve, ValveStatus};
pub use error::MswError;
pub use eval::MultisegmentWellEval;
pub use evaluation::Evaluation;
pub use linear_system::WellLinearSystem;
pub use model::{ConvergenceCheck, ConvergenceInput};
pub use primary::{PrimaryVariables, VariableLayout, WQ_TOTAL};
pub use quantities::SegmentQuantities;
pub use report::{ConvergenceReport, Severity, WellFailure, WellFailureType};
pub use segment::Segment;
pub use segment_set::{SegmentSet, SegmentSetError};
pub use well_state::{SegmentPressureDrops, WellState, WellStatus};
