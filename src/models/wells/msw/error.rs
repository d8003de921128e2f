use thiserror::Error;

use crate::{models::wells::spec::ControlMode, support::fluid::PropertyError};

use super::SegmentSetError;

/// Errors raised while assembling or checking a multisegment well.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MswError {
    /// The top segment's row holds the control equation, not a pressure
    /// equation.
    #[error("the top segment has no pressure equation")]
    TopSegment,

    #[error("segment index {index} is out of range")]
    UnknownSegment { index: usize },

    #[error("segment {number} of well {well} is not an inflow-control device")]
    NotIcdSegment { well: String, number: u32 },

    /// Assembly was requested before segment quantities were computed for
    /// the current primary variables.
    #[error("segment quantities are stale")]
    StaleQuantities,

    #[error("unknown control mode {mode} for well {well}")]
    UnknownControlMode { well: String, mode: ControlMode },

    #[error("expected {expected} {what}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A residual is NaN or infinite.
    #[error("non-finite residual for well {well} (segment {segment:?}, equation {equation})")]
    NonFiniteResidual {
        well: String,
        segment: Option<usize>,
        equation: usize,
    },

    #[error("fluid property evaluation failed")]
    Property(#[from] PropertyError),

    #[error("invalid segment configuration")]
    SegmentSet(#[from] SegmentSetError),
}
