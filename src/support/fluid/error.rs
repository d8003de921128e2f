use thiserror::Error;

use crate::support::phases::Phase;

/// Errors that may occur when evaluating fluid properties.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// The model has no data for the requested phase.
    #[error("no properties for phase {phase}")]
    MissingPhase { phase: Phase },

    /// The pressure is outside the model's valid domain.
    #[error("out of domain: {context}")]
    OutOfDomain { context: String },

    /// The calculation produced a non-physical value.
    #[error("calculation error: {context}")]
    Calculation { context: String },
}
