use thiserror::Error;

use crate::{models::wells::spec::ControlMode, support::phases::Phase};

use super::NodeId;

/// Errors raised by the group control hierarchy.
///
/// These are configuration errors: the tree was asked to do something that
/// has no defined meaning for the node or control mode involved.
/// Recoverable target violations are not errors; they are reported as
/// [`ConditionsOutcome::Violated`](super::ConditionsOutcome::Violated).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GroupControlError {
    /// The control mode has no rule for the requested operation.
    #[error("{mode} is not supported when {operation}")]
    UnsupportedMode {
        mode: ControlMode,
        operation: &'static str,
    },

    #[error("{feature} is not implemented")]
    NotImplemented { feature: &'static str },

    /// A top-level group control was applied to a group whose children
    /// have a zero summed guide rate.
    #[error("sum of guide rates is zero for group `{group}`")]
    ZeroGuideRate { group: String },

    #[error("group `{group}` has no defined {mode} target")]
    UndefinedTarget { group: String, mode: ControlMode },

    #[error("{phase} phase is not active")]
    PhaseNotActive { phase: Phase },

    /// The well node has not been attached to an entry of the well table.
    #[error("well `{name}` is not attached to the well table")]
    WellNotAttached { name: String },

    #[error("well table has no entry {index}")]
    UnknownWell { index: usize },

    /// A caller-provided rate slice is too short for the index it is read at.
    #[error("{rates} rates hold {len} entries, at least {required} are needed")]
    RatesTooShort {
        rates: &'static str,
        len: usize,
        required: usize,
    },

    #[error("node `{name}` has no parent")]
    MissingParent { name: String },

    #[error("a node named `{name}` already exists")]
    DuplicateName { name: String },

    #[error("node `{name}` is a well and cannot have children")]
    NotAGroup { name: String },

    #[error("node `{name}` is a group, not a well")]
    NotAWell { name: String },

    #[error("node {id:?} does not belong to this tree")]
    UnknownNode { id: NodeId },
}
