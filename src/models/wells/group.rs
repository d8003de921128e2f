//! The group → subgroup → well control hierarchy.
//!
//! A [`GroupTree`] owns the nodes; each leaf refers into a caller-owned
//! [`Wells`] table by index. Once per Newton iteration the driver checks
//! [`GroupTree::conditions_met`] bottom-up and, when a limit is broken,
//! the tree either shuts the worst well or pushes a group target down to
//! the wells through guide-rate shares.
//!
//! Producer rates are negative and injector rates positive throughout.

mod conditions;
mod controls;
mod distribute;
mod error;
mod node;
mod rates;
mod summed;
mod targets;
mod tree;

#[cfg(test)]
mod test_support;

pub use conditions::ConditionsOutcome;
pub use controls::{Well, WellControl, WellControlType, WellControls, WellRates, WellType, Wells};
pub use error::GroupControlError;
pub use node::{Node, NodeId, NodeKind, WellNode};
pub use summed::WellPhasesSummed;
pub use tree::GroupTree;
