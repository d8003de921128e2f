use crate::{
    models::wells::spec::{InjectionSpecification, NodeSpecs, ProductionSpecification},
    support::constraint::{Constrained, StrictlyPositive},
};

use super::WellType;

/// Handle of a node in a [`GroupTree`](super::GroupTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(super) usize);

impl NodeId {
    /// Position of the node in its tree's arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A group or well in the control hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    pub(super) parent: Option<NodeId>,
    pub(super) efficiency_factor: Constrained<f64, StrictlyPositive>,
    pub production: ProductionSpecification,
    pub injection: InjectionSpecification,
    /// False once a group control has been pushed onto this node.
    pub individual_control: bool,
    pub should_update_well_targets: bool,
    pub(super) kind: NodeKind,
}

impl Node {
    pub(super) fn new(
        name: String,
        parent: Option<NodeId>,
        efficiency_factor: Constrained<f64, StrictlyPositive>,
        specs: NodeSpecs,
        kind: NodeKind,
    ) -> Self {
        Self {
            name,
            parent,
            efficiency_factor,
            production: specs.production,
            injection: specs.injection,
            individual_control: true,
            should_update_well_targets: false,
            kind,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn efficiency_factor(&self) -> f64 {
        self.efficiency_factor.get()
    }

    pub fn set_efficiency_factor(&mut self, factor: Constrained<f64, StrictlyPositive>) {
        self.efficiency_factor = factor;
    }

    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns the well payload if this node is a leaf.
    #[must_use]
    pub fn as_well(&self) -> Option<&WellNode> {
        match &self.kind {
            NodeKind::Well(well) => Some(well),
            NodeKind::Group { .. } => None,
        }
    }

    pub fn as_well_mut(&mut self) -> Option<&mut WellNode> {
        match &mut self.kind {
            NodeKind::Well(well) => Some(well),
            NodeKind::Group { .. } => None,
        }
    }

    /// Children of a group; empty for wells.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Group { children } => children,
            NodeKind::Well(_) => &[],
        }
    }

    /// True for an attached production well. Groups are neither.
    #[must_use]
    pub fn is_producer(&self) -> bool {
        self.well_type() == Some(WellType::Producer)
    }

    /// True for an attached injection well. Groups are neither.
    #[must_use]
    pub fn is_injector(&self) -> bool {
        self.well_type() == Some(WellType::Injector)
    }

    fn well_type(&self) -> Option<WellType> {
        self.as_well().and_then(|well| well.well_type)
    }
}

/// Payload distinguishing groups from wells.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group { children: Vec<NodeId> },
    Well(WellNode),
}

/// Leaf-specific state of a well node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WellNode {
    pub(super) wells_index: Option<usize>,
    pub(super) group_control_index: Option<usize>,
    /// Stop the well when it is the worst offender of a group violation.
    /// When false the well is instead pinned to a zero surface rate.
    pub shut_on_violation: bool,
    pub(super) well_type: Option<WellType>,
}

impl Default for WellNode {
    fn default() -> Self {
        Self {
            wells_index: None,
            group_control_index: None,
            shut_on_violation: true,
            well_type: None,
        }
    }
}

impl WellNode {
    /// Index of the well in the well table, once attached.
    #[must_use]
    pub fn wells_index(&self) -> Option<usize> {
        self.wells_index
    }

    /// Slot of the group control in the well's control list, once allocated.
    #[must_use]
    pub fn group_control_index(&self) -> Option<usize> {
        self.group_control_index
    }

    #[must_use]
    pub fn well_type(&self) -> Option<WellType> {
        self.well_type
    }
}
