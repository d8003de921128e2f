use crate::{
    models::wells::spec::NodeSpecs,
    support::{
        constraint::{Constrained, NonNegative, StrictlyPositive},
        phases::PhaseUsage,
    },
};

use super::{GroupControlError, Node, NodeId, NodeKind, WellNode, Wells};

/// Arena-backed group → subgroup → well hierarchy.
///
/// Nodes are added top-down and addressed by [`NodeId`]. Every node records
/// its parent, so ancestor walks need no back-pointers. The tree may hold
/// several roots.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTree {
    nodes: Vec<Node>,
    phase_usage: PhaseUsage,
}

impl GroupTree {
    /// Creates an empty tree sharing `phase_usage` across all nodes.
    #[must_use]
    pub fn new(phase_usage: PhaseUsage) -> Self {
        Self {
            nodes: Vec::new(),
            phase_usage,
        }
    }

    #[must_use]
    pub fn phase_usage(&self) -> &PhaseUsage {
        &self.phase_usage
    }

    /// Adds a group under `parent`, or as a root when `parent` is `None`.
    ///
    /// # Errors
    ///
    /// Fails if the name is taken, or if `parent` is unknown or is a well.
    pub fn add_group(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        efficiency_factor: Constrained<f64, StrictlyPositive>,
        specs: NodeSpecs,
    ) -> Result<NodeId, GroupControlError> {
        self.insert(
            name.into(),
            parent,
            efficiency_factor,
            specs,
            NodeKind::Group {
                children: Vec::new(),
            },
        )
    }

    /// Adds a well leaf under `parent`, or as a root when `parent` is `None`.
    ///
    /// The well must be attached with [`attach_well`](Self::attach_well)
    /// before it takes part in constraint checks.
    ///
    /// # Errors
    ///
    /// Fails if the name is taken, or if `parent` is unknown or is a well.
    pub fn add_well(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        efficiency_factor: Constrained<f64, StrictlyPositive>,
        specs: NodeSpecs,
    ) -> Result<NodeId, GroupControlError> {
        self.insert(
            name.into(),
            parent,
            efficiency_factor,
            specs,
            NodeKind::Well(WellNode::default()),
        )
    }

    fn insert(
        &mut self,
        name: String,
        parent: Option<NodeId>,
        efficiency_factor: Constrained<f64, StrictlyPositive>,
        specs: NodeSpecs,
        kind: NodeKind,
    ) -> Result<NodeId, GroupControlError> {
        if self.nodes.iter().any(|node| node.name() == name) {
            return Err(GroupControlError::DuplicateName { name });
        }
        let id = NodeId(self.nodes.len());
        if let Some(parent) = parent {
            let parent_node = self.node(parent)?;
            if parent_node.as_well().is_some() {
                return Err(GroupControlError::NotAGroup {
                    name: parent_node.name().to_owned(),
                });
            }
            if let NodeKind::Group { children } = &mut self.nodes[parent.0].kind {
                children.push(id);
            }
        }
        self.nodes
            .push(Node::new(name, parent, efficiency_factor, specs, kind));
        Ok(id)
    }

    /// Binds a well node to entry `index` of the well table.
    ///
    /// The node takes its producer/injector type from that entry.
    ///
    /// # Errors
    ///
    /// Fails if `node` is not a well of this tree or `index` is out of range.
    pub fn attach_well(
        &mut self,
        node: NodeId,
        index: usize,
        wells: &Wells,
    ) -> Result<(), GroupControlError> {
        let well_type = wells
            .get(index)
            .ok_or(GroupControlError::UnknownWell { index })?
            .well_type;
        let node = self.node_mut(node)?;
        if let NodeKind::Well(well) = &mut node.kind {
            well.wells_index = Some(index);
            well.well_type = Some(well_type);
            Ok(())
        } else {
            Err(GroupControlError::NotAWell {
                name: node.name().to_owned(),
            })
        }
    }

    /// Returns the node with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GroupControlError::UnknownNode`] for an id from another tree.
    pub fn node(&self, id: NodeId) -> Result<&Node, GroupControlError> {
        self.nodes
            .get(id.0)
            .ok_or(GroupControlError::UnknownNode { id })
    }

    /// Mutable access to a node, for editing its specifications and flags.
    ///
    /// # Errors
    ///
    /// Returns [`GroupControlError::UnknownNode`] for an id from another tree.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, GroupControlError> {
        self.nodes
            .get_mut(id.0)
            .ok_or(GroupControlError::UnknownNode { id })
    }

    /// Iterates over the nodes without a parent.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(index, _)| NodeId(index))
    }

    /// Children of `id`, copied so the caller may mutate the tree while
    /// walking them.
    pub(super) fn children_of(&self, id: NodeId) -> Result<Vec<NodeId>, GroupControlError> {
        Ok(self.node(id)?.children().to_vec())
    }

    /// Depth-first search for `name` in the subtree rooted at `from`.
    #[must_use]
    pub fn find_group(&self, from: NodeId, name: &str) -> Option<NodeId> {
        let node = self.nodes.get(from.0)?;
        if node.name() == name {
            return Some(from);
        }
        node.children()
            .iter()
            .find_map(|&child| self.find_group(child, name))
    }

    /// Product of the efficiency factors of `id` and all its ancestors.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not part of this tree.
    pub fn accumulative_efficiency_factor(&self, id: NodeId) -> Result<f64, GroupControlError> {
        let mut node = self.node(id)?;
        let mut factor = node.efficiency_factor();
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            factor *= node.efficiency_factor();
        }
        Ok(factor)
    }

    /// Number of wells in the subtree rooted at `id`.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not part of this tree.
    pub fn number_of_leaf_nodes(&self, id: NodeId) -> Result<usize, GroupControlError> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Well(_) => Ok(1),
            NodeKind::Group { children } => children
                .iter()
                .map(|&child| self.number_of_leaf_nodes(child))
                .sum(),
        }
    }

    /// Production guide rate of `id`.
    ///
    /// A group sums its children; with `only_group` it skips children still
    /// under individual control. A well returns its guide rate unless
    /// `only_group` is set and it is under individual control.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not part of this tree.
    pub fn production_guide_rate(
        &self,
        id: NodeId,
        only_group: bool,
    ) -> Result<Constrained<f64, NonNegative>, GroupControlError> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Group { children } => {
                let mut sum = NonNegative::zero();
                for &child in children {
                    if only_group && self.node(child)?.individual_control {
                        continue;
                    }
                    sum = sum + self.production_guide_rate(child, only_group)?;
                }
                Ok(sum)
            }
            NodeKind::Well(_) => Ok(if !only_group || !node.individual_control {
                node.production.guide_rate
            } else {
                NonNegative::zero()
            }),
        }
    }

    /// Injection guide rate of `id`.
    ///
    /// A group sums all its children; the `only_group` filter applies at the
    /// wells.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not part of this tree.
    pub fn injection_guide_rate(
        &self,
        id: NodeId,
        only_group: bool,
    ) -> Result<Constrained<f64, NonNegative>, GroupControlError> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Group { children } => children
                .iter()
                .map(|&child| self.injection_guide_rate(child, only_group))
                .sum(),
            NodeKind::Well(_) => Ok(if !only_group || !node.individual_control {
                node.injection.guide_rate
            } else {
                NonNegative::zero()
            }),
        }
    }

    /// Resolves the well-table entry of a leaf.
    pub(super) fn wells_index(&self, id: NodeId) -> Result<usize, GroupControlError> {
        let node = self.node(id)?;
        node.as_well()
            .and_then(WellNode::wells_index)
            .ok_or_else(|| GroupControlError::WellNotAttached {
                name: node.name().to_owned(),
            })
    }
}
