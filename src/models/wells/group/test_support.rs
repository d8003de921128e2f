use crate::{
    models::wells::spec::{
        InjectionSpecification, NodeSpecs, Procedure, ProductionSpecification,
    },
    support::{
        constraint::{Constrained, StrictlyPositive},
        phases::PhaseUsage,
    },
};

use super::{GroupTree, NodeId, Well, WellControl, WellType, Wells};

pub(super) fn efficiency(factor: f64) -> Constrained<f64, StrictlyPositive> {
    StrictlyPositive::new(factor).unwrap()
}

/// A three-phase field group with an LRAT limit of 120 over two producers.
pub(super) struct TwoProducerField {
    pub tree: GroupTree,
    pub wells: Wells,
    pub field: NodeId,
    pub p1: NodeId,
    pub p2: NodeId,
}

/// Builds the field. `P1` has an ORAT limit of 100 and guide rate 100,
/// `P2` an ORAT limit of 50 and guide rate 200. Both have a 50 bar BHP limit
/// and start on their ORAT control.
pub(super) fn two_producer_field() -> TwoProducerField {
    let oil = [0.0, 1.0, 0.0];
    let mut wells = Wells::new();
    let p1_index = wells.push(Well::new(
        "P1",
        WellType::Producer,
        vec![
            WellControl::surface_rate(-100.0, oil),
            WellControl::bhp(5.0e6),
        ],
    ));
    let p2_index = wells.push(Well::new(
        "P2",
        WellType::Producer,
        vec![WellControl::surface_rate(-50.0, oil), WellControl::bhp(5.0e6)],
    ));

    let mut tree = GroupTree::new(PhaseUsage::three_phase());
    let field_spec = ProductionSpecification {
        liquid_max_rate: Some(120.0),
        procedure: Procedure::Well,
        ..ProductionSpecification::default()
    };
    let field = tree
        .add_group(
            "FIELD",
            None,
            efficiency(1.0),
            NodeSpecs::new(field_spec, Default::default()),
        )
        .unwrap();

    let producer = |oil_max_rate, guide_rate| {
        NodeSpecs::producer_well(
            ProductionSpecification {
                oil_max_rate: Some(oil_max_rate),
                ..ProductionSpecification::default()
            }
            .with_guide_rate(guide_rate)
            .unwrap(),
        )
    };
    let p1 = tree
        .add_well("P1", Some(field), efficiency(1.0), producer(100.0, 100.0))
        .unwrap();
    let p2 = tree
        .add_well("P2", Some(field), efficiency(1.0), producer(50.0, 200.0))
        .unwrap();
    tree.attach_well(p1, p1_index, &wells).unwrap();
    tree.attach_well(p2, p2_index, &wells).unwrap();

    TwoProducerField {
        tree,
        wells,
        field,
        p1,
        p2,
    }
}

/// BHP, reservoir and surface rates for [`two_producer_field`].
///
/// Surface LRAT is 90 for `P1` and 40 for `P2`, 130 in total.
pub(super) fn two_producer_rates() -> ([f64; 2], [f64; 6], [f64; 6]) {
    (
        [1.0e7, 1.0e7],
        [-33.0, -66.0, -550.0, -11.0, -33.0, -220.0],
        [-30.0, -60.0, -500.0, -10.0, -30.0, -200.0],
    )
}

/// A two-phase (water, oil) group holding one producer and two injectors.
pub(super) struct InjectionGroup {
    pub tree: GroupTree,
    pub wells: Wells,
    pub group: NodeId,
    pub producer: NodeId,
    pub i1: NodeId,
    pub i2: NodeId,
}

/// Builds the group with the given injection spec. Injector guide rates
/// are 1 (`I1`) and 2 (`I2`); both injectors start under group control.
pub(super) fn injection_group(spec: InjectionSpecification) -> InjectionGroup {
    let mut wells = Wells::new();
    let producer_index = wells.push(Well::new(
        "P",
        WellType::Producer,
        vec![WellControl::bhp(5.0e6)],
    ));
    let i1_index = wells.push(Well::new("I1", WellType::Injector, vec![WellControl::bhp(3.0e7)]));
    let i2_index = wells.push(Well::new("I2", WellType::Injector, vec![WellControl::bhp(3.0e7)]));

    let mut tree = GroupTree::new(PhaseUsage::new(true, true, false));
    let group = tree
        .add_group(
            "INJ",
            None,
            efficiency(1.0),
            NodeSpecs::new(Default::default(), spec),
        )
        .unwrap();
    let producer = tree
        .add_well(
            "P",
            Some(group),
            efficiency(1.0),
            NodeSpecs::producer_well(Default::default()),
        )
        .unwrap();
    let injector = |guide_rate| {
        NodeSpecs::injector_well(
            InjectionSpecification::default()
                .with_guide_rate(guide_rate)
                .unwrap(),
        )
    };
    let i1 = tree
        .add_well("I1", Some(group), efficiency(1.0), injector(1.0))
        .unwrap();
    let i2 = tree
        .add_well("I2", Some(group), efficiency(1.0), injector(2.0))
        .unwrap();
    tree.attach_well(producer, producer_index, &wells).unwrap();
    tree.attach_well(i1, i1_index, &wells).unwrap();
    tree.attach_well(i2, i2_index, &wells).unwrap();
    for node in [i1, i2] {
        tree.node_mut(node).unwrap().individual_control = false;
    }

    InjectionGroup {
        tree,
        wells,
        group,
        producer,
        i1,
        i2,
    }
}

/// The group control currently active on well `index`.
pub(super) fn current_control(wells: &Wells, index: usize) -> WellControl {
    *wells
        .get(index)
        .unwrap()
        .controls
        .current_control()
        .unwrap()
}
