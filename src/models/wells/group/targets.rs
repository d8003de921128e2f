use tracing::debug;

use crate::models::wells::spec::ProductionControlMode;

use super::{GroupControlError, GroupTree, NodeId, Wells};

impl GroupTree {
    /// Re-splits a group's production target over its group-controlled
    /// producers.
    ///
    /// The rate already taken by producers under individual control is
    /// subtracted first. A group in FLD follows its parent's mode and target.
    /// Only the level directly above the wells is handled; deeper groups are
    /// not revisited.
    ///
    /// # Errors
    ///
    /// Fails for an FLD group without a parent or parent target, for modes
    /// other than ORAT/WRAT/GRAT/LRAT/RESV, and for unattached wells.
    pub fn update_well_production_targets(
        &mut self,
        id: NodeId,
        wells: &mut Wells,
        well_rates: &[f64],
    ) -> Result<(), GroupControlError> {
        let node = self.node(id)?;
        if node.as_well().is_some() {
            return Ok(());
        }

        let (mode, target) = match node.production.control_mode {
            ProductionControlMode::Fld => {
                let parent_id = node.parent().ok_or_else(|| GroupControlError::MissingParent {
                    name: node.name().to_owned(),
                })?;
                let parent = self.node(parent_id)?;
                let mode = parent.production.control_mode;
                let target = self.production_target(parent_id, mode)?.ok_or_else(|| {
                    GroupControlError::UndefinedTarget {
                        group: parent.name().to_owned(),
                        mode: mode.into(),
                    }
                })?;
                (mode, target / parent.efficiency_factor())
            }
            mode @ (ProductionControlMode::Orat
            | ProductionControlMode::Wrat
            | ProductionControlMode::Grat
            | ProductionControlMode::Lrat
            | ProductionControlMode::Resv) => {
                let target = self.production_target(id, mode)?.ok_or_else(|| {
                    GroupControlError::UndefinedTarget {
                        group: node.name().to_owned(),
                        mode: mode.into(),
                    }
                })?;
                (mode, target)
            }
            mode => {
                return Err(GroupControlError::UnsupportedMode {
                    mode: mode.into(),
                    operation: "updating well production targets",
                });
            }
        };
        let target = target / node.efficiency_factor();

        let children = self.children_of(id)?;
        let mut individual_rate = 0.0;
        for &child in &children {
            let child_node = self.node(child)?;
            if child_node.individual_control && child_node.is_producer() {
                let rate = self.production_rate(child, well_rates, mode)?;
                individual_rate += (rate * child_node.efficiency_factor()).abs();
            }
        }
        let remaining = target - individual_rate;

        let my_guide_rate = self.production_guide_rate(id, true)?.get();
        if my_guide_rate == 0.0 {
            return Ok(());
        }
        debug!(
            group = self.node(id)?.name(),
            %mode,
            remaining,
            "redistributing production target"
        );
        for child in children {
            let child_node = self.node(child)?;
            if child_node.individual_control || !child_node.is_producer() {
                continue;
            }
            let share = self.production_guide_rate(child, true)?.get() / my_guide_rate;
            self.apply_prod_group_control(child, wells, mode, share * remaining, true)?;
            self.node_mut(child)?.should_update_well_targets = false;
        }
        Ok(())
    }

    /// Marks the group-controlled injectors below `id` as up to date.
    ///
    /// Injection targets are not redistributed yet.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not part of this tree.
    pub fn update_well_injection_targets(&mut self, id: NodeId) -> Result<(), GroupControlError> {
        for child in self.children_of(id)? {
            let child_node = self.node_mut(child)?;
            if !child_node.individual_control && child_node.is_injector() {
                child_node.should_update_well_targets = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::models::wells::group::{
        WellControlType,
        test_support::{current_control, injection_group, two_producer_field, two_producer_rates},
    };
    use crate::models::wells::spec::InjectionSpecification;

    #[test]
    fn individual_rates_are_subtracted_before_the_split() {
        let mut fixture = two_producer_field();
        let (_, _, surface) = two_producer_rates();
        fixture.tree.node_mut(fixture.field).unwrap().production.control_mode =
            ProductionControlMode::Lrat;
        let p2 = fixture.tree.node_mut(fixture.p2).unwrap();
        p2.individual_control = false;
        p2.should_update_well_targets = true;

        fixture
            .tree
            .update_well_production_targets(fixture.field, &mut fixture.wells, &surface)
            .unwrap();

        // LRAT 120 minus the 90 P1 produces on its own.
        let control = current_control(&fixture.wells, 1);
        assert_eq!(control.kind, WellControlType::SurfaceRate);
        assert_relative_eq!(control.target, -30.0);
        assert_eq!(control.distr, [1.0, 1.0, 0.0]);
        assert!(!fixture.tree.node(fixture.p2).unwrap().should_update_well_targets);

        // P1 keeps its own ORAT control.
        assert_relative_eq!(current_control(&fixture.wells, 0).target, -100.0);
    }

    #[test]
    fn all_individual_producers_leave_targets_untouched() {
        let mut fixture = two_producer_field();
        let (_, _, surface) = two_producer_rates();
        fixture.tree.node_mut(fixture.field).unwrap().production.control_mode =
            ProductionControlMode::Lrat;
        let before = fixture.wells.clone();

        fixture
            .tree
            .update_well_production_targets(fixture.field, &mut fixture.wells, &surface)
            .unwrap();
        assert_eq!(fixture.wells, before);
    }

    #[test]
    fn unsupported_group_modes_are_rejected() {
        let mut fixture = two_producer_field();
        let (_, _, surface) = two_producer_rates();
        fixture.tree.node_mut(fixture.field).unwrap().production.control_mode =
            ProductionControlMode::Bhp;
        assert!(matches!(
            fixture
                .tree
                .update_well_production_targets(fixture.field, &mut fixture.wells, &surface),
            Err(GroupControlError::UnsupportedMode { .. })
        ));

        fixture.tree.node_mut(fixture.field).unwrap().production.control_mode =
            ProductionControlMode::Fld;
        assert!(matches!(
            fixture
                .tree
                .update_well_production_targets(fixture.field, &mut fixture.wells, &surface),
            Err(GroupControlError::MissingParent { .. })
        ));
    }

    #[test]
    fn wells_are_a_no_op() {
        let mut fixture = two_producer_field();
        let (_, _, surface) = two_producer_rates();
        fixture
            .tree
            .update_well_production_targets(fixture.p1, &mut fixture.wells, &surface)
            .unwrap();
    }

    #[test]
    fn injection_update_clears_group_controlled_injectors() {
        let mut fixture = injection_group(InjectionSpecification::default());
        for node in [fixture.producer, fixture.i1, fixture.i2] {
            fixture.tree.node_mut(node).unwrap().should_update_well_targets = true;
        }
        fixture.tree.node_mut(fixture.i2).unwrap().individual_control = true;

        fixture
            .tree
            .update_well_injection_targets(fixture.group)
            .unwrap();

        let flag = |id| fixture.tree.node(id).unwrap().should_update_well_targets;
        assert!(!flag(fixture.i1));
        assert!(flag(fixture.i2));
        assert!(flag(fixture.producer));
    }
}
