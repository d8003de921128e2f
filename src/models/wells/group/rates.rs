use crate::{
    models::wells::spec::{InjectionControlMode, ProductionControlMode, defined},
    support::phases::Phase,
};

use super::{GroupControlError, GroupTree, NodeId, NodeKind, WellRates, controls::slice_of};

impl GroupTree {
    /// Rate of a per-well (or summed) rate block under a production mode.
    ///
    /// Production rates are negative; no sign change is applied here.
    ///
    /// # Errors
    ///
    /// Fails for modes without an associated rate and for phase-specific
    /// modes whose phase is inactive.
    pub fn production_rate_by_mode(
        &self,
        reservoir: &[f64],
        surface: &[f64],
        mode: ProductionControlMode,
    ) -> Result<f64, GroupControlError> {
        let at = |phase: Phase| self.phase_rate(surface, phase);
        match mode {
            ProductionControlMode::Orat => at(Phase::Oil),
            ProductionControlMode::Wrat => at(Phase::Water),
            ProductionControlMode::Grat => at(Phase::Gas),
            ProductionControlMode::Lrat => Ok(at(Phase::Oil)? + at(Phase::Water)?),
            ProductionControlMode::Resv => self.sum_active(reservoir, "reservoir"),
            _ => Err(GroupControlError::UnsupportedMode {
                mode: mode.into(),
                operation: "computing a production rate",
            }),
        }
    }

    /// Rate of a rate block under an injection mode, summed over active phases.
    ///
    /// # Errors
    ///
    /// Fails for modes other than RATE and RESV.
    pub fn injection_rate_by_mode(
        &self,
        reservoir: &[f64],
        surface: &[f64],
        mode: InjectionControlMode,
    ) -> Result<f64, GroupControlError> {
        match mode {
            InjectionControlMode::Rate => self.sum_active(surface, "surface"),
            InjectionControlMode::Resv => self.sum_active(reservoir, "reservoir"),
            _ => Err(GroupControlError::UnsupportedMode {
                mode: mode.into(),
                operation: "computing an injection rate",
            }),
        }
    }

    /// The configured production target of `id` for `mode`.
    ///
    /// Returns `Ok(None)` when the target is undefined.
    ///
    /// # Errors
    ///
    /// Fails for GRUP and for modes that carry no target.
    pub fn production_target(
        &self,
        id: NodeId,
        mode: ProductionControlMode,
    ) -> Result<Option<f64>, GroupControlError> {
        let spec = &self.node(id)?.production;
        let target = match mode {
            ProductionControlMode::Orat => spec.oil_max_rate,
            ProductionControlMode::Wrat => spec.water_max_rate,
            ProductionControlMode::Grat => spec.gas_max_rate,
            ProductionControlMode::Lrat => spec.liquid_max_rate,
            ProductionControlMode::Resv => spec.reservoir_flow_max_rate,
            _ => {
                return Err(GroupControlError::UnsupportedMode {
                    mode: mode.into(),
                    operation: "querying a production target",
                });
            }
        };
        Ok(defined(target))
    }

    /// The configured injection target of `id` for `mode`.
    ///
    /// # Errors
    ///
    /// Fails for modes other than RATE and RESV.
    pub fn injection_target(
        &self,
        id: NodeId,
        mode: InjectionControlMode,
    ) -> Result<Option<f64>, GroupControlError> {
        let spec = &self.node(id)?.injection;
        let target = match mode {
            InjectionControlMode::Rate => spec.surface_flow_max_rate,
            InjectionControlMode::Resv => spec.reservoir_flow_max_rate,
            _ => {
                return Err(GroupControlError::UnsupportedMode {
                    mode: mode.into(),
                    operation: "querying an injection target",
                });
            }
        };
        Ok(defined(target))
    }

    /// Production rate of `phase` summed over the wells of a subtree.
    ///
    /// `phase_flows` holds `num_phases` entries per well. Injectors
    /// contribute nothing.
    ///
    /// # Errors
    ///
    /// Fails if `phase` is inactive or a producer is not attached.
    pub fn total_production_flow(
        &self,
        id: NodeId,
        phase_flows: &[f64],
        phase: Phase,
    ) -> Result<f64, GroupControlError> {
        let position =
            self.phase_usage()
                .position(phase)
                .ok_or(GroupControlError::PhaseNotActive { phase })?;
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Group { children } => children
                .iter()
                .map(|&child| self.total_production_flow(child, phase_flows, phase))
                .sum(),
            NodeKind::Well(_) if node.is_injector() => Ok(0.0),
            NodeKind::Well(_) => {
                let at = self.wells_index(id)? * self.phase_usage().num_phases() + position;
                slice_of(phase_flows, "phase flow", at..at + 1).map(|flow| flow[0])
            }
        }
    }

    /// Production rate of a single well from a flat per-well rate slice.
    ///
    /// # Errors
    ///
    /// Fails for groups, for modes other than ORAT/WRAT/GRAT/LRAT/RESV,
    /// and for inactive phases.
    pub fn production_rate(
        &self,
        id: NodeId,
        well_rates: &[f64],
        mode: ProductionControlMode,
    ) -> Result<f64, GroupControlError> {
        let flow = |phase: Phase| self.total_production_flow(id, well_rates, phase);
        if self.node(id)?.as_well().is_none() {
            return Err(GroupControlError::NotImplemented {
                feature: "production rate of a group",
            });
        }
        match mode {
            ProductionControlMode::Lrat => Ok(flow(Phase::Oil)? + flow(Phase::Water)?),
            ProductionControlMode::Orat => flow(Phase::Oil),
            ProductionControlMode::Wrat => flow(Phase::Water),
            ProductionControlMode::Grat => flow(Phase::Gas),
            ProductionControlMode::Resv => self
                .phase_usage()
                .active_phases()
                .map(flow)
                .sum(),
            _ => Err(GroupControlError::UnsupportedMode {
                mode: mode.into(),
                operation: "computing a well production rate",
            }),
        }
    }

    /// The well in the subtree with the largest `|rate|` under `mode`.
    ///
    /// Leaves are visited depth-first and the first maximum wins. Returns
    /// `None` for a subtree without wells.
    ///
    /// # Errors
    ///
    /// Fails if a well is not attached or `mode` has no associated rate.
    pub fn worst_offending(
        &self,
        id: NodeId,
        rates: &WellRates<'_>,
        mode: ProductionControlMode,
    ) -> Result<Option<(NodeId, f64)>, GroupControlError> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Well(_) => {
                let index = self.wells_index(id)?;
                let (reservoir, surface) = rates.blocks(index, self.phase_usage().num_phases())?;
                let rate = self.production_rate_by_mode(reservoir, surface, mode)?;
                Ok(Some((id, rate.abs())))
            }
            NodeKind::Group { children } => {
                let mut worst: Option<(NodeId, f64)> = None;
                for &child in children {
                    if let Some(candidate) = self.worst_offending(child, rates, mode)? {
                        if worst.is_none_or(|(_, max)| max < candidate.1) {
                            worst = Some(candidate);
                        }
                    }
                }
                Ok(worst)
            }
        }
    }

    fn phase_rate(&self, rates: &[f64], phase: Phase) -> Result<f64, GroupControlError> {
        let position = self
            .phase_usage()
            .position(phase)
            .ok_or(GroupControlError::PhaseNotActive { phase })?;
        slice_of(rates, "surface", position..position + 1).map(|rate| rate[0])
    }

    fn sum_active(&self, rates: &[f64], name: &'static str) -> Result<f64, GroupControlError> {
        Ok(slice_of(rates, name, 0..self.phase_usage().num_phases())?.iter().sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::{
        models::wells::group::test_support::{two_producer_field, two_producer_rates},
        support::phases::PhaseUsage,
    };

    #[test]
    fn resv_sums_exactly_the_active_phases() {
        let reservoir = [-1.0, -2.0, -4.0];
        for (usage, expected) in [
            (PhaseUsage::new(false, true, false), -1.0),
            (PhaseUsage::new(true, true, false), -3.0),
            (PhaseUsage::three_phase(), -7.0),
        ] {
            let tree = GroupTree::new(usage);
            let np = usage.num_phases();
            let rate = tree
                .production_rate_by_mode(&reservoir[..np], &[0.0; 3][..np], ProductionControlMode::Resv)
                .unwrap();
            assert_relative_eq!(rate, expected);
            let rate = tree
                .injection_rate_by_mode(&reservoir[..np], &[0.0; 3][..np], InjectionControlMode::Resv)
                .unwrap();
            assert_relative_eq!(rate, expected);
        }
    }

    #[test]
    fn phase_modes_pick_positions() {
        let tree = GroupTree::new(PhaseUsage::new(true, true, false));
        let surface = [-3.0, -5.0];
        let rate = |mode| tree.production_rate_by_mode(&[0.0; 2], &surface, mode);
        assert_relative_eq!(rate(ProductionControlMode::Wrat).unwrap(), -3.0);
        assert_relative_eq!(rate(ProductionControlMode::Orat).unwrap(), -5.0);
        assert_relative_eq!(rate(ProductionControlMode::Lrat).unwrap(), -8.0);
        assert!(matches!(
            rate(ProductionControlMode::Grat),
            Err(GroupControlError::PhaseNotActive { phase: Phase::Gas })
        ));
        assert!(matches!(
            rate(ProductionControlMode::Grup),
            Err(GroupControlError::UnsupportedMode { .. })
        ));
    }

    #[test]
    fn targets_follow_the_spec_fields() {
        let fixture = two_producer_field();
        let tree = &fixture.tree;
        assert_eq!(
            tree.production_target(fixture.field, ProductionControlMode::Lrat),
            Ok(Some(120.0))
        );
        assert_eq!(
            tree.production_target(fixture.field, ProductionControlMode::Orat),
            Ok(None)
        );
        assert!(tree
            .production_target(fixture.field, ProductionControlMode::Grup)
            .is_err());
        assert!(tree
            .injection_target(fixture.field, InjectionControlMode::Rein)
            .is_err());
    }

    #[test]
    fn total_production_flow_sums_leaves() {
        let fixture = two_producer_field();
        let (_, _, surface) = two_producer_rates();
        let total = fixture
            .tree
            .total_production_flow(fixture.field, &surface, Phase::Oil)
            .unwrap();
        assert_relative_eq!(total, -90.0);

        let p1 = fixture
            .tree
            .production_rate(fixture.p1, &surface, ProductionControlMode::Lrat)
            .unwrap();
        assert_relative_eq!(p1, -90.0);
    }

    #[test]
    fn short_rate_slices_are_errors() {
        let fixture = two_producer_field();
        let (bhp, reservoir, surface) = two_producer_rates();
        let tree = &fixture.tree;

        assert!(matches!(
            tree.total_production_flow(fixture.field, &surface[..1], Phase::Oil),
            Err(GroupControlError::RatesTooShort { rates: "phase flow", len: 1, .. })
        ));
        assert!(matches!(
            tree.production_rate_by_mode(&[-1.0], &[0.0; 3], ProductionControlMode::Resv),
            Err(GroupControlError::RatesTooShort { rates: "reservoir", required: 3, .. })
        ));

        let rates = WellRates {
            bhp: &bhp,
            reservoir: &reservoir[..2],
            surface: &surface,
        };
        assert!(matches!(
            tree.worst_offending(fixture.field, &rates, ProductionControlMode::Lrat),
            Err(GroupControlError::RatesTooShort { rates: "reservoir", .. })
        ));
    }

    #[test]
    fn worst_offending_uses_magnitude() {
        let fixture = two_producer_field();
        let (bhp, reservoir, surface) = two_producer_rates();
        let rates = WellRates {
            bhp: &bhp,
            reservoir: &reservoir,
            surface: &surface,
        };
        let (worst, rate) = fixture
            .tree
            .worst_offending(fixture.field, &rates, ProductionControlMode::Lrat)
            .unwrap()
            .unwrap();
        assert_eq!(worst, fixture.p1);
        assert_relative_eq!(rate, 90.0);
    }
}
