use tracing::{info, warn};

use crate::models::wells::spec::{InjectionControlMode, ProductionControlMode, Procedure};

use super::{
    GroupControlError, GroupTree, NodeId, NodeKind, WellControl, WellControlType,
    WellPhasesSummed, WellRates, Wells,
};

/// Result of a constraint check over a subtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConditionsOutcome {
    /// Every constraint holds; carries the rates summed over the subtree.
    Met(WellPhasesSummed),
    /// A constraint was violated and corrective action was applied.
    Violated,
}

impl ConditionsOutcome {
    #[must_use]
    pub fn is_met(&self) -> bool {
        matches!(self, Self::Met(_))
    }
}

const INJECTION_CHECK_ORDER: [InjectionControlMode; 2] =
    [InjectionControlMode::Rate, InjectionControlMode::Resv];

const PRODUCTION_CHECK_ORDER: [ProductionControlMode; 5] = [
    ProductionControlMode::Orat,
    ProductionControlMode::Wrat,
    ProductionControlMode::Grat,
    ProductionControlMode::Lrat,
    ProductionControlMode::Resv,
];

impl GroupTree {
    /// Checks the constraints of the subtree rooted at `id`.
    ///
    /// Children are checked first, in order; the first violating child ends
    /// the check. A group then checks its injection targets (RATE, RESV) and
    /// its production targets (ORAT, WRAT, GRAT, LRAT, RESV) against the
    /// summed child rates, skipping its current mode in each direction. A
    /// well checks each of its own controls except the active one and the
    /// group-control slot.
    ///
    /// On a violation the corrective action is applied to `wells` and the
    /// tree before [`ConditionsOutcome::Violated`] is returned.
    ///
    /// # Errors
    ///
    /// Fails on unattached wells, THP controls, and targets defined for an
    /// inactive phase.
    pub fn conditions_met(
        &mut self,
        id: NodeId,
        wells: &mut Wells,
        rates: &WellRates<'_>,
    ) -> Result<ConditionsOutcome, GroupControlError> {
        if matches!(self.node(id)?.kind, NodeKind::Group { .. }) {
            self.group_conditions_met(id, wells, rates)
        } else {
            self.well_conditions_met(id, wells, rates)
        }
    }

    fn group_conditions_met(
        &mut self,
        id: NodeId,
        wells: &mut Wells,
        rates: &WellRates<'_>,
    ) -> Result<ConditionsOutcome, GroupControlError> {
        let mut summed = WellPhasesSummed::default();
        for child in self.children_of(id)? {
            match self.conditions_met(child, wells, rates)? {
                ConditionsOutcome::Met(child_summed) => summed += child_summed,
                ConditionsOutcome::Violated => return Ok(ConditionsOutcome::Violated),
            }
        }

        for mode in INJECTION_CHECK_ORDER {
            if self.node(id)?.injection.control_mode == mode {
                continue;
            }
            let Some(target) = self.injection_target(id, mode)? else {
                continue;
            };
            let rate = self.injection_rate_by_mode(
                &summed.reservoir_injection,
                &summed.surface_injection,
                mode,
            )?;
            if rate > target {
                warn!(
                    group = self.node(id)?.name(),
                    %mode,
                    limit = target,
                    rate,
                    "group injection target not met"
                );
                self.apply_inj_group_control(id, wells, mode, target, false)?;
                self.node_mut(id)?.injection.control_mode = mode;
                return Ok(ConditionsOutcome::Violated);
            }
        }

        for mode in PRODUCTION_CHECK_ORDER {
            if self.node(id)?.production.control_mode == mode {
                continue;
            }
            let Some(target) = self.production_target(id, mode)? else {
                continue;
            };
            let rate = self.production_rate_by_mode(
                &summed.reservoir_production,
                &summed.surface_production,
                mode,
            )?;
            if rate.abs() > target {
                let node = self.node(id)?;
                let procedure = node.production.procedure;
                warn!(
                    group = node.name(),
                    %mode,
                    limit = target,
                    rate,
                    %procedure,
                    "group production target not met"
                );
                match procedure {
                    Procedure::Well => {
                        if let Some((worst, _)) = self.worst_offending(id, rates, mode)? {
                            self.shut_well(worst, wells)?;
                        }
                    }
                    Procedure::Rate => {
                        self.apply_prod_group_control(id, wells, mode, target, false)?;
                    }
                    Procedure::None => {}
                }
                return Ok(ConditionsOutcome::Violated);
            }
        }

        Ok(ConditionsOutcome::Met(summed))
    }

    fn well_conditions_met(
        &self,
        id: NodeId,
        wells: &mut Wells,
        rates: &WellRates<'_>,
    ) -> Result<ConditionsOutcome, GroupControlError> {
        let index = self.wells_index(id)?;
        let np = self.phase_usage().num_phases();
        let (reservoir, surface) = rates.blocks(index, np)?;
        let bhp = rates.bhp(index)?;
        let node = self.node(id)?;

        let mut summed = WellPhasesSummed::default();
        if node.is_injector() {
            summed.reservoir_injection[..np].copy_from_slice(reservoir);
            summed.surface_injection[..np].copy_from_slice(surface);
        } else {
            summed.reservoir_production[..np].copy_from_slice(reservoir);
            summed.surface_production[..np].copy_from_slice(surface);
        }

        let group_slot = node.as_well().and_then(|well| well.group_control_index());
        let controls = &wells
            .get(index)
            .ok_or(GroupControlError::UnknownWell { index })?
            .controls;

        let mut violated = None;
        for (ctrl_index, control) in controls.controls().iter().enumerate() {
            if ctrl_index == controls.current() || Some(ctrl_index) == group_slot {
                continue;
            }
            if limit_violated(control, node.is_producer(), bhp, reservoir, surface)? {
                info!(
                    well = node.name(),
                    control = ?control.kind,
                    limit = control.target,
                    "well limit violated, switching control"
                );
                violated = Some(ctrl_index);
                break;
            }
        }

        match violated {
            Some(ctrl_index) => {
                if let Some(well) = wells.get_mut(index) {
                    well.controls.set_current(ctrl_index);
                }
                Ok(ConditionsOutcome::Violated)
            }
            None => Ok(ConditionsOutcome::Met(summed)),
        }
    }

    /// Takes a well out of production after a group violation.
    ///
    /// Wells flagged `shut_on_violation` are stopped. Others are kept open
    /// with their group-control slot set to a zero surface rate.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not an attached well.
    pub fn shut_well(&mut self, id: NodeId, wells: &mut Wells) -> Result<(), GroupControlError> {
        let index = self.wells_index(id)?;
        let node = self.node(id)?;
        let Some(&well_node) = node.as_well() else {
            return Ok(());
        };
        let controls = &mut wells
            .get_mut(index)
            .ok_or(GroupControlError::UnknownWell { index })?
            .controls;

        if well_node.shut_on_violation {
            info!(well = node.name(), "shutting well");
            controls.stop();
            return Ok(());
        }

        info!(well = node.name(), "pinning well to zero surface rate");
        let slot = controls.set_group_control(
            well_node.group_control_index(),
            WellControl::surface_rate(0.0, [1.0; 3]),
        );
        controls.open();
        if let Some(well_node) = self.node_mut(id)?.as_well_mut() {
            well_node.group_control_index = Some(slot);
        }
        Ok(())
    }
}

/// Whether a single well control limit is exceeded.
fn limit_violated(
    control: &WellControl,
    is_producer: bool,
    bhp: f64,
    reservoir: &[f64],
    surface: &[f64],
) -> Result<bool, GroupControlError> {
    let weighted = |rates: &[f64]| -> f64 {
        rates
            .iter()
            .zip(control.distr)
            .map(|(rate, weight)| rate * weight)
            .sum()
    };
    Ok(match control.kind {
        WellControlType::Bhp => {
            if is_producer {
                control.target > bhp
            } else {
                control.target < bhp
            }
        }
        WellControlType::Thp => {
            return Err(GroupControlError::NotImplemented {
                feature: "THP limit checking",
            });
        }
        WellControlType::ReservoirRate => {
            let rate = weighted(reservoir).abs();
            let target = control.target.abs();
            rate - target > rate.max(target) * 1e-6
        }
        WellControlType::SurfaceRate => weighted(surface).abs() > control.target.abs(),
    })
}
