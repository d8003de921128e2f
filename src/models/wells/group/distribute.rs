//! Top-down distribution of group targets by guide rate.

use tracing::{debug, info};

use crate::{
    models::wells::spec::{ControlMode, InjectionControlMode, ProductionControlMode},
    support::phases::{Phase, PhaseUsage},
};

use super::{GroupControlError, GroupTree, NodeId, WellControl, WellRates, Wells};

/// Mode used to distribute REIN reinjection targets.
#[cfg(not(feature = "reinjection-as-resv"))]
const REINJECTION_MODE: InjectionControlMode = InjectionControlMode::Rate;
#[cfg(feature = "reinjection-as-resv")]
const REINJECTION_MODE: InjectionControlMode = InjectionControlMode::Resv;

impl GroupTree {
    /// Pushes a production target for `mode` down the subtree at `id`.
    ///
    /// A group with mode NONE ignores the call. Otherwise, unless
    /// `only_group` is set and the group is not itself following its parent
    /// (FLD), each child receives `target / efficiency` scaled by its guide
    /// rate share and the group switches to FLD. A zero total guide rate
    /// leaves everything untouched.
    ///
    /// A producing well installs the target (negated and divided by its
    /// efficiency factor) in its group-control slot and makes it active.
    /// Injectors ignore production targets.
    ///
    /// # Errors
    ///
    /// Fails for modes without a rate control, for an inactive phase, or an
    /// unattached well.
    pub fn apply_prod_group_control(
        &mut self,
        id: NodeId,
        wells: &mut Wells,
        mode: ProductionControlMode,
        target: f64,
        only_group: bool,
    ) -> Result<(), GroupControlError> {
        let node = self.node(id)?;
        if node.as_well().is_some() {
            if !node.is_producer() {
                debug_assert!(target == 0.0, "production target pushed onto an injector");
                return Ok(());
            }
            if only_group && node.individual_control {
                return Ok(());
            }
            let control = production_group_control(
                self.phase_usage(),
                mode,
                -target / node.efficiency_factor(),
            )?;
            return self.set_well_group_control(id, wells, control);
        }

        let own_mode = node.production.control_mode;
        if own_mode == ProductionControlMode::None
            || (only_group && own_mode != ProductionControlMode::Fld)
        {
            return Ok(());
        }
        let my_guide_rate = self.production_guide_rate(id, false)?.get();
        if my_guide_rate == 0.0 {
            return Ok(());
        }
        let scaled = target / node.efficiency_factor();
        for child in self.children_of(id)? {
            let share = self.production_guide_rate(child, only_group)?.get() / my_guide_rate;
            self.apply_prod_group_control(child, wells, mode, scaled * share, false)?;
        }
        self.node_mut(id)?.production.control_mode = ProductionControlMode::Fld;
        Ok(())
    }

    /// Pushes an injection target for `mode` down the subtree at `id`.
    ///
    /// Mirrors [`apply_prod_group_control`](Self::apply_prod_group_control),
    /// except that a group's own guide rate honours `only_group` and well
    /// targets are positive.
    ///
    /// # Errors
    ///
    /// Fails for modes other than RATE and RESV, or an unattached well.
    pub fn apply_inj_group_control(
        &mut self,
        id: NodeId,
        wells: &mut Wells,
        mode: InjectionControlMode,
        target: f64,
        only_group: bool,
    ) -> Result<(), GroupControlError> {
        let node = self.node(id)?;
        if node.as_well().is_some() {
            if !node.is_injector() {
                debug_assert!(target == 0.0, "injection target pushed onto a producer");
                return Ok(());
            }
            if only_group && node.individual_control {
                return Ok(());
            }
            let control = injection_group_control(mode, target / node.efficiency_factor())?;
            return self.set_well_group_control(id, wells, control);
        }

        let own_mode = node.injection.control_mode;
        if own_mode == InjectionControlMode::None
            || (only_group && own_mode != InjectionControlMode::Fld)
        {
            return Ok(());
        }
        let my_guide_rate = self.injection_guide_rate(id, only_group)?.get();
        if my_guide_rate == 0.0 {
            return Ok(());
        }
        let scaled = target / node.efficiency_factor();
        for child in self.children_of(id)? {
            let share = self.injection_guide_rate(child, only_group)?.get() / my_guide_rate;
            self.apply_inj_group_control(child, wells, mode, scaled * share, false)?;
        }
        self.node_mut(id)?.injection.control_mode = InjectionControlMode::Fld;
        Ok(())
    }

    /// Applies each group's own production target to its children.
    ///
    /// Groups in a rate mode split their target over all children by guide
    /// rate. Groups in FLD or NONE pass the call on to their children.
    ///
    /// # Errors
    ///
    /// Fails with [`GroupControlError::ZeroGuideRate`] when a rate-mode
    /// group's children have no guide rate, with
    /// [`GroupControlError::UndefinedTarget`] when its target is missing,
    /// and with [`GroupControlError::UnsupportedMode`] for other modes.
    pub fn apply_prod_group_controls(
        &mut self,
        id: NodeId,
        wells: &mut Wells,
    ) -> Result<(), GroupControlError> {
        let node = self.node(id)?;
        if node.as_well().is_some() {
            return Ok(());
        }
        let mode = node.production.control_mode;
        match mode {
            ProductionControlMode::Orat
            | ProductionControlMode::Wrat
            | ProductionControlMode::Grat
            | ProductionControlMode::Lrat
            | ProductionControlMode::Resv => {
                let my_guide_rate = self.production_guide_rate(id, false)?.get();
                let target = self.rate_mode_target(id, my_guide_rate, mode.into(), |tree| {
                    tree.production_target(id, mode)
                })?;
                for child in self.children_of(id)? {
                    let share = self.production_guide_rate(child, false)?.get() / my_guide_rate;
                    self.apply_prod_group_control(child, wells, mode, share * target, false)?;
                }
                Ok(())
            }
            ProductionControlMode::Fld | ProductionControlMode::None => {
                for child in self.children_of(id)? {
                    self.apply_prod_group_controls(child, wells)?;
                }
                Ok(())
            }
            _ => Err(GroupControlError::UnsupportedMode {
                mode: mode.into(),
                operation: "applying group production controls",
            }),
        }
    }

    /// Applies each group's own injection target to its children.
    ///
    /// Groups in RATE or RESV split `target / efficiency` by guide rate over
    /// the children that are already under group control. REIN and VREP
    /// groups are left for
    /// [`apply_explicit_reinjection_controls`](Self::apply_explicit_reinjection_controls).
    ///
    /// # Errors
    ///
    /// Same as [`apply_prod_group_controls`](Self::apply_prod_group_controls).
    pub fn apply_inj_group_controls(
        &mut self,
        id: NodeId,
        wells: &mut Wells,
    ) -> Result<(), GroupControlError> {
        let node = self.node(id)?;
        if node.as_well().is_some() {
            return Ok(());
        }
        let mode = node.injection.control_mode;
        match mode {
            InjectionControlMode::Rate | InjectionControlMode::Resv => {
                let efficiency = node.efficiency_factor();
                let my_guide_rate = self.injection_guide_rate(id, false)?.get();
                let target = self.rate_mode_target(id, my_guide_rate, mode.into(), |tree| {
                    tree.injection_target(id, mode)
                })?;
                for child in self.children_of(id)? {
                    let share = self.injection_guide_rate(child, false)?.get() / my_guide_rate;
                    self.apply_inj_group_control(
                        child,
                        wells,
                        mode,
                        share * target / efficiency,
                        true,
                    )?;
                }
                Ok(())
            }
            InjectionControlMode::Rein | InjectionControlMode::Vrep => {
                info!(
                    group = node.name(),
                    %mode,
                    "replacement control found, explicit reinjection controls must be applied"
                );
                Ok(())
            }
            InjectionControlMode::Fld | InjectionControlMode::None => {
                for child in self.children_of(id)? {
                    self.apply_inj_group_controls(child, wells)?;
                }
                Ok(())
            }
            _ => Err(GroupControlError::UnsupportedMode {
                mode: mode.into(),
                operation: "applying group injection controls",
            }),
        }
    }

    /// Sets reinjection targets of a REIN or VREP group from produced rates.
    ///
    /// REIN reinjects the produced surface rate of the group's injector
    /// phase times the reinjection fraction; VREP reinjects the produced
    /// reservoir volume over all active phases times the voidage replacement
    /// fraction. The result is split by injection guide rate over children
    /// already under group control. This must be called every time step.
    ///
    /// # Errors
    ///
    /// Fails if the injector phase is inactive or a well is not attached.
    pub fn apply_explicit_reinjection_controls(
        &mut self,
        id: NodeId,
        wells: &mut Wells,
        rates: &WellRates<'_>,
    ) -> Result<(), GroupControlError> {
        let node = self.node(id)?;
        if node.as_well().is_some() {
            return Ok(());
        }
        let spec = node.injection;
        let (produced, mode, fraction) = match spec.control_mode {
            InjectionControlMode::Rein => (
                self.total_production_flow(id, rates.surface, spec.injector_type.phase())?,
                REINJECTION_MODE,
                spec.reinjection_fraction_target.get(),
            ),
            InjectionControlMode::Vrep => (
                self.phase_usage()
                    .active_phases()
                    .map(|phase| self.total_production_flow(id, rates.reservoir, phase))
                    .sum::<Result<f64, _>>()?,
                InjectionControlMode::Resv,
                spec.voidage_replacement_fraction.get(),
            ),
            _ => return Ok(()),
        };
        // Production is negative, injection positive.
        let reinjected = -produced;

        let my_guide_rate = self.injection_guide_rate(id, true)?.get();
        if my_guide_rate == 0.0 {
            return Ok(());
        }
        debug!(group = node.name(), %mode, reinjected, fraction, "applying reinjection controls");
        for child in self.children_of(id)? {
            let share = self.injection_guide_rate(child, true)?.get() / my_guide_rate;
            self.apply_inj_group_control(child, wells, mode, share * reinjected * fraction, true)?;
        }
        Ok(())
    }

    fn rate_mode_target(
        &self,
        id: NodeId,
        my_guide_rate: f64,
        mode: ControlMode,
        target: impl FnOnce(&Self) -> Result<Option<f64>, GroupControlError>,
    ) -> Result<f64, GroupControlError> {
        let group = self.node(id)?.name().to_owned();
        if my_guide_rate == 0.0 {
            return Err(GroupControlError::ZeroGuideRate { group });
        }
        target(self)?.ok_or(GroupControlError::UndefinedTarget { group, mode })
    }

    /// Writes `control` into the well's group slot and makes it active.
    fn set_well_group_control(
        &mut self,
        id: NodeId,
        wells: &mut Wells,
        control: WellControl,
    ) -> Result<(), GroupControlError> {
        let index = self.wells_index(id)?;
        let node = self.node_mut(id)?;
        let controls = &mut wells
            .get_mut(index)
            .ok_or(GroupControlError::UnknownWell { index })?
            .controls;
        let Some(well) = node.as_well_mut() else {
            return Ok(());
        };
        let slot = controls.set_group_control(well.group_control_index, control);
        well.group_control_index = Some(slot);
        controls.set_current(slot);
        node.individual_control = false;
        info!(
            well = node.name(),
            control = ?control.kind,
            rate = control.target,
            "well under group control"
        );
        Ok(())
    }
}

/// Builds the well control for a production group target.
fn production_group_control(
    usage: &PhaseUsage,
    mode: ProductionControlMode,
    target: f64,
) -> Result<WellControl, GroupControlError> {
    let phases: &[Phase] = match mode {
        ProductionControlMode::Orat => &[Phase::Oil],
        ProductionControlMode::Wrat => &[Phase::Water],
        ProductionControlMode::Grat => &[Phase::Gas],
        ProductionControlMode::Lrat => &[Phase::Oil, Phase::Water],
        ProductionControlMode::Resv => return Ok(WellControl::reservoir_rate(target, [1.0; 3])),
        _ => {
            return Err(GroupControlError::UnsupportedMode {
                mode: mode.into(),
                operation: "applying a group control to a well",
            });
        }
    };
    let mut distr = [0.0; 3];
    for &phase in phases {
        let position = usage
            .position(phase)
            .ok_or(GroupControlError::PhaseNotActive { phase })?;
        distr[position] = 1.0;
    }
    Ok(WellControl::surface_rate(target, distr))
}

/// Builds the well control for an injection group target.
fn injection_group_control(
    mode: InjectionControlMode,
    target: f64,
) -> Result<WellControl, GroupControlError> {
    match mode {
        InjectionControlMode::Rate => Ok(WellControl::surface_rate(target, [1.0; 3])),
        InjectionControlMode::Resv => Ok(WellControl::reservoir_rate(target, [1.0; 3])),
        _ => Err(GroupControlError::UnsupportedMode {
            mode: mode.into(),
            operation: "applying a group control to a well",
        }),
    }
}
