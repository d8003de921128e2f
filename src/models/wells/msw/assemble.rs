//! Segment pressure equations and the well control equation.
//!
//! Every segment but the top one gets `p_seg - ΔP - p_outlet = 0` in its
//! `SPres` row, where `ΔP` is either the pipe losses (hydrostatic, friction,
//! optional acceleration) or the drop across the segment's flow device. The
//! top segment's `SPres` row holds the control equation.
//!
//! Upwind states of other segments enter without derivatives, so every
//! derivative of a segment's pressure terms lands in its own column block.
//! The outlet pressure goes to the outlet's block and inlet velocity heads to
//! the inlets' blocks.

use num_dual::Dual64;
use tracing::trace;
use uom::si::f64::Pressure;

use crate::support::units::ToSi;

use super::{
    Device, Evaluation, MswError, MultisegmentWellEval, Segment, ValveStatus, WQ_TOTAL,
    WellLinearSystem, WellState,
    icd::device_pressure_drop,
    pressure_loss::{friction_pressure_loss, velocity_head},
    quantities::{SegmentState, upwind_state},
};

/// Target of the well control equation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEquation {
    /// `p_top - target`.
    Bhp(Pressure),
    /// `Q_top - target`, with producer rates negative.
    Rate(f64),
    /// `Q_top`.
    Stopped,
}

impl MultisegmentWellEval {
    /// Assembles the pressure equation of segment `seg`.
    ///
    /// Flow-device segments use the device law, all others the pipe losses.
    /// The linear system is expected to have been cleared for this
    /// iteration.
    ///
    /// # Errors
    ///
    /// Fails for the top segment, an out-of-range index, or stale segment
    /// quantities.
    pub fn assemble_pressure_eq(
        &mut self,
        seg: usize,
        well_state: &mut WellState,
    ) -> Result<(), MswError> {
        let (segment, _) = self.pressure_segment(seg)?;
        if segment.device.is_icd() {
            self.assemble_icd_pressure_eq(seg, well_state)
        } else {
            self.assemble_default_pressure_eq(seg, well_state)
        }
    }

    /// Assembles the pressure equations of every segment below the top.
    ///
    /// # Errors
    ///
    /// See [`assemble_pressure_eq`](Self::assemble_pressure_eq).
    pub fn assemble_pressure_equations(&mut self, well_state: &mut WellState) -> Result<(), MswError> {
        for seg in 1..self.num_segments() {
            self.assemble_pressure_eq(seg, well_state)?;
        }
        Ok(())
    }

    /// Assembles `p_seg - hydrostatic - friction - p_outlet` for a pipe
    /// segment and records the drops in `well_state`.
    ///
    /// Friction enters when enabled in the [`MswConfig`](super::MswConfig);
    /// the acceleration loss is added on top when enabled.
    ///
    /// # Errors
    ///
    /// Fails for the top segment, an out-of-range index, or stale segment
    /// quantities.
    pub fn assemble_default_pressure_eq(
        &mut self,
        seg: usize,
        well_state: &mut WellState,
    ) -> Result<(), MswError> {
        let (segment, outlet) = self.pressure_segment(seg)?;
        let quantities = self.current_quantities()?;
        let upwind = quantities.upwind(seg);
        let depth_diff = self.segments().depth_difference(seg);
        let length_diff = self.segments().length_difference(seg);
        let gravity = self.config().gravity.to_si();
        let friction_enabled = self.config().friction;

        let hydrostatic = |states: &[SegmentState]| states[seg].density * (gravity * depth_diff);
        let friction = |states: &[SegmentState]| {
            if friction_enabled {
                friction_loss(&segment, length_diff, states, seg, upwind)
            } else {
                Dual64::from(0.0)
            }
        };

        let equation =
            quantities.evaluate(|states| states[seg].pressure - hydrostatic(states) - friction(states));
        let hydrostatic_drop = quantities.evaluate(&hydrostatic).value;
        let friction_drop = quantities.evaluate(&friction).value;

        let drops = &mut well_state.pressure_drops;
        drops.hydrostatic[seg] = hydrostatic_drop;
        if friction_enabled {
            drops.friction[seg] = friction_drop;
        }
        self.insert_pressure_eq(seg, outlet, &equation);

        if self.config().acceleration {
            self.handle_acceleration_pressure_loss(seg, well_state)?;
        }
        Ok(())
    }

    /// Assembles `p_seg - ΔP_device - p_outlet` for a flow-device segment
    /// and records `ΔP_device` as its friction drop.
    ///
    /// A shut valve gets the trivial equation `Q_seg = 0` instead, with a
    /// zero friction drop.
    ///
    /// # Errors
    ///
    /// Fails with [`MswError::NotIcdSegment`] for a plain pipe, and for the
    /// top segment, an out-of-range index, or stale segment quantities.
    pub fn assemble_icd_pressure_eq(
        &mut self,
        seg: usize,
        well_state: &mut WellState,
    ) -> Result<(), MswError> {
        let (segment, outlet) = self.pressure_segment(seg)?;
        match segment.device {
            Device::Pipe => {
                return Err(MswError::NotIcdSegment {
                    well: self.name().to_owned(),
                    number: segment.number,
                });
            }
            Device::Valve(valve) if valve.status == ValveStatus::Shut => {
                let spres = self.layout().spres();
                let rate = self.primary_variables().total_rate(seg);
                let system = self.linear_system_mut();
                system.set_residual(seg, spres, rate);
                system.set_jacobian(seg, spres, seg, WQ_TOTAL, 1.0);
                well_state.pressure_drops.friction[seg] = 0.0;
                trace!(well = %self.name(), seg, "shut valve");
                return Ok(());
            }
            _ => {}
        }

        let quantities = self.current_quantities()?;
        let upwind = quantities.upwind(seg);
        let device_drop = |states: &[SegmentState]| {
            device_pressure_drop(
                &segment.device,
                &upwind_state(states, seg, upwind),
                states[seg].mass_rate,
            )
        };

        let equation = quantities.evaluate(|states| states[seg].pressure - device_drop(states));
        well_state.pressure_drops.friction[seg] = quantities.evaluate(&device_drop).value;
        self.insert_pressure_eq(seg, outlet, &equation);
        Ok(())
    }

    /// Subtracts the acceleration loss from the pressure equation of `seg`
    /// and records it.
    ///
    /// The loss is the segment's velocity head minus each inlet's, taken at
    /// the larger of the two areas. Its sign is `+1` for a negative mass rate
    /// and `-1` otherwise, which flips it for injectors.
    ///
    /// # Errors
    ///
    /// Fails for the top segment, an out-of-range index, or stale segment
    /// quantities.
    pub fn handle_acceleration_pressure_loss(
        &mut self,
        seg: usize,
        well_state: &mut WellState,
    ) -> Result<(), MswError> {
        let (segment, _) = self.pressure_segment(seg)?;
        let quantities = self.current_quantities()?;
        let segments = self.segments();
        let upwind = quantities.upwind(seg);
        let area = segment.area.to_si();

        let sign = if quantities.mass_rate(seg) < 0.0 { 1.0 } else { -1.0 };

        let head = quantities.evaluate(|states| {
            let density = upwind_state(states, seg, upwind).density;
            velocity_head(area, states[seg].mass_rate, density)
        });
        let inlet_heads: Vec<(usize, Evaluation)> = segments
            .inlets(seg)
            .iter()
            .map(|&inlet| {
                let inlet_area = segments.segment(inlet).area.to_si().max(area);
                let inlet_upwind = quantities.upwind(inlet);
                let head = quantities.evaluate(|states| {
                    let density = upwind_state(states, inlet, inlet_upwind).density;
                    velocity_head(inlet_area, states[inlet].mass_rate, density)
                });
                (inlet, head)
            })
            .collect();

        let loss = sign * inlet_heads.iter().fold(head.value, |loss, (_, head)| loss - head.value);
        well_state.pressure_drops.acceleration[seg] = loss;

        let spres = self.layout().spres();
        let system = self.linear_system_mut();
        system.add_residual(seg, spres, -loss);
        add_block(system, seg, seg, &head.derivatives, -sign);
        for (inlet, head) in &inlet_heads {
            add_block(system, seg, *inlet, &head.derivatives, sign);
        }
        Ok(())
    }

    /// Writes the control equation into the top segment's `SPres` row.
    pub fn assemble_control_eq(&mut self, control: ControlEquation) {
        let spres = self.layout().spres();
        let primary = self.primary_variables();
        let (residual, variable) = match control {
            ControlEquation::Bhp(target) => (primary.pressure(0) - target.to_si(), spres),
            ControlEquation::Rate(target) => (primary.total_rate(0) - target, WQ_TOTAL),
            ControlEquation::Stopped => (primary.total_rate(0), WQ_TOTAL),
        };
        let system = self.linear_system_mut();
        system.set_residual(0, spres, residual);
        system.set_jacobian(0, spres, 0, variable, 1.0);
    }

    /// The segment at `seg` and its outlet, for a segment below the top.
    fn pressure_segment(&self, seg: usize) -> Result<(Segment, usize), MswError> {
        let segment = *self
            .segments()
            .get(seg)
            .ok_or(MswError::UnknownSegment { index: seg })?;
        let outlet = self.segments().outlet(seg).ok_or(MswError::TopSegment)?;
        Ok((segment, outlet))
    }

    fn insert_pressure_eq(&mut self, seg: usize, outlet: usize, equation: &Evaluation) {
        let layout = *self.layout();
        let spres = layout.spres();
        let outlet_pressure = Evaluation::variable(
            self.primary_variables().pressure(outlet),
            spres,
            layout.num_well_eq(),
        );

        let system = self.linear_system_mut();
        system.set_residual(seg, spres, equation.value - outlet_pressure.value);
        add_block(system, seg, seg, &equation.derivatives, 1.0);
        add_block(system, seg, outlet, &outlet_pressure.derivatives, -1.0);
        trace!(seg, residual = system.residual(seg, spres), "pressure equation");
    }
}

/// Adds `scale · derivatives` to the `SPres` row of `seg` in the column
/// block of `column`.
fn add_block(
    system: &mut WellLinearSystem,
    seg: usize,
    column: usize,
    derivatives: &[f64],
    scale: f64,
) {
    let spres = system.num_well_eq() - 1;
    for (variable, derivative) in derivatives.iter().enumerate() {
        system.add_jacobian(seg, spres, column, variable, scale * derivative);
    }
}

/// Signed friction loss of a pipe segment over its length beyond the
/// outlet, with upwind density and viscosity.
fn friction_loss(
    segment: &Segment,
    length: f64,
    states: &[SegmentState],
    seg: usize,
    upwind: usize,
) -> Dual64 {
    let mass_rate = states[seg].mass_rate;
    let upwind = upwind_state(states, seg, upwind);
    let sign = if mass_rate.re < 0.0 { 1.0 } else { -1.0 };
    friction_pressure_loss(
        length,
        segment.diameter.to_si(),
        segment.area.to_si(),
        segment.roughness.to_si(),
        upwind.density,
        mass_rate,
        upwind.viscosity,
    ) * sign
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::pressure::pascal;

    use crate::models::wells::msw::test_support::{
        AREA, DEPTH_STEP, DIAMETER, LENGTH_STEP, OIL_DENSITY, ROUGHNESS, TOP_PRESSURE,
        WATER_DENSITY, auto_icd, device_well, hydrostatic_drop, producing_state, spiral_icd,
        three_segment_well, two_segment_well, valve, water_oil_fluid,
    };
    use crate::models::wells::spec::ProductionControlMode;
    use crate::support::units::standard_gravity;

    const SPRES: usize = 2;
    const WFRAC: usize = 1;

    fn state() -> WellState {
        WellState::producer(2, ProductionControlMode::Bhp)
    }

    #[test]
    fn hydrostatic_balance_gives_zero_residual() {
        let mut well = two_segment_well(false, false);
        producing_state(&mut well);
        well.compute_segment_quantities(&water_oil_fluid()).unwrap();
        let mut state = state();
        well.assemble_pressure_eq(1, &mut state).unwrap();

        let system = well.linear_system();
        assert_relative_eq!(system.residual(1, SPRES), 0.0, epsilon = 1e-6);
        assert_relative_eq!(system.jacobian(1, SPRES, 1, SPRES), 1.0);
        assert_relative_eq!(system.jacobian(1, SPRES, 0, SPRES), -1.0);
        assert_relative_eq!(system.jacobian(1, SPRES, 1, WQ_TOTAL), 0.0);
        assert_relative_eq!(
            system.jacobian(1, SPRES, 1, WFRAC),
            -(WATER_DENSITY - OIL_DENSITY) * standard_gravity().to_si() * DEPTH_STEP,
            max_relative = 1e-12
        );
        assert_relative_eq!(state.pressure_drops.hydrostatic[1], hydrostatic_drop());
        assert_eq!(state.pressure_drops.friction[1], 0.0);
    }

    #[test]
    fn friction_adds_a_further_term() {
        let mut well = two_segment_well(true, false);
        producing_state(&mut well);
        well.compute_segment_quantities(&water_oil_fluid()).unwrap();
        let mut state = state();
        well.assemble_pressure_eq(1, &mut state).unwrap();

        let density = 0.25 * WATER_DENSITY + 0.75 * OIL_DENSITY;
        let expected = friction_pressure_loss(
            LENGTH_STEP,
            DIAMETER,
            AREA,
            ROUGHNESS,
            Dual64::from(density),
            Dual64::from(-0.01 * density),
            Dual64::from(1.75e-3),
        )
        .re;
        assert!(expected > 0.0);

        let system = well.linear_system();
        assert_relative_eq!(system.residual(1, SPRES), -expected, max_relative = 1e-6);
        assert!(system.jacobian(1, SPRES, 1, WQ_TOTAL) > 0.0);
        assert_relative_eq!(state.pressure_drops.friction[1], expected, max_relative = 1e-12);
    }

    #[test]
    fn injecting_segment_keeps_its_own_fraction_derivatives() {
        let mut well = two_segment_well(false, false);
        producing_state(&mut well);
        well.primary_variables_mut().segment_mut(1)[WQ_TOTAL] = 0.01;
        well.compute_segment_quantities(&water_oil_fluid()).unwrap();
        assert_eq!(well.quantities().unwrap().upwind(1), 0);
        well.assemble_pressure_eq(1, &mut state()).unwrap();

        let system = well.linear_system();
        assert_relative_eq!(
            system.jacobian(1, SPRES, 1, WFRAC),
            -(WATER_DENSITY - OIL_DENSITY) * standard_gravity().to_si() * DEPTH_STEP,
            max_relative = 1e-12
        );
        assert_eq!(system.jacobian(1, SPRES, 0, WFRAC), 0.0);
        assert_eq!(system.jacobian(1, SPRES, 0, SPRES), -1.0);
    }

    /// Sets every segment of a three-segment well to `rate` with distinct
    /// water fractions and pressures.
    fn chain_state(well: &mut MultisegmentWellEval, rate: f64) {
        for (seg, water) in [0.2, 0.3, 0.4].into_iter().enumerate() {
            let pressure = TOP_PRESSURE + 1.0e4 * seg as f64;
            well.primary_variables_mut()
                .segment_mut(seg)
                .copy_from_slice(&[rate, water, pressure]);
        }
    }

    fn middle_residual(well: &mut MultisegmentWellEval) -> f64 {
        well.compute_segment_quantities(&water_oil_fluid()).unwrap();
        well.linear_system_mut().clear();
        let mut state = WellState::producer(3, ProductionControlMode::Bhp);
        well.assemble_pressure_eq(1, &mut state).unwrap();
        well.linear_system().residual(1, SPRES)
    }

    /// Compares the middle segment's pressure row with central differences
    /// over every unknown of the well.
    fn assert_jacobian_matches_finite_differences(mut well: MultisegmentWellEval) {
        middle_residual(&mut well);
        let analytic = well.linear_system().clone();

        for column in 0..3 {
            for (variable, step) in [(WQ_TOTAL, 1.0e-6), (WFRAC, 1.0e-6), (SPRES, 1.0)] {
                well.primary_variables_mut().segment_mut(column)[variable] += step;
                let plus = middle_residual(&mut well);
                well.primary_variables_mut().segment_mut(column)[variable] -= 2.0 * step;
                let minus = middle_residual(&mut well);
                well.primary_variables_mut().segment_mut(column)[variable] += step;

                let finite_difference = (plus - minus) / (2.0 * step);
                assert_relative_eq!(
                    analytic.jacobian(1, SPRES, column, variable),
                    finite_difference,
                    epsilon = 1e-3,
                    max_relative = 1e-5
                );
            }
        }
    }

    #[test]
    fn producing_jacobian_matches_finite_differences() {
        let mut well = three_segment_well(true, true);
        chain_state(&mut well, -0.01);
        assert_jacobian_matches_finite_differences(well);
    }

    #[test]
    fn injecting_jacobian_matches_finite_differences() {
        let mut well = three_segment_well(false, false);
        chain_state(&mut well, 0.01);
        assert_jacobian_matches_finite_differences(well);
    }

    #[test]
    fn inlet_velocity_head_derivatives_go_to_the_inlet_block() {
        let mut well = three_segment_well(false, true);
        chain_state(&mut well, -0.01);
        middle_residual(&mut well);

        let system = well.linear_system();
        assert!(system.jacobian(1, SPRES, 2, WQ_TOTAL) != 0.0);
        assert!(system.jacobian(1, SPRES, 2, WFRAC) != 0.0);
        assert_eq!(system.jacobian(1, SPRES, 2, SPRES), 0.0);
    }

    #[test]
    fn acceleration_loss_is_the_velocity_head_without_inlets() {
        let mut well = two_segment_well(false, true);
        producing_state(&mut well);
        well.compute_segment_quantities(&water_oil_fluid()).unwrap();
        let mut state = state();
        well.assemble_pressure_eq(1, &mut state).unwrap();

        let density = 0.25 * WATER_DENSITY + 0.75 * OIL_DENSITY;
        let mass_rate = -0.01 * density;
        let head = 0.5 * mass_rate * mass_rate / (AREA * AREA * density);
        assert_relative_eq!(state.pressure_drops.acceleration[1], head, max_relative = 1e-12);
        assert_relative_eq!(well.linear_system().residual(1, SPRES), -head, epsilon = 1e-6);
    }

    #[test]
    fn top_segment_and_bad_indices_are_rejected() {
        let mut well = two_segment_well(false, false);
        let mut state = state();
        assert_eq!(
            well.assemble_pressure_eq(1, &mut state),
            Err(MswError::StaleQuantities)
        );

        well.compute_segment_quantities(&water_oil_fluid()).unwrap();
        assert_eq!(well.assemble_pressure_eq(0, &mut state), Err(MswError::TopSegment));
        assert_eq!(
            well.assemble_pressure_eq(5, &mut state),
            Err(MswError::UnknownSegment { index: 5 })
        );
        assert!(matches!(
            well.assemble_icd_pressure_eq(1, &mut state),
            Err(MswError::NotIcdSegment { number: 2, .. })
        ));
    }

    #[test]
    fn shut_valve_is_a_trivial_rate_equation() {
        let mut well = device_well(Device::Valve(valve(ValveStatus::Shut)));
        producing_state(&mut well);
        well.compute_segment_quantities(&water_oil_fluid()).unwrap();
        let mut state = state();
        state.pressure_drops.friction[1] = 123.0;
        well.assemble_pressure_eq(1, &mut state).unwrap();

        let system = well.linear_system();
        assert_relative_eq!(system.residual(1, SPRES), -0.01);
        assert_eq!(system.jacobian(1, SPRES, 1, WQ_TOTAL), 1.0);
        assert_eq!(system.jacobian(1, SPRES, 1, SPRES), 0.0);
        assert_eq!(system.jacobian(1, SPRES, 0, SPRES), 0.0);
        assert_eq!(state.pressure_drops.friction[1], 0.0);
    }

    #[test]
    fn open_device_replaces_pipe_losses() {
        for device in [
            Device::Valve(valve(ValveStatus::Open)),
            Device::AutoIcd(auto_icd()),
            Device::SpiralIcd(spiral_icd()),
        ] {
            let mut well = device_well(device);
            producing_state(&mut well);
            well.compute_segment_quantities(&water_oil_fluid()).unwrap();
            let mut state = state();
            well.assemble_pressure_eq(1, &mut state).unwrap();

            let drop = state.pressure_drops.friction[1];
            assert!(drop > 0.0);
            // p1 - p0 equals the hydrostatic drop in the producing state.
            assert_relative_eq!(
                well.linear_system().residual(1, SPRES),
                hydrostatic_drop() - drop,
                max_relative = 1e-9
            );
            assert_eq!(state.pressure_drops.hydrostatic[1], 0.0);
            assert_relative_eq!(well.linear_system().jacobian(1, SPRES, 0, SPRES), -1.0);
        }
    }

    #[test]
    fn control_equation_targets_the_top_segment() {
        let mut well = two_segment_well(false, false);
        producing_state(&mut well);

        well.assemble_control_eq(ControlEquation::Bhp(Pressure::new::<pascal>(9.0e6)));
        let system = well.linear_system();
        assert_relative_eq!(system.residual(0, SPRES), 1.0e6);
        assert_eq!(system.jacobian(0, SPRES, 0, SPRES), 1.0);

        well.linear_system_mut().clear();
        well.assemble_control_eq(ControlEquation::Rate(-0.02));
        let system = well.linear_system();
        assert_relative_eq!(system.residual(0, SPRES), 0.01);
        assert_eq!(system.jacobian(0, SPRES, 0, WQ_TOTAL), 1.0);

        well.assemble_control_eq(ControlEquation::Stopped);
        assert_relative_eq!(well.linear_system().residual(0, SPRES), -0.01);
    }
}
