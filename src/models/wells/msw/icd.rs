//! Pressure drop laws of inflow-control devices.
//!
//! Each law returns the signed drop across the device: positive when the
//! segment produces towards its outlet.

use num_dual::{Dual64, DualNum};

use crate::support::{phases::Phase, units::ToSi};

use super::{
    AutoIcd, Device, SpiralIcd, Valve,
    pressure_loss::{abs, friction_pressure_loss, valve_constriction_pressure_loss},
    quantities::SegmentState,
};

/// Below this liquid fraction the water cut is not resolved.
const MIN_LIQUID_FRACTION: f64 = 1.0e-30;

/// Spiral ICD: `sign (ρ/ρ_cal)^0.75 (μ/μ_cal)^0.25 strength q²`.
///
/// `upwind` supplies the fractions and properties; `q` is the scaled device
/// volume rate, clamped to the device's maximum when one is set.
fn spiral_icd_pressure_drop(
    icd: &SpiralIcd,
    upwind: &SegmentState,
    mass_rate: Dual64,
) -> Dual64 {
    let [water, oil, gas] = Phase::ALL
        .map(|phase| upwind.fractions[phase.canonical_index()]);
    let [water_visc, oil_visc, gas_visc] = Phase::ALL
        .map(|phase| upwind.phase_viscosities[phase.canonical_index()]);

    let liquid = water + oil;
    let liquid_viscosity = if liquid.re < MIN_LIQUID_FRACTION {
        oil * oil_visc + water * water_visc
    } else {
        let water_cut = water / liquid;
        liquid * (water_cut * water_visc + (-water_cut + 1.0) * oil_visc)
    };
    let viscosity = liquid_viscosity + gas * gas_visc;
    let density = upwind.density;

    let mut rate = mass_rate / density * icd.scaling_factor;
    if let Some(max) = icd.max_absolute_rate {
        if rate.re.abs() > max {
            rate = Dual64::from(max.copysign(rate.re));
        }
    }
    let sign = if rate.re <= 0.0 { 1.0 } else { -1.0 };

    (density / icd.density_calibration.to_si()).powf(0.75)
        * (viscosity / icd.viscosity_calibration.to_si()).powf(0.25)
        * rate
        * rate
        * (icd.strength * sign)
}

/// Autonomous ICD with per-phase fraction exponents.
///
/// `sign ρ_mix² / ρ_cal (μ_cal/μ_mix)^x strength (-sign q)^y`, where the
/// mixture properties weight each phase by its fraction raised to the
/// device's exponent and `q = w · scaling / ρ_mix`.
fn auto_icd_pressure_drop(
    icd: &AutoIcd,
    upwind: &SegmentState,
    mass_rate: Dual64,
) -> Dual64 {
    let zero = Dual64::from(0.0);
    let mut density = zero;
    let mut viscosity = zero;
    for phase in Phase::ALL {
        let i = phase.canonical_index();
        let fraction = upwind.fractions[i];
        density = density + power(fraction, icd.density_exponents[i]) * upwind.phase_densities[i];
        viscosity =
            viscosity + power(fraction, icd.viscosity_exponents[i]) * upwind.phase_viscosities[i];
    }

    let rate = mass_rate * icd.scaling_factor / density;
    let sign = if rate.re <= 0.0 { 1.0 } else { -1.0 };

    density * density / icd.density_calibration.to_si()
        * power(
            viscosity.recip() * icd.viscosity_calibration.to_si(),
            icd.viscosity_exponent,
        )
        * power(rate * -sign, icd.flow_rate_exponent)
        * (icd.strength * sign)
}

/// Valve: friction over the additional pipe plus constriction loss.
fn valve_pressure_drop(valve: &Valve, upwind: &SegmentState, mass_rate: Dual64) -> Dual64 {
    let friction = friction_pressure_loss(
        valve.additional_length.to_si(),
        valve.pipe_diameter.to_si(),
        valve.pipe_area.to_si(),
        valve.pipe_roughness.to_si(),
        upwind.density,
        mass_rate,
        upwind.viscosity,
    );
    let constriction = valve_constriction_pressure_loss(
        mass_rate,
        upwind.density,
        valve.constriction_area.to_si(),
        valve.flow_coefficient,
    );
    let sign = if mass_rate.re <= 0.0 { 1.0 } else { -1.0 };
    (friction + constriction) * sign
}

/// Signed drop across `device`; zero for a plain pipe.
pub(super) fn device_pressure_drop(
    device: &Device,
    upwind: &SegmentState,
    mass_rate: Dual64,
) -> Dual64 {
    match device {
        Device::Pipe => Dual64::from(0.0),
        Device::SpiralIcd(icd) => spiral_icd_pressure_drop(icd, upwind, mass_rate),
        Device::AutoIcd(icd) => auto_icd_pressure_drop(icd, upwind, mass_rate),
        Device::Valve(valve) => valve_pressure_drop(valve, upwind, mass_rate),
    }
}

/// `x^n` that is exactly zero for a zero base.
///
/// Fractions of absent phases and zero rates would otherwise produce NaN
/// derivatives for exponents below one.
fn power(x: Dual64, n: f64) -> Dual64 {
    if x.re == 0.0 {
        Dual64::from(0.0)
    } else {
        abs(x).powf(n)
    }
}
