//! Pipe-flow pressure loss correlations over dual numbers.
//!
//! Geometry is in SI base units; mass rates in kg/s, densities in kg/m³ and
//! viscosities in Pa·s. All losses are returned as positive magnitudes; the
//! caller applies the flow-direction sign.

use num_dual::{Dual64, DualNum};

const LAMINAR_LIMIT: f64 = 2000.0;
const TURBULENT_LIMIT: f64 = 4000.0;

/// Fanning friction factor.
///
/// Laminar `16/Re` below Re 2000, Haaland above 4000, and a straight line
/// between the two end values in the transition region.
pub(super) fn friction_factor(
    area: f64,
    diameter: f64,
    mass_rate: Dual64,
    roughness: f64,
    viscosity: Dual64,
) -> Dual64 {
    let re = reynolds_number(area, diameter, mass_rate, viscosity);
    if re.re < LAMINAR_LIMIT {
        re.recip() * 16.0
    } else if re.re > TURBULENT_LIMIT {
        haaland(re, diameter, roughness)
    } else {
        let f1 = 16.0 / LAMINAR_LIMIT;
        let f2 = haaland(Dual64::from(TURBULENT_LIMIT), diameter, roughness).re;
        (re - LAMINAR_LIMIT) * ((f2 - f1) / (TURBULENT_LIMIT - LAMINAR_LIMIT)) + f1
    }
}

/// Frictional loss `2 f L w² / (A² D ρ)` over a pipe of length `length`.
///
/// Zero when there is no flow.
pub(super) fn friction_pressure_loss(
    length: f64,
    diameter: f64,
    area: f64,
    roughness: f64,
    density: Dual64,
    mass_rate: Dual64,
    viscosity: Dual64,
) -> Dual64 {
    if reynolds_number(area, diameter, mass_rate, viscosity).re == 0.0 {
        return Dual64::from(0.0);
    }
    let f = friction_factor(area, diameter, mass_rate, roughness, viscosity);
    f * mass_rate * mass_rate * (2.0 * length / (area * area * diameter)) / density
}

/// Loss `w² / (2 ρ c_v² A²)` across a valve constriction.
pub(super) fn valve_constriction_pressure_loss(
    mass_rate: Dual64,
    density: Dual64,
    constriction_area: f64,
    flow_coefficient: f64,
) -> Dual64 {
    let scale = 2.0 * flow_coefficient * flow_coefficient * constriction_area * constriction_area;
    mass_rate * mass_rate / (density * scale)
}

/// Velocity head `w² / (2 A² ρ)`.
pub(super) fn velocity_head(area: f64, mass_rate: Dual64, density: Dual64) -> Dual64 {
    mass_rate * mass_rate * 0.5 / (density * (area * area))
}

fn reynolds_number(area: f64, diameter: f64, mass_rate: Dual64, viscosity: Dual64) -> Dual64 {
    abs(mass_rate * (diameter / area) / viscosity)
}

fn haaland(re: Dual64, diameter: f64, roughness: f64) -> Dual64 {
    let relative = (roughness / (3.7 * diameter)).powf(10.0 / 9.0);
    let value = (re.recip() * 6.9 + relative).log10() * -3.6;
    (value * value * 4.0).recip()
}

pub(super) fn abs(x: Dual64) -> Dual64 {
    if x.re < 0.0 { -x } else { x }
}
