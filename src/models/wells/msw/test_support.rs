use uom::si::{
    area::square_meter,
    dynamic_viscosity::pascal_second,
    f64::{Area, DynamicViscosity, Length, MassDensity},
    length::meter,
    mass_density::kilogram_per_cubic_meter,
};

use crate::support::{
    fluid::{ConstantFluid, PhaseProperties},
    phases::{Phase, PhaseUsage},
    units::{ToSi, standard_gravity},
};

use super::{
    AutoIcd, Device, MswConfig, MultisegmentWellEval, Segment, SegmentSet, SpiralIcd, Valve,
    ValveStatus,
};

pub(super) const WATER_DENSITY: f64 = 1000.0;
pub(super) const OIL_DENSITY: f64 = 800.0;
pub(super) const WATER_VISCOSITY: f64 = 1.0e-3;
pub(super) const OIL_VISCOSITY: f64 = 2.0e-3;

pub(super) const DIAMETER: f64 = 0.1;
pub(super) const AREA: f64 = std::f64::consts::PI * DIAMETER * DIAMETER / 4.0;
pub(super) const ROUGHNESS: f64 = 1.0e-5;

/// Depth and length of the lower segment of [`two_segment_well`] below the
/// top one, in metres.
pub(super) const DEPTH_STEP: f64 = 10.0;
pub(super) const LENGTH_STEP: f64 = 20.0;

/// Top segment pressure of [`producing_state`], in pascal.
pub(super) const TOP_PRESSURE: f64 = 1.0e7;

pub(super) fn water_oil_fluid() -> ConstantFluid {
    let phase = |density, viscosity| {
        PhaseProperties::new(
            MassDensity::new::<kilogram_per_cubic_meter>(density),
            DynamicViscosity::new::<pascal_second>(viscosity),
        )
    };
    ConstantFluid::new()
        .with_phase(Phase::Water, phase(WATER_DENSITY, WATER_VISCOSITY))
        .with_phase(Phase::Oil, phase(OIL_DENSITY, OIL_VISCOSITY))
}

/// A pipe segment of the standard tubing with depth and length in metres.
pub(super) fn pipe(number: u32, outlet: Option<u32>, depth: f64, length: f64) -> Segment {
    Segment::new(
        number,
        outlet,
        Length::new::<meter>(depth),
        Length::new::<meter>(length),
        Area::new::<square_meter>(AREA),
        Length::new::<meter>(DIAMETER),
        Length::new::<meter>(ROUGHNESS),
    )
}

pub(super) fn spiral_icd() -> SpiralIcd {
    SpiralIcd {
        strength: 2.0e5,
        density_calibration: MassDensity::new::<kilogram_per_cubic_meter>(1000.0),
        viscosity_calibration: DynamicViscosity::new::<pascal_second>(1.0e-3),
        scaling_factor: 1.0,
        max_absolute_rate: None,
    }
}

/// An autonomous ICD whose mixture properties are the plain fraction-weighted
/// ones.
pub(super) fn auto_icd() -> AutoIcd {
    AutoIcd {
        strength: 3.0e5,
        density_calibration: MassDensity::new::<kilogram_per_cubic_meter>(1000.0),
        viscosity_calibration: DynamicViscosity::new::<pascal_second>(1.0e-3),
        scaling_factor: 1.0,
        flow_rate_exponent: 2.1,
        viscosity_exponent: 0.4,
        density_exponents: [1.0; 3],
        viscosity_exponents: [1.0; 3],
    }
}

pub(super) fn valve(status: ValveStatus) -> Valve {
    Valve {
        flow_coefficient: 0.7,
        constriction_area: Area::new::<square_meter>(2.0e-4),
        additional_length: Length::new::<meter>(5.0),
        pipe_diameter: Length::new::<meter>(DIAMETER),
        pipe_area: Area::new::<square_meter>(AREA),
        pipe_roughness: Length::new::<meter>(ROUGHNESS),
        status,
    }
}

/// A water-oil producer named `MSW` with a top segment at 1000 m and one
/// segment below it.
pub(super) fn two_segment_well(friction: bool, acceleration: bool) -> MultisegmentWellEval {
    build_well(Device::Pipe, friction, acceleration)
}

/// [`two_segment_well`] with `device` on the lower segment.
pub(super) fn device_well(device: Device) -> MultisegmentWellEval {
    build_well(device, false, false)
}

/// `ρ g Δz` of the lower segment at a 25 % water cut.
pub(super) fn hydrostatic_drop() -> f64 {
    let density = 0.25 * WATER_DENSITY + 0.75 * OIL_DENSITY;
    density * standard_gravity().to_si() * DEPTH_STEP
}

/// Both segments producing 0.01 m³/s at a 25 % water fraction, with the
/// lower segment in hydrostatic balance with the top.
pub(super) fn producing_state(well: &mut MultisegmentWellEval) {
    let primary = well.primary_variables_mut();
    primary
        .segment_mut(0)
        .copy_from_slice(&[-0.01, 0.25, TOP_PRESSURE]);
    primary
        .segment_mut(1)
        .copy_from_slice(&[-0.01, 0.25, TOP_PRESSURE + hydrostatic_drop()]);
}

/// A chain of three pipe segments below 1000 m, each [`DEPTH_STEP`] deeper
/// and [`LENGTH_STEP`] longer than its outlet.
pub(super) fn three_segment_well(friction: bool, acceleration: bool) -> MultisegmentWellEval {
    let segments = SegmentSet::new(vec![
        pipe(1, None, 1000.0, 1000.0),
        pipe(2, Some(1), 1000.0 + DEPTH_STEP, 1000.0 + LENGTH_STEP),
        pipe(3, Some(2), 1000.0 + 2.0 * DEPTH_STEP, 1000.0 + 2.0 * LENGTH_STEP),
    ])
    .unwrap();
    let config = MswConfig {
        friction,
        acceleration,
        ..MswConfig::default()
    };
    MultisegmentWellEval::new("MSW3", segments, PhaseUsage::new(true, true, false), config)
}

fn build_well(device: Device, friction: bool, acceleration: bool) -> MultisegmentWellEval {
    let segments = SegmentSet::new(vec![
        pipe(1, None, 1000.0, 1000.0),
        pipe(2, Some(1), 1000.0 + DEPTH_STEP, 1000.0 + LENGTH_STEP).with_device(device),
    ])
    .unwrap();
    let config = MswConfig {
        friction,
        acceleration,
        ..MswConfig::default()
    };
    MultisegmentWellEval::new("MSW", segments, PhaseUsage::new(true, true, false), config)
}
