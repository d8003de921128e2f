use uom::si::f64::{Area, DynamicViscosity, Length, MassDensity};

/// Flow device installed on a segment.
///
/// The device is fixed by configuration. Only a valve's [`ValveStatus`] is
/// consulted when the pressure equation is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Device {
    /// Plain tubing: hydrostatic, friction and acceleration losses.
    #[default]
    Pipe,
    SpiralIcd(SpiralIcd),
    AutoIcd(AutoIcd),
    Valve(Valve),
}

impl Device {
    /// Returns true for the inflow-control device family (spiral ICD,
    /// autonomous ICD and valve).
    #[must_use]
    pub fn is_icd(&self) -> bool {
        !matches!(self, Device::Pipe)
    }
}

/// Spiral inflow-control device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralIcd {
    /// Device strength, in Pa per (m³/s)².
    pub strength: f64,
    pub density_calibration: MassDensity,
    pub viscosity_calibration: DynamicViscosity,
    /// Multiplier from segment rate to device rate.
    pub scaling_factor: f64,
    /// Upper bound on the device volume rate magnitude, in m³/s.
    pub max_absolute_rate: Option<f64>,
}

/// Autonomous inflow-control device.
///
/// Exponents are indexed water, oil, gas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoIcd {
    pub strength: f64,
    pub density_calibration: MassDensity,
    pub viscosity_calibration: DynamicViscosity,
    pub scaling_factor: f64,
    pub flow_rate_exponent: f64,
    pub viscosity_exponent: f64,
    pub density_exponents: [f64; 3],
    pub viscosity_exponents: [f64; 3],
}

/// Sub-critical valve: a constriction plus an optional stretch of pipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valve {
    /// Dimensionless flow coefficient of the constriction.
    pub flow_coefficient: f64,
    pub constriction_area: Area,
    pub additional_length: Length,
    pub pipe_diameter: Length,
    pub pipe_area: Area,
    pub pipe_roughness: Length,
    pub status: ValveStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValveStatus {
    #[default]
    Open,
    Shut,
}
