//! Extensions to [`uom`] for well modeling.
//!
//! Public records in this crate use [`uom`] quantities (segment depths,
//! areas, calibration densities). The equation assembly works on plain SI
//! `f64` values inside dual numbers, so this module provides the conversions
//! in one place.
//!
//! ```
//! use twine_wells::support::units::{standard_gravity, ToSi};
//! use uom::si::{f64::Length, length::foot};
//!
//! let depth = Length::new::<foot>(1000.0);
//! assert!((depth.to_si() - 304.8).abs() < 1e-9);
//! assert!((standard_gravity().to_si() - 9.80665).abs() < 1e-12);
//! ```

use uom::si::{
    acceleration::meter_per_second_squared,
    area::square_meter,
    dynamic_viscosity::pascal_second,
    f64::{Acceleration, Area, DynamicViscosity, Length, MassDensity, Pressure},
    length::meter,
    mass_density::kilogram_per_cubic_meter,
    pressure::pascal,
};

/// Standard acceleration of gravity.
#[must_use]
pub fn standard_gravity() -> Acceleration {
    Acceleration::new::<meter_per_second_squared>(9.806_65)
}

/// Conversion of a quantity to its SI base value.
pub trait ToSi {
    /// Returns the value in SI base units.
    fn to_si(&self) -> f64;
}

macro_rules! impl_to_si {
    ($($quantity:ty => $unit:ty),* $(,)?) => {
        $(
            impl ToSi for $quantity {
                fn to_si(&self) -> f64 {
                    self.get::<$unit>()
                }
            }
        )*
    };
}

impl_to_si! {
    Acceleration => meter_per_second_squared,
    Area => square_meter,
    DynamicViscosity => pascal_second,
    Length => meter,
    MassDensity => kilogram_per_cubic_meter,
    Pressure => pascal,
}
