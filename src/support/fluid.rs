//! Fluid-property capabilities consumed by the segment equations.
//!
//! The multisegment assembly never evaluates a PVT correlation itself. It asks
//! a [`SegmentFluid`] for phase densities and viscosities at a segment
//! pressure, passing the pressure as a dual number so the returned property
//! carries its pressure derivative into the Jacobian.
//!
//! Two reference models are provided for drivers and tests:
//!
//! - [`ConstantFluid`]: fixed density and viscosity per phase
//! - [`CompressibleFluid`]: exponential density in pressure with constant
//!   compressibility, fixed viscosity

mod compressible;
mod constant;
mod error;

pub use compressible::{CompressibleFluid, CompressiblePhase};
pub use constant::{ConstantFluid, PhaseProperties};
pub use error::PropertyError;

use num_dual::Dual64;

use crate::support::phases::Phase;

/// Phase properties at a segment pressure.
///
/// Pressures are in pascal, densities in kg/m³ and viscosities in Pa·s.
pub trait SegmentFluid {
    /// Returns the density of `phase` at `pressure`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] if the density cannot be evaluated.
    fn density(&self, phase: Phase, pressure: Dual64) -> Result<Dual64, PropertyError>;

    /// Returns the viscosity of `phase` at `pressure`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] if the viscosity cannot be evaluated.
    fn viscosity(&self, phase: Phase, pressure: Dual64) -> Result<Dual64, PropertyError>;
}
