//! # Twine Wells
//!
//! Well and group control models for reservoir simulation.
//!
//! ## Crate layout
//!
//! - [`models`]: The well-group control hierarchy and the multisegment well
//!   equation assembly, plus [`twine_core::Model`] adapters.
//! - [`support`]: Supporting utilities used by models (phase bookkeeping,
//!   fluid-property capabilities, numeric constraints, units).
//!
//! ## Collaborators
//!
//! The crate does not own a grid, a fluid-property package or a nonlinear
//! solver. Fluid properties come in through [`support::fluid::SegmentFluid`],
//! segment geometry through plain records, and the Newton driver calls into
//! [`models::wells::group::GroupTree`] and
//! [`models::wells::msw::MultisegmentWellEval`] once per iteration.
//!
//! Note: Modules in [`support`] are part of the public API because they're
//! useful, but their APIs are not stable.

pub mod models;
pub mod support;
