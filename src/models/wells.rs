//! Well and well-group models.
//!
//! - [`spec`]: Control modes and production/injection specifications.
//! - [`group`]: The group → subgroup → well control hierarchy.
//! - [`msw`]: Multisegment well pressure equations and convergence checks.

pub mod group;
pub mod msw;
pub mod spec;
