//! Supporting utilities used by the well models.

pub mod constraint;
pub mod fluid;
pub mod phases;
pub mod units;
