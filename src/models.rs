//! Public well-control models.
//!
//! # Organization
//!
//! Models are organized into domain-specific submodules. Everything here
//! currently lives under [`wells`], which holds the group control hierarchy
//! and the multisegment well equations.
//!
//! # Model structure
//!
//! The computational logic lives in plain types with inherent methods
//! (e.g., [`wells::group::GroupTree`], [`wells::msw::MultisegmentWellEval`]).
//! Where a [`twine_core::Model`] implementation is provided it is a thin
//! adapter that delegates to that API.

pub mod wells;
