//! Slipway - a build-configuration validator and matrix builder for
//! CMake-based native packages
//!
//! This crate provides the core library functionality for Slipway:
//! recipe loading, environment validation, matrix expansion, and the
//! CMake driver that turns accepted configurations into builds.

pub mod core;
pub mod driver;
pub mod matrix;
pub mod ops;
pub mod util;

pub use core::{
    environment::TargetEnvironment, platform::PlatformSpec, recipe::Recipe,
    resolved::BuildConfiguration, resolved::OutputLayout, standard::CxxStandard,
};

pub use matrix::{BuildJob, Verdict};
pub use util::context::GlobalContext;
