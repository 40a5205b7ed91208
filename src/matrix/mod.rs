//! The build matrix: validation, resolution, and expansion.
//!
//! Three stages, each usable on its own:
//! 1. Validation - may this package build in this environment?
//! 2. Resolution - lower a compatible environment to a build plan
//! 3. Expansion - cross platforms with option axes into jobs

pub mod expand;
pub mod resolve;
pub mod validate;

pub use expand::{evaluate_environment, BuildJob, MatrixExpander, Verdict};
pub use resolve::{ConfigurationResolver, ResolutionError};
pub use validate::{CompatibilityValidator, Incompatibility};
