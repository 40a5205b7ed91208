//! Core data structures for Slipway.
//!
//! This module contains the foundational types used throughout Slipway:
//! - Platforms (operating systems, compiler families, versions)
//! - C++ standard levels and accepted sets
//! - Option axes and assignments
//! - Recipes and target environments
//! - Resolved build configurations and the output layout

pub mod environment;
pub mod options;
pub mod platform;
pub mod recipe;
pub mod resolved;
pub mod standard;

pub use environment::{EnvironmentError, TargetEnvironment};
pub use options::{OptionAxis, OptionSet, OptionValue};
pub use platform::{CompilerFamily, CompilerVersion, OperatingSystem, PlatformSpec};
pub use recipe::{CompatibilityRule, Recipe, RecipeError, RECIPE_FILE_NAME};
pub use resolved::{BuildConfiguration, OutputLayout};
pub use standard::{CxxStandard, StandardSet};
