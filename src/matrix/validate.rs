//! Compatibility validation of target environments against a recipe.
//!
//! Validation answers one question: may this package build in this
//! environment at all? It checks the compiler against the recipe's
//! minimum-version rules and the requested C++ standard against the
//! accepted set. Option values are not validated here; environments
//! carry only assignments that already fit the recipe.

use thiserror::Error;

use crate::core::environment::TargetEnvironment;
use crate::core::platform::CompilerFamily;
use crate::core::recipe::Recipe;
use crate::core::standard::{CxxStandard, StandardSet};

/// Reasons an environment cannot build this package.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Incompatibility {
    #[error("{compiler} {version} is below the supported minimum {minimum}")]
    CompilerTooOld {
        compiler: CompilerFamily,
        version: String,
        minimum: semver::Version,
    },

    #[error("cannot check {compiler} version `{version}` against the minimum-version rule")]
    UnknownVersion {
        compiler: CompilerFamily,
        version: String,
    },

    #[error("C++ standard `{requested}` is not supported, allowed: {allowed}")]
    StandardNotSupported {
        requested: CxxStandard,
        allowed: StandardSet,
    },
}

/// Checks environments against a recipe's compatibility constraints.
pub struct CompatibilityValidator<'a> {
    recipe: &'a Recipe,
}

impl<'a> CompatibilityValidator<'a> {
    /// Create a new validator for a recipe.
    pub fn new(recipe: &'a Recipe) -> Self {
        CompatibilityValidator { recipe }
    }

    /// Validate one environment.
    ///
    /// Returns the first incompatibility found; compiler rules are checked
    /// before the C++ standard.
    pub fn validate(&self, env: &TargetEnvironment) -> Result<(), Incompatibility> {
        self.validate_compiler(env)?;
        self.validate_standard(env)?;
        Ok(())
    }

    fn validate_compiler(&self, env: &TargetEnvironment) -> Result<(), Incompatibility> {
        // Families without a rule are accepted at any version.
        let Some(rule) = self.recipe.rule_for(env.compiler()) else {
            return Ok(());
        };

        // A version we cannot parse cannot be shown to satisfy the rule.
        let Some(parsed) = env.version().parsed() else {
            return Err(Incompatibility::UnknownVersion {
                compiler: env.compiler(),
                version: env.version().raw().to_string(),
            });
        };

        if *parsed < rule.minimum {
            return Err(Incompatibility::CompilerTooOld {
                compiler: env.compiler(),
                version: env.version().raw().to_string(),
                minimum: rule.minimum.clone(),
            });
        }

        Ok(())
    }

    fn validate_standard(&self, env: &TargetEnvironment) -> Result<(), Incompatibility> {
        let Some(requested) = env.requested_standard() else {
            tracing::debug!(
                environment = %env.label(),
                "no C++ standard requested, the package default applies"
            );
            return Ok(());
        };

        if !self.recipe.standards().contains(requested) {
            return Err(Incompatibility::StandardNotSupported {
                requested,
                allowed: self.recipe.standards().clone(),
            });
        }

        Ok(())
    }
}
