//! A target environment: one fully-specified cell of the build matrix.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::options::{OptionSet, OptionValue};
use crate::core::platform::{CompilerFamily, CompilerVersion, OperatingSystem};
use crate::core::recipe::Recipe;
use crate::core::standard::CxxStandard;

/// Errors raised when an environment does not fit a recipe's declarations.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum EnvironmentError {
    #[error("unknown option `{name}`")]
    #[diagnostic(
        code(slipway::environment::unknown_option),
        help("declared options: {available}")
    )]
    UnknownOption { name: String, available: String },

    #[error("option `{name}` does not exist on {os}")]
    #[diagnostic(code(slipway::environment::option_absent))]
    OptionAbsentForOs { name: String, os: OperatingSystem },

    #[error("invalid value `{value}` for option `{name}`")]
    #[diagnostic(
        code(slipway::environment::invalid_value),
        help("allowed values: {allowed}")
    )]
    InvalidValue {
        name: String,
        value: OptionValue,
        allowed: String,
    },
}

/// A concrete build environment.
///
/// Combines a platform triple with an optional requested C++ standard and a
/// complete option assignment. Construct with [`TargetEnvironment::for_recipe`]
/// to get validation and default-filling against a recipe; the raw builders
/// exist for callers that enumerate environments straight from recipe axes
/// and so cannot produce an invalid assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEnvironment {
    os: OperatingSystem,
    compiler: CompilerFamily,
    version: CompilerVersion,
    requested_standard: Option<CxxStandard>,
    options: OptionSet,
}

impl TargetEnvironment {
    /// Create an environment with no standard and no options.
    pub fn new(
        os: OperatingSystem,
        compiler: CompilerFamily,
        version: impl Into<CompilerVersion>,
    ) -> Self {
        TargetEnvironment {
            os,
            compiler,
            version: version.into(),
            requested_standard: None,
            options: OptionSet::new(),
        }
    }

    /// Set the requested C++ standard.
    pub fn with_standard(mut self, std: Option<CxxStandard>) -> Self {
        self.requested_standard = std;
        self
    }

    /// Set one option value.
    pub fn with_option(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    /// Replace the whole option assignment.
    pub fn with_options(mut self, options: OptionSet) -> Self {
        self.options = options;
        self
    }

    /// Build a validated environment for a recipe.
    ///
    /// Every supplied option must name a declared axis that exists on `os`
    /// and carry one of the axis's values. Applicable axes the caller left
    /// unspecified are filled with their declared defaults, so the result
    /// always carries a complete assignment.
    pub fn for_recipe(
        recipe: &Recipe,
        os: OperatingSystem,
        compiler: CompilerFamily,
        version: impl Into<CompilerVersion>,
        requested_standard: Option<CxxStandard>,
        options: impl IntoIterator<Item = (String, OptionValue)>,
    ) -> Result<Self, EnvironmentError> {
        let mut assignment = OptionSet::new();

        for (name, value) in options {
            let Some(axis) = recipe.option(&name) else {
                let available: Vec<&str> =
                    recipe.options().iter().map(|a| a.name.as_str()).collect();
                return Err(EnvironmentError::UnknownOption {
                    name,
                    available: available.join(", "),
                });
            };
            if !axis.applies_to(os) {
                return Err(EnvironmentError::OptionAbsentForOs { name, os });
            }
            if !axis.accepts(&value) {
                let allowed: Vec<String> =
                    axis.values.iter().map(|v| v.to_string()).collect();
                return Err(EnvironmentError::InvalidValue {
                    name,
                    value,
                    allowed: allowed.join(", "),
                });
            }
            assignment.insert(name, value);
        }

        for axis in recipe.axes_for(os) {
            assignment
                .entry(axis.name.clone())
                .or_insert_with(|| axis.default.clone());
        }

        Ok(TargetEnvironment {
            os,
            compiler,
            version: version.into(),
            requested_standard,
            options: assignment,
        })
    }

    pub fn os(&self) -> OperatingSystem {
        self.os
    }

    pub fn compiler(&self) -> CompilerFamily {
        self.compiler
    }

    pub fn version(&self) -> &CompilerVersion {
        &self.version
    }

    pub fn requested_standard(&self) -> Option<CxxStandard> {
        self.requested_standard
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    /// A stable, filesystem-safe label for this environment.
    ///
    /// Platform triple first, then options in key order, e.g.
    /// `linux-gcc-9.0-fPIC=true-shared=false`. Two environments share a
    /// label only if they are the same environment.
    pub fn label(&self) -> String {
        let mut label = format!("{}-{}-{}", self.os, self.compiler, self.version);
        for (name, value) in &self.options {
            label.push_str(&format!("-{}={}", name, value));
        }
        label
    }
}

impl std::fmt::Display for TargetEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> Recipe {
        Recipe::parse(
            r#"
            [package]
            name = "libsolace"
            version = "0.3.9"

            [standards]
            allowed = ["17", "gnu17", "20", "gnu20"]

            [[options]]
            name = "shared"
            values = [false, true]
            default = false
            define = "BUILD_SHARED_LIBS"

            [[options]]
            name = "fPIC"
            values = [true, false]
            default = true
            define = "CMAKE_POSITION_INDEPENDENT_CODE"
            absent_on = ["windows"]
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_for_recipe_fills_defaults() {
        let recipe = recipe();
        let env = TargetEnvironment::for_recipe(
            &recipe,
            OperatingSystem::Linux,
            CompilerFamily::Gcc,
            "9.0",
            None,
            [],
        )
        .unwrap();

        assert_eq!(env.options().get("shared"), Some(&OptionValue::Bool(false)));
        assert_eq!(env.options().get("fPIC"), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn test_for_recipe_skips_absent_axes() {
        let recipe = recipe();
        let env = TargetEnvironment::for_recipe(
            &recipe,
            OperatingSystem::Windows,
            CompilerFamily::Msvc,
            "19.0",
            None,
            [],
        )
        .unwrap();

        assert_eq!(env.options().get("shared"), Some(&OptionValue::Bool(false)));
        assert!(!env.options().contains_key("fPIC"));
    }

    #[test]
    fn test_for_recipe_rejects_unknown_option() {
        let recipe = recipe();
        let err = TargetEnvironment::for_recipe(
            &recipe,
            OperatingSystem::Linux,
            CompilerFamily::Gcc,
            "9.0",
            None,
            [("lto".to_string(), OptionValue::Bool(true))],
        )
        .unwrap_err();

        assert!(matches!(err, EnvironmentError::UnknownOption { .. }));
        assert!(err.to_string().contains("lto"));
    }

    #[test]
    fn test_for_recipe_rejects_absent_option() {
        let recipe = recipe();
        let err = TargetEnvironment::for_recipe(
            &recipe,
            OperatingSystem::Windows,
            CompilerFamily::Msvc,
            "19.0",
            None,
            [("fPIC".to_string(), OptionValue::Bool(true))],
        )
        .unwrap_err();

        assert!(matches!(err, EnvironmentError::OptionAbsentForOs { .. }));
    }

    #[test]
    fn test_for_recipe_rejects_invalid_value() {
        let recipe = recipe();
        let err = TargetEnvironment::for_recipe(
            &recipe,
            OperatingSystem::Linux,
            CompilerFamily::Gcc,
            "9.0",
            None,
            [("shared".to_string(), OptionValue::from("maybe"))],
        )
        .unwrap_err();

        assert!(matches!(err, EnvironmentError::InvalidValue { .. }));
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_label_is_platform_then_options_in_key_order() {
        let recipe = recipe();
        let env = TargetEnvironment::for_recipe(
            &recipe,
            OperatingSystem::Linux,
            CompilerFamily::Gcc,
            "9.0",
            None,
            [],
        )
        .unwrap();

        assert_eq!(env.label(), "linux-gcc-9.0-fPIC=true-shared=false");
    }

    #[test]
    fn test_labels_distinguish_option_values() {
        let recipe = recipe();
        let a = TargetEnvironment::for_recipe(
            &recipe,
            OperatingSystem::Linux,
            CompilerFamily::Gcc,
            "9.0",
            None,
            [("shared".to_string(), OptionValue::Bool(true))],
        )
        .unwrap();
        let b = TargetEnvironment::for_recipe(
            &recipe,
            OperatingSystem::Linux,
            CompilerFamily::Gcc,
            "9.0",
            None,
            [("shared".to_string(), OptionValue::Bool(false))],
        )
        .unwrap();

        assert_ne!(a.label(), b.label());
    }
}
