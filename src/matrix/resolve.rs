//! Configuration resolution: lowering an environment to a build plan.
//!
//! Resolution is deterministic and purely computational. It starts from the
//! recipe's base cache definitions, lowers the environment's option values
//! and requested C++ standard on top, and fills in the platform library
//! list and output paths. Definitions are kept in a sorted map so the same
//! environment always yields the same command line.

use thiserror::Error;

use crate::core::environment::TargetEnvironment;
use crate::core::recipe::Recipe;
use crate::core::resolved::{BuildConfiguration, OutputLayout};
use crate::util::diagnostic::Diagnostic;

/// Errors raised while lowering an environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("option `{name}` is not declared by the recipe")]
    UndeclaredOption { name: String, declared: Vec<String> },
}

impl ResolutionError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolutionError::UndeclaredOption { name, declared } => {
                let mut diag =
                    Diagnostic::error(format!("option `{}` is not declared by the recipe", name));

                if !declared.is_empty() {
                    diag = diag.with_context(format!("declared options: {}", declared.join(", ")));
                }

                diag.with_suggestion(format!("Add an `[[options]]` axis named `{}`", name))
                    .with_suggestion(format!("Drop `{}` from the requested options", name))
            }
        }
    }
}

/// Lowers validated environments into build configurations.
pub struct ConfigurationResolver<'a> {
    recipe: &'a Recipe,
    layout: &'a OutputLayout,
}

impl<'a> ConfigurationResolver<'a> {
    /// Create a new resolver for a recipe and output layout.
    pub fn new(recipe: &'a Recipe, layout: &'a OutputLayout) -> Self {
        ConfigurationResolver { recipe, layout }
    }

    /// Resolve one environment into a build configuration.
    ///
    /// Every option the environment carries must name a declared axis; an
    /// axis without a `define` participates in the matrix without emitting
    /// a cache definition.
    pub fn resolve(&self, env: &TargetEnvironment) -> Result<BuildConfiguration, ResolutionError> {
        let mut definitions = self.recipe.definitions().clone();

        for (name, value) in env.options() {
            let Some(axis) = self.recipe.option(name) else {
                return Err(ResolutionError::UndeclaredOption {
                    name: name.clone(),
                    declared: self.recipe.options().iter().map(|a| a.name.clone()).collect(),
                });
            };
            if let Some(define) = &axis.define {
                definitions.insert(define.clone(), value.as_define_value());
            }
        }

        if let Some(std) = env.requested_standard() {
            definitions.insert("CMAKE_CXX_STANDARD".to_string(), std.year().to_string());
            definitions.insert(
                "CMAKE_CXX_EXTENSIONS".to_string(),
                if std.gnu_extensions() { "ON" } else { "OFF" }.to_string(),
            );
        }

        let source_dir = self.layout.source_dir(self.recipe.source_subfolder());
        let label = env.label();

        Ok(BuildConfiguration {
            package: self.recipe.name().to_string(),
            version: self.recipe.version().to_string(),
            license_file: source_dir.join("LICENSE"),
            source_dir,
            definitions,
            libraries: self.recipe.libraries_for(env.os()),
            install_prefix: self.layout.install_prefix(&label),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::OptionValue;
    use crate::core::platform::{CompilerFamily, OperatingSystem};
    use crate::core::standard::CxxStandard;

    fn recipe() -> Recipe {
        Recipe::parse(
            r#"
            [package]
            name = "libsolace"
            version = "0.3.9"

            [source]
            subfolder = "src"

            [standards]
            allowed = ["17", "gnu17", "20", "gnu20"]

            [definitions]
            PKG_CONFIG = "OFF"

            [libraries]
            base = ["solace"]

            [[libraries.platform]]
            os = "linux"
            libs = ["m"]

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

    fn linux_env(recipe: &Recipe) -> TargetEnvironment {
        TargetEnvironment::for_recipe(
            recipe,
            OperatingSystem::Linux,
            CompilerFamily::Gcc,
            "9.0",
            None,
            [],
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_lowers_defaults() {
        let recipe = recipe();
        let layout = OutputLayout::new("/work/pkg");
        let resolver = ConfigurationResolver::new(&recipe, &layout);

        let config = resolver.resolve(&linux_env(&recipe)).unwrap();

        assert_eq!(config.package, "libsolace");
        assert_eq!(config.version, "0.3.9");
        assert_eq!(config.definitions.get("PKG_CONFIG"), Some(&"OFF".to_string()));
        assert_eq!(
            config.definitions.get("BUILD_SHARED_LIBS"),
            Some(&"OFF".to_string())
        );
        assert_eq!(
            config.definitions.get("CMAKE_POSITION_INDEPENDENT_CODE"),
            Some(&"ON".to_string())
        );
    }

    #[test]
    fn test_resolve_platform_libraries() {
        let recipe = recipe();
        let layout = OutputLayout::new("/work/pkg");
        let resolver = ConfigurationResolver::new(&recipe, &layout);

        let config = resolver.resolve(&linux_env(&recipe)).unwrap();
        assert_eq!(config.libraries, vec!["solace".to_string(), "m".to_string()]);

        let windows = TargetEnvironment::for_recipe(
            &recipe,
            OperatingSystem::Windows,
            CompilerFamily::Msvc,
            "19.0",
            None,
            [],
        )
        .unwrap();
        let config = resolver.resolve(&windows).unwrap();
        assert_eq!(config.libraries, vec!["solace".to_string()]);
        assert!(!config.definitions.contains_key("CMAKE_POSITION_INDEPENDENT_CODE"));
    }

    #[test]
    fn test_resolve_paths() {
        let recipe = recipe();
        let layout = OutputLayout::new("/work/pkg");
        let resolver = ConfigurationResolver::new(&recipe, &layout);

        let env = linux_env(&recipe);
        let config = resolver.resolve(&env).unwrap();

        assert_eq!(config.source_dir, std::path::PathBuf::from("/work/pkg/src"));
        assert_eq!(
            config.license_file,
            std::path::PathBuf::from("/work/pkg/src/LICENSE")
        );
        assert_eq!(config.install_prefix, layout.install_prefix(&env.label()));
    }

    #[test]
    fn test_resolve_standard_lowering() {
        let recipe = recipe();
        let layout = OutputLayout::new("/work/pkg");
        let resolver = ConfigurationResolver::new(&recipe, &layout);

        let env = TargetEnvironment::for_recipe(
            &recipe,
            OperatingSystem::Linux,
            CompilerFamily::Gcc,
            "9.0",
            Some(CxxStandard::Gnu17),
            [],
        )
        .unwrap();
        let config = resolver.resolve(&env).unwrap();
        assert_eq!(
            config.definitions.get("CMAKE_CXX_STANDARD"),
            Some(&"17".to_string())
        );
        assert_eq!(
            config.definitions.get("CMAKE_CXX_EXTENSIONS"),
            Some(&"ON".to_string())
        );

        let env = TargetEnvironment::for_recipe(
            &recipe,
            OperatingSystem::Linux,
            CompilerFamily::Gcc,
            "9.0",
            Some(CxxStandard::Cxx20),
            [],
        )
        .unwrap();
        let config = resolver.resolve(&env).unwrap();
        assert_eq!(
            config.definitions.get("CMAKE_CXX_STANDARD"),
            Some(&"20".to_string())
        );
        assert_eq!(
            config.definitions.get("CMAKE_CXX_EXTENSIONS"),
            Some(&"OFF".to_string())
        );
    }

    #[test]
    fn test_resolve_without_standard_emits_no_standard_keys() {
        let recipe = recipe();
        let layout = OutputLayout::new("/work/pkg");
        let resolver = ConfigurationResolver::new(&recipe, &layout);

        let config = resolver.resolve(&linux_env(&recipe)).unwrap();
        assert!(!config.definitions.contains_key("CMAKE_CXX_STANDARD"));
        assert!(!config.definitions.contains_key("CMAKE_CXX_EXTENSIONS"));
    }

    #[test]
    fn test_resolve_rejects_undeclared_option() {
        let recipe = recipe();
        let layout = OutputLayout::new("/work/pkg");
        let resolver = ConfigurationResolver::new(&recipe, &layout);

        let env = TargetEnvironment::new(OperatingSystem::Linux, CompilerFamily::Gcc, "9.0")
            .with_option("rogue", OptionValue::Bool(true));
        let err = resolver.resolve(&env).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::UndeclaredOption {
                name: "rogue".to_string(),
                declared: vec!["shared".to_string(), "fPIC".to_string()],
            }
        );
    }

    #[test]
    fn test_undeclared_option_diagnostic() {
        let err = ResolutionError::UndeclaredOption {
            name: "lto".to_string(),
            declared: vec!["shared".to_string(), "fPIC".to_string()],
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("option `lto` is not declared"));
        assert!(output.contains("declared options: shared, fPIC"));
        assert!(output.contains("help: consider:"));
    }

    #[test]
    fn test_axis_define_overrides_base_definition() {
        let recipe = Recipe::parse(
            r#"
            [package]
            name = "libsolace"
            version = "0.3.9"

            [standards]
            allowed = ["17"]

            [definitions]
            BUILD_SHARED_LIBS = "OFF"

            [[options]]
            name = "shared"
            values = [false, true]
            default = false
            define = "BUILD_SHARED_LIBS"
            "#,
        )
        .unwrap();
        let layout = OutputLayout::new("/work/pkg");
        let resolver = ConfigurationResolver::new(&recipe, &layout);

        let env = TargetEnvironment::for_recipe(
            &recipe,
            OperatingSystem::Linux,
            CompilerFamily::Gcc,
            "9.0",
            None,
            [("shared".to_string(), OptionValue::Bool(true))],
        )
        .unwrap();
        let config = resolver.resolve(&env).unwrap();
        assert_eq!(
            config.definitions.get("BUILD_SHARED_LIBS"),
            Some(&"ON".to_string())
        );
    }

    #[test]
    fn test_axis_without_define_emits_no_definition() {
        let recipe = Recipe::parse(
            r#"
            [package]
            name = "libsolace"
            version = "0.3.9"

            [standards]
            allowed = ["17"]

            [[options]]
            name = "tests"
            values = [false, true]
            default = false
            "#,
        )
        .unwrap();
        let layout = OutputLayout::new("/work/pkg");
        let resolver = ConfigurationResolver::new(&recipe, &layout);

        let env = TargetEnvironment::for_recipe(
            &recipe,
            OperatingSystem::Linux,
            CompilerFamily::Gcc,
            "9.0",
            None,
            [("tests".to_string(), OptionValue::Bool(true))],
        )
        .unwrap();
        let config = resolver.resolve(&env).unwrap();
        assert!(config.definitions.is_empty());
        assert!(env.label().contains("tests=true"));
    }
}
