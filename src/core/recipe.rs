//! Slipway.toml recipe parsing and schema.
//!
//! The recipe is the central configuration file for a package: which C++
//! standards it accepts, which compiler versions it supports, the CMake
//! cache definitions it always sets, the libraries consumers link, and the
//! option axes its build matrix ranges over.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use miette::Diagnostic as MietteDiagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::core::options::OptionAxis;
use crate::core::platform::{CompilerFamily, OperatingSystem};
use crate::core::standard::{CxxStandard, StandardSet};
use crate::util::version::parse_version_lenient;

/// Canonical recipe file name.
pub const RECIPE_FILE_NAME: &str = "Slipway.toml";

/// Errors raised when a recipe is malformed.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum RecipeError {
    #[error(transparent)]
    Parse(#[from] toml::de::Error),

    #[error("recipe accepts no C++ standard")]
    #[diagnostic(
        code(slipway::recipe::no_standards),
        help("list at least one entry under [standards], e.g. allowed = [\"17\", \"gnu17\"]")
    )]
    NoStandards,

    #[error("duplicate compatibility rule for {compiler}")]
    #[diagnostic(code(slipway::recipe::duplicate_rule))]
    DuplicateRule { compiler: CompilerFamily },

    #[error("invalid minimum version `{minimum}` for {compiler}")]
    #[diagnostic(
        code(slipway::recipe::bad_minimum),
        help("minimum versions look like `7`, `9.4`, or `19.2.1`")
    )]
    BadMinimum {
        compiler: CompilerFamily,
        minimum: String,
    },

    #[error("option `{name}` is declared twice")]
    #[diagnostic(code(slipway::recipe::duplicate_axis))]
    DuplicateAxis { name: String },

    #[error("option `{name}` has no values")]
    #[diagnostic(code(slipway::recipe::empty_axis))]
    EmptyAxis { name: String },

    #[error("default `{default}` for option `{name}` is not one of its values")]
    #[diagnostic(code(slipway::recipe::bad_default))]
    BadDefault { name: String, default: String },

    #[error("source.subfolder is empty")]
    #[diagnostic(
        code(slipway::recipe::empty_subfolder),
        help("omit the key to build from the package root")
    )]
    EmptySubfolder,
}

/// A minimum-version rule for one compiler family.
///
/// Versions below `minimum` are rejected; families with no rule are
/// accepted at any version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityRule {
    pub compiler: CompilerFamily,
    pub minimum: semver::Version,
}

/// Libraries linked only on specific operating systems.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformLibraries {
    pub os: OperatingSystem,
    pub libs: Vec<String>,
}

/// Raw recipe as deserialized from TOML.
#[derive(Debug, Deserialize)]
struct RawRecipe {
    package: RawPackage,

    #[serde(default)]
    source: RawSource,

    #[serde(default)]
    standards: RawStandards,

    #[serde(default)]
    compatibility: Vec<RawRule>,

    #[serde(default)]
    definitions: BTreeMap<String, String>,

    #[serde(default)]
    libraries: RawLibraries,

    #[serde(default)]
    options: Vec<OptionAxis>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: String,
    version: String,

    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    license: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSource {
    #[serde(default)]
    subfolder: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawStandards {
    #[serde(default)]
    allowed: Vec<CxxStandard>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    compiler: CompilerFamily,
    minimum: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawLibraries {
    #[serde(default)]
    base: Vec<String>,

    #[serde(default)]
    platform: Vec<PlatformLibraries>,
}

/// The parsed and validated Slipway.toml recipe.
#[derive(Debug, Clone)]
pub struct Recipe {
    name: String,
    version: String,
    description: Option<String>,
    license: Option<String>,
    source_subfolder: Option<String>,
    standards: StandardSet,
    rules: Vec<CompatibilityRule>,
    definitions: BTreeMap<String, String>,
    base_libraries: Vec<String>,
    platform_libraries: Vec<PlatformLibraries>,
    options: Vec<OptionAxis>,
    root: PathBuf,
}

impl Recipe {
    /// Load a recipe from a file path.
    ///
    /// The recipe root becomes the file's parent directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let mut recipe = Self::parse(&content)
            .with_context(|| format!("invalid recipe at {}", path.display()))?;
        recipe.root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(recipe)
    }

    /// Parse recipe content. The root defaults to the current directory.
    pub fn parse(content: &str) -> Result<Self, RecipeError> {
        let raw: RawRecipe = toml::from_str(content)?;

        let standards = StandardSet::new(raw.standards.allowed);
        if standards.is_empty() {
            return Err(RecipeError::NoStandards);
        }

        let mut rules: Vec<CompatibilityRule> = Vec::new();
        for rule in raw.compatibility {
            if rules.iter().any(|r| r.compiler == rule.compiler) {
                return Err(RecipeError::DuplicateRule {
                    compiler: rule.compiler,
                });
            }
            let minimum =
                parse_version_lenient(&rule.minimum).ok_or_else(|| RecipeError::BadMinimum {
                    compiler: rule.compiler,
                    minimum: rule.minimum.clone(),
                })?;
            rules.push(CompatibilityRule {
                compiler: rule.compiler,
                minimum,
            });
        }

        let mut options: Vec<OptionAxis> = Vec::new();
        for axis in raw.options {
            if options.iter().any(|a| a.name == axis.name) {
                return Err(RecipeError::DuplicateAxis { name: axis.name });
            }
            if axis.values.is_empty() {
                return Err(RecipeError::EmptyAxis { name: axis.name });
            }
            if !axis.accepts(&axis.default) {
                return Err(RecipeError::BadDefault {
                    name: axis.name.clone(),
                    default: axis.default.to_string(),
                });
            }
            options.push(axis);
        }

        if raw.source.subfolder.as_deref() == Some("") {
            return Err(RecipeError::EmptySubfolder);
        }

        Ok(Recipe {
            name: raw.package.name,
            version: raw.package.version,
            description: raw.package.description,
            license: raw.package.license,
            source_subfolder: raw.source.subfolder,
            standards,
            rules,
            definitions: raw.definitions,
            base_libraries: raw.libraries.base,
            platform_libraries: raw.libraries.platform,
            options,
            root: PathBuf::from("."),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    /// The C++ standards this package accepts.
    pub fn standards(&self) -> &StandardSet {
        &self.standards
    }

    /// The minimum-version rule for a compiler family, if one is declared.
    pub fn rule_for(&self, compiler: CompilerFamily) -> Option<&CompatibilityRule> {
        self.rules.iter().find(|r| r.compiler == compiler)
    }

    /// Cache definitions the package always sets.
    pub fn definitions(&self) -> &BTreeMap<String, String> {
        &self.definitions
    }

    /// Libraries consumers link on the given operating system.
    ///
    /// Base libraries first, then platform additions in declaration order.
    pub fn libraries_for(&self, os: OperatingSystem) -> Vec<String> {
        let mut libs = self.base_libraries.clone();
        for entry in &self.platform_libraries {
            if entry.os == os {
                libs.extend(entry.libs.iter().cloned());
            }
        }
        libs
    }

    /// A declared option axis, by name.
    pub fn option(&self, name: &str) -> Option<&OptionAxis> {
        self.options.iter().find(|a| a.name == name)
    }

    /// All declared option axes, in declaration order.
    pub fn options(&self) -> &[OptionAxis] {
        &self.options
    }

    /// The option axes that exist on the given operating system.
    pub fn axes_for(&self, os: OperatingSystem) -> impl Iterator<Item = &OptionAxis> {
        self.options.iter().filter(move |a| a.applies_to(os))
    }

    /// Subdirectory of the recipe root holding the CMake project, if any.
    pub fn source_subfolder(&self) -> Option<&str> {
        self.source_subfolder.as_deref()
    }

    /// The directory containing this recipe.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
