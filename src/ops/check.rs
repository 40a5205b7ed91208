//! Implementation of `slipway check`.

use anyhow::{bail, Context, Result};

use crate::core::{CxxStandard, OptionValue, OutputLayout, PlatformSpec, Recipe, TargetEnvironment};
use crate::driver::probe_host;
use crate::matrix::{evaluate_environment, BuildJob};

/// Options for the check command.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Explicit platform to check (os:compiler:version)
    pub platform: Option<PlatformSpec>,

    /// Probe the host instead of taking an explicit platform
    pub host: bool,

    /// Requested C++ standard
    pub standard: Option<CxxStandard>,

    /// Option assignments from the command line
    pub options: Vec<(String, OptionValue)>,
}

/// Evaluate a single environment against the recipe.
///
/// Returns the job with its verdict attached; deciding what a rejection
/// means (exit code, message) is left to the caller.
pub fn check_environment(
    recipe: &Recipe,
    layout: &OutputLayout,
    opts: &CheckOptions,
) -> Result<BuildJob> {
    let spec = match (&opts.platform, opts.host) {
        (Some(spec), _) => spec.clone(),
        (None, true) => probe_host().context("failed to probe the host environment")?,
        (None, false) => bail!("no platform given; pass --platform or --host"),
    };

    let standard = opts.standard.or(spec.std);

    let env = TargetEnvironment::for_recipe(
        recipe,
        spec.os,
        spec.compiler,
        spec.version.clone(),
        standard,
        opts.options.iter().cloned(),
    )?;

    Ok(evaluate_environment(recipe, layout, env))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CompilerFamily, OperatingSystem};
    use crate::matrix::Verdict;
    use tempfile::TempDir;

    fn create_test_recipe(dir: &std::path::Path) -> Recipe {
        std::fs::write(
            dir.join("Slipway.toml"),
            r#"
[package]
name = "libsolace"
version = "0.3.9"
license = "Apache-2.0"

[standards]
allowed = ["17", "gnu17", "20", "gnu20"]

[[compatibility]]
compiler = "gcc"
minimum = "7"

[[compatibility]]
compiler = "clang"
minimum = "5"

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
        .unwrap();
        Recipe::load(&dir.join("Slipway.toml")).unwrap()
    }

    fn platform(os: OperatingSystem, compiler: CompilerFamily, version: &str) -> PlatformSpec {
        PlatformSpec::new(os, compiler, version)
    }

    #[test]
    fn test_check_accepted_platform() {
        let temp = TempDir::new().unwrap();
        let recipe = create_test_recipe(temp.path());
        let layout = OutputLayout::new(temp.path());

        let opts = CheckOptions {
            platform: Some(platform(OperatingSystem::Linux, CompilerFamily::Gcc, "9.0")),
            ..Default::default()
        };

        let job = check_environment(&recipe, &layout, &opts).unwrap();
        assert!(job.verdict().is_accepted());
        assert_eq!(job.label(), "linux-gcc-9.0-fPIC=true-shared=false");
    }

    #[test]
    fn test_check_rejected_platform_still_returns_job() {
        let temp = TempDir::new().unwrap();
        let recipe = create_test_recipe(temp.path());
        let layout = OutputLayout::new(temp.path());

        let opts = CheckOptions {
            platform: Some(platform(OperatingSystem::Linux, CompilerFamily::Gcc, "6.0")),
            ..Default::default()
        };

        let job = check_environment(&recipe, &layout, &opts).unwrap();
        match job.verdict() {
            Verdict::Rejected(cause) => {
                assert!(cause.to_string().contains("below the supported minimum"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_check_explicit_standard_wins_over_platform() {
        let temp = TempDir::new().unwrap();
        let recipe = create_test_recipe(temp.path());
        let layout = OutputLayout::new(temp.path());

        let spec = platform(OperatingSystem::Linux, CompilerFamily::Gcc, "9.0")
            .with_std(CxxStandard::Cxx14);
        let opts = CheckOptions {
            platform: Some(spec),
            standard: Some(CxxStandard::Cxx20),
            ..Default::default()
        };

        let job = check_environment(&recipe, &layout, &opts).unwrap();
        assert!(job.verdict().is_accepted());
    }

    #[test]
    fn test_check_without_platform_or_host() {
        let temp = TempDir::new().unwrap();
        let recipe = create_test_recipe(temp.path());
        let layout = OutputLayout::new(temp.path());

        let err = check_environment(&recipe, &layout, &CheckOptions::default()).unwrap_err();
        assert!(err.to_string().contains("--platform or --host"));
    }

    #[test]
    fn test_check_unknown_option_fails() {
        let temp = TempDir::new().unwrap();
        let recipe = create_test_recipe(temp.path());
        let layout = OutputLayout::new(temp.path());

        let opts = CheckOptions {
            platform: Some(platform(OperatingSystem::Linux, CompilerFamily::Gcc, "9.0")),
            options: vec![("lto".to_string(), OptionValue::Bool(true))],
            ..Default::default()
        };

        let err = check_environment(&recipe, &layout, &opts).unwrap_err();
        assert!(err.to_string().contains("lto"));
    }
}
