//! Implementation of `slipway matrix`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::{OutputLayout, PlatformSpec, Recipe};
use crate::matrix::{BuildJob, MatrixExpander, Verdict};

/// An expanded matrix with per-verdict tallies.
#[derive(Debug)]
pub struct MatrixSummary {
    /// Every job, in expansion order.
    pub jobs: Vec<BuildJob>,
}

impl MatrixSummary {
    pub fn accepted(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Accepted(_)))
    }

    pub fn rejected(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Rejected(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Failed(_)))
    }

    /// True when any environment failed to lower.
    ///
    /// Rejections are ordinary screening output, not failures.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&Verdict) -> bool) -> usize {
        self.jobs.iter().filter(|j| pred(j.verdict())).count()
    }
}

/// Expand the full build matrix for a set of platforms.
pub fn expand_matrix(
    recipe: &Recipe,
    layout: &OutputLayout,
    platforms: &[PlatformSpec],
) -> MatrixSummary {
    let expander = MatrixExpander::new(recipe, layout);
    MatrixSummary {
        jobs: expander.expand(platforms),
    }
}

/// One machine-readable event per job, for `--format json`.
pub fn job_event(job: &BuildJob) -> serde_json::Value {
    match job.verdict() {
        Verdict::Accepted(config) => serde_json::json!({
            "reason": "job",
            "label": job.label(),
            "verdict": "accepted",
            "configuration": config,
        }),
        Verdict::Rejected(cause) => serde_json::json!({
            "reason": "job",
            "label": job.label(),
            "verdict": "rejected",
            "cause": cause.to_string(),
        }),
        Verdict::Failed(cause) => serde_json::json!({
            "reason": "job",
            "label": job.label(),
            "verdict": "failed",
            "cause": cause.to_string(),
        }),
    }
}

#[derive(Debug, Deserialize)]
struct PlatformsFile {
    #[serde(default)]
    platform: Vec<PlatformSpec>,
}

/// Read a platform list from a TOML file.
///
/// The file holds one `[[platform]]` table per target environment:
///
/// ```toml
/// [[platform]]
/// os = "linux"
/// compiler = "gcc"
/// version = "9.0"
/// ```
pub fn load_platforms(path: &Path) -> Result<Vec<PlatformSpec>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let file: PlatformsFile = toml::from_str(&content)
        .with_context(|| format!("invalid platforms file at {}", path.display()))?;

    Ok(file.platform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CompilerFamily, OperatingSystem};
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

    #[test]
    fn test_summary_counts() {
        let temp = TempDir::new().unwrap();
        let recipe = create_test_recipe(temp.path());
        let layout = OutputLayout::new(temp.path());

        let platforms = vec![
            PlatformSpec::new(OperatingSystem::Linux, CompilerFamily::Gcc, "9.0"),
            PlatformSpec::new(OperatingSystem::Linux, CompilerFamily::Gcc, "6.0"),
        ];

        let summary = expand_matrix(&recipe, &layout, &platforms);
        assert_eq!(summary.jobs.len(), 8);
        assert_eq!(summary.accepted(), 4);
        assert_eq!(summary.rejected(), 4);
        assert_eq!(summary.failed(), 0);
        assert!(!summary.has_failures());
    }

    #[test]
    fn test_job_event_shapes() {
        let temp = TempDir::new().unwrap();
        let recipe = create_test_recipe(temp.path());
        let layout = OutputLayout::new(temp.path());

        let platforms = vec![
            PlatformSpec::new(OperatingSystem::Linux, CompilerFamily::Gcc, "9.0"),
            PlatformSpec::new(OperatingSystem::Linux, CompilerFamily::Gcc, "6.0"),
        ];
        let summary = expand_matrix(&recipe, &layout, &platforms);

        let accepted = job_event(&summary.jobs[0]);
        assert_eq!(accepted["reason"], "job");
        assert_eq!(accepted["verdict"], "accepted");
        assert_eq!(accepted["configuration"]["definitions"]["PKG_CONFIG"], "OFF");
        assert_eq!(accepted["configuration"]["libraries"][1], "m");

        let rejected = job_event(&summary.jobs[4]);
        assert_eq!(rejected["verdict"], "rejected");
        assert!(rejected["cause"]
            .as_str()
            .unwrap()
            .contains("below the supported minimum"));
        assert!(rejected.get("configuration").is_none());
    }

    #[test]
    fn test_load_platforms() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("platforms.toml");
        std::fs::write(
            &path,
            r#"
[[platform]]
os = "linux"
compiler = "gcc"
version = "9.0"

[[platform]]
os = "windows"
compiler = "msvc"
version = "19.0"
std = "17"
"#,
        )
        .unwrap();

        let platforms = load_platforms(&path).unwrap();
        assert_eq!(platforms.len(), 2);
        assert_eq!(platforms[0].os, OperatingSystem::Linux);
        assert_eq!(platforms[1].compiler, CompilerFamily::Msvc);
        assert_eq!(platforms[1].std, Some(crate::core::CxxStandard::Cxx17));
    }

    #[test]
    fn test_load_platforms_missing_file() {
        let err = load_platforms(Path::new("/nonexistent/platforms.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_load_platforms_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("platforms.toml");
        std::fs::write(&path, "").unwrap();

        let platforms = load_platforms(&path).unwrap();
        assert!(platforms.is_empty());
    }
}
