//! Resolved build plans and the on-disk output layout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Everything a build driver needs to configure, build, and install one
/// environment. Produced by resolution; consumed by drivers and reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfiguration {
    /// Package name.
    pub package: String,
    /// Package version string.
    pub version: String,
    /// Directory holding the CMake project to configure.
    pub source_dir: PathBuf,
    /// Cache definitions, sorted by key.
    pub definitions: BTreeMap<String, String>,
    /// Libraries consumers link against, in link order.
    pub libraries: Vec<String>,
    /// Where the built package installs.
    pub install_prefix: PathBuf,
    /// The license file to stage alongside the installed package.
    pub license_file: PathBuf,
}

/// Where build outputs live, relative to a recipe root.
///
/// Everything goes under one out directory so a single delete cleans up:
/// `<out>/build/<label>` for build trees and `<out>/install/<label>` for
/// install prefixes, one of each per environment label.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    out_dir: PathBuf,
}

impl OutputLayout {
    /// Default layout: outputs under `<root>/.slipway`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let out_dir = root.join(".slipway");
        OutputLayout { root, out_dir }
    }

    /// Override the out directory.
    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// The directory holding the CMake project.
    pub fn source_dir(&self, subfolder: Option<&str>) -> PathBuf {
        match subfolder {
            Some(sub) => self.root.join(sub),
            None => self.root.clone(),
        }
    }

    /// The build tree for one environment.
    pub fn build_dir(&self, label: &str) -> PathBuf {
        self.out_dir.join("build").join(label)
    }

    /// The install prefix for one environment.
    pub fn install_prefix(&self, label: &str) -> PathBuf {
        self.out_dir.join("install").join(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new("/work/pkg");

        assert_eq!(layout.source_dir(None), PathBuf::from("/work/pkg"));
        assert_eq!(layout.source_dir(Some("src")), PathBuf::from("/work/pkg/src"));
        assert_eq!(
            layout.build_dir("linux-gcc-9.0-shared=false"),
            PathBuf::from("/work/pkg/.slipway/build/linux-gcc-9.0-shared=false")
        );
        assert_eq!(
            layout.install_prefix("linux-gcc-9.0-shared=false"),
            PathBuf::from("/work/pkg/.slipway/install/linux-gcc-9.0-shared=false")
        );
    }

    #[test]
    fn test_layout_out_dir_override() {
        let layout = OutputLayout::new("/work/pkg").with_out_dir("/tmp/out");
        assert_eq!(layout.build_dir("x"), PathBuf::from("/tmp/out/build/x"));
        assert_eq!(layout.root(), Path::new("/work/pkg"));
    }

    #[test]
    fn test_configuration_serializes() {
        let config = BuildConfiguration {
            package: "libsolace".to_string(),
            version: "0.3.9".to_string(),
            source_dir: PathBuf::from("/work/pkg/src"),
            definitions: BTreeMap::from([
                ("PKG_CONFIG".to_string(), "OFF".to_string()),
                ("BUILD_SHARED_LIBS".to_string(), "OFF".to_string()),
            ]),
            libraries: vec!["solace".to_string(), "m".to_string()],
            install_prefix: PathBuf::from("/work/pkg/.slipway/install/x"),
            license_file: PathBuf::from("/work/pkg/src/LICENSE"),
        };

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["package"], "libsolace");
        assert_eq!(json["definitions"]["PKG_CONFIG"], "OFF");
        assert_eq!(json["libraries"][1], "m");
    }
}
