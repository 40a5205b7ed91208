//! Build driver abstraction.
//!
//! A driver turns a resolved [`BuildConfiguration`] into tool invocations.
//! Drivers are purely operational: compatibility screening happens in the
//! matrix layer before a configuration ever reaches a driver.

pub mod cmake;
pub mod probe;

pub use cmake::CMakeDriver;
pub use probe::{probe_host, ProbeError};

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::BuildConfiguration;

/// Whether a driver's underlying tool can actually run.
#[derive(Debug, Clone)]
pub enum DriverAvailability {
    /// Tool present and inside the supported version range.
    Available { version: semver::Version },

    /// No binary answering to the tool's name.
    NotInstalled {
        tool: String,
        /// Platform-appropriate installation advice, shown verbatim.
        install_hint: String,
    },

    /// Tool present but below the version floor.
    VersionTooOld {
        found: semver::Version,
        required: semver::VersionReq,
    },
}

impl DriverAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, DriverAvailability::Available { .. })
    }

    /// Why the tool cannot run, or None when it can.
    pub fn error_message(&self) -> Option<String> {
        match self {
            DriverAvailability::Available { .. } => None,
            DriverAvailability::NotInstalled { tool, install_hint } => {
                Some(format!("no usable {} on PATH. {}", tool, install_hint))
            }
            DriverAvailability::VersionTooOld { found, required } => {
                Some(format!("version {} does not satisfy {}", found, required))
            }
        }
    }
}

/// Result of a completed install phase.
#[derive(Debug, Clone, Default)]
pub struct DriverOutcome {
    /// Files placed under the install prefix
    pub artifacts: Vec<Artifact>,
}

/// An installed artifact.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Path under the install prefix
    pub path: PathBuf,

    /// Kind of artifact
    pub kind: ArtifactKind,
}

/// Kind of installed artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Static library
    StaticLib,
    /// Shared/dynamic library
    SharedLib,
    /// Executable
    Executable,
    /// Header file
    Header,
    /// License text
    License,
    /// Anything else (cmake config files, pkg-config files, ...)
    Other,
}

impl ArtifactKind {
    /// Classify a file by name and extension.
    pub fn classify(path: &Path) -> ArtifactKind {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name.starts_with("LICENSE") || name.starts_with("COPYING") {
            return ArtifactKind::License;
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some("a") | Some("lib") => ArtifactKind::StaticLib,
            Some("so") | Some("dylib") | Some("dll") => ArtifactKind::SharedLib,
            Some("exe") => ArtifactKind::Executable,
            Some("h") | Some("hpp") | Some("hxx") => ArtifactKind::Header,
            _ => ArtifactKind::Other,
        }
    }
}

/// BuildDriver trait - interface for build tools.
///
/// The three phases mirror the tool's own lifecycle: configure once per
/// build directory, then build, then install into the configured prefix.
pub trait BuildDriver: Send + Sync {
    /// Human-readable driver name (e.g., "cmake").
    fn name(&self) -> &str;

    /// Probe the underlying tool.
    ///
    /// Spawns the tool (`cmake --version` style) on every call, so callers
    /// should hold off until a build is actually about to start.
    fn availability(&self) -> Result<DriverAvailability>;

    /// Configure the build directory for a resolved configuration.
    fn configure(&self, config: &BuildConfiguration, build_dir: &Path) -> Result<()>;

    /// Execute the build.
    fn build(&self, build_dir: &Path) -> Result<()>;

    /// Install artifacts into the configuration's prefix.
    fn install(&self, config: &BuildConfiguration, build_dir: &Path) -> Result<DriverOutcome>;

    /// Render the commands the three phases would run, without running them.
    fn command_lines(&self, config: &BuildConfiguration, build_dir: &Path) -> Vec<String>;
}
