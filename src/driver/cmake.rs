//! CMake build driver.
//!
//! Drives `cmake` through its configure, build, and install phases for one
//! resolved configuration. Definitions land on the configure command line as
//! `-D<KEY>=<VALUE>` cache entries, sorted by key.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use walkdir::WalkDir;

use crate::core::BuildConfiguration;
use crate::driver::{Artifact, ArtifactKind, BuildDriver, DriverAvailability, DriverOutcome};
use crate::util::config::DriverConfig;
use crate::util::process::{find_cmake, ProcessBuilder};
use crate::util::version::parse_version_lenient;

/// Minimum CMake version the driver supports.
const CMAKE_VERSION_REQ: &str = ">=3.16";

/// CMake build driver.
pub struct CMakeDriver {
    cmake: PathBuf,
    generator: Option<String>,
    build_type: String,
}

impl CMakeDriver {
    /// Create a driver around a known cmake binary.
    pub fn new(cmake: impl Into<PathBuf>) -> Self {
        CMakeDriver {
            cmake: cmake.into(),
            generator: None,
            build_type: "Release".to_string(),
        }
    }

    /// Locate cmake and apply driver configuration.
    ///
    /// Resolution order: configured path, `CMAKE` environment variable,
    /// then PATH lookup.
    pub fn discover(config: &DriverConfig) -> Result<Self> {
        let cmake = locate_cmake(config)
            .ok_or_else(|| anyhow!("cmake not found\n{}", install_hint()))?;

        let mut driver = CMakeDriver::new(cmake);
        driver.generator = config.generator.clone();
        if let Some(ref build_type) = config.build_type {
            driver.build_type = build_type.clone();
        }
        Ok(driver)
    }

    /// Set the generator passed via `-G`.
    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = Some(generator.into());
        self
    }

    /// Set the build type (default `Release`).
    pub fn with_build_type(mut self, build_type: impl Into<String>) -> Self {
        self.build_type = build_type.into();
        self
    }

    fn configure_process(&self, config: &BuildConfiguration, build_dir: &Path) -> ProcessBuilder {
        let mut proc = ProcessBuilder::new(&self.cmake)
            .arg("-S")
            .arg(&config.source_dir)
            .arg("-B")
            .arg(build_dir);

        if let Some(ref generator) = self.generator {
            proc = proc.arg("-G").arg(generator);
        }

        proc = proc.arg(format!("-DCMAKE_BUILD_TYPE={}", self.build_type));
        proc = proc.arg(format!(
            "-DCMAKE_INSTALL_PREFIX={}",
            config.install_prefix.display()
        ));

        for (key, value) in &config.definitions {
            proc = proc.arg(format!("-D{}={}", key, value));
        }

        proc
    }

    fn build_process(&self, build_dir: &Path) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake)
            .arg("--build")
            .arg(build_dir)
            .arg("--parallel")
            .arg("--config")
            .arg(&self.build_type)
    }

    fn install_process(&self, config: &BuildConfiguration, build_dir: &Path) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake)
            .arg("--install")
            .arg(build_dir)
            .arg("--prefix")
            .arg(&config.install_prefix)
    }

    fn detect_version(&self) -> Result<semver::Version> {
        let output = ProcessBuilder::new(&self.cmake).arg("--version").exec()?;
        if !output.status.success() {
            bail!("`{} --version` failed", self.cmake.display());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_cmake_version(&stdout).ok_or_else(|| {
            anyhow!(
                "could not parse version from `{} --version` output",
                self.cmake.display()
            )
        })
    }

    /// Copy the package license into `<prefix>/licenses/`.
    ///
    /// A missing license file is logged, not fatal: the installed tree is
    /// still usable and the verdict already passed validation.
    fn stage_license(&self, config: &BuildConfiguration) -> Result<()> {
        let license = &config.license_file;
        if !license.is_file() {
            tracing::warn!("License file not found: {}", license.display());
            return Ok(());
        }

        let dest_dir = config.install_prefix.join("licenses");
        std::fs::create_dir_all(&dest_dir)
            .with_context(|| format!("failed to create {}", dest_dir.display()))?;

        let file_name = license
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("LICENSE"));
        let dest = dest_dir.join(file_name);
        std::fs::copy(license, &dest)
            .with_context(|| format!("failed to copy license to {}", dest.display()))?;

        tracing::debug!("Staged license at {}", dest.display());
        Ok(())
    }
}

impl BuildDriver for CMakeDriver {
    fn name(&self) -> &str {
        "cmake"
    }

    fn availability(&self) -> Result<DriverAvailability> {
        let required = semver::VersionReq::parse(CMAKE_VERSION_REQ)
            .context("invalid cmake version requirement")?;

        let availability = match self.detect_version() {
            Ok(version) => {
                if required.matches(&version) {
                    DriverAvailability::Available { version }
                } else {
                    DriverAvailability::VersionTooOld {
                        found: version,
                        required,
                    }
                }
            }
            Err(_) => DriverAvailability::NotInstalled {
                tool: "cmake".to_string(),
                install_hint: install_hint(),
            },
        };

        Ok(availability)
    }

    fn configure(&self, config: &BuildConfiguration, build_dir: &Path) -> Result<()> {
        let proc = self.configure_process(config, build_dir);
        tracing::debug!("CMake configure: {}", proc.display_command());
        proc.exec_and_check()?;
        Ok(())
    }

    fn build(&self, build_dir: &Path) -> Result<()> {
        let proc = self.build_process(build_dir);
        tracing::debug!("CMake build: {}", proc.display_command());
        proc.exec_and_check()?;
        Ok(())
    }

    fn install(&self, config: &BuildConfiguration, build_dir: &Path) -> Result<DriverOutcome> {
        let proc = self.install_process(config, build_dir);
        tracing::debug!("CMake install: {}", proc.display_command());
        proc.exec_and_check()?;

        self.stage_license(config)?;

        Ok(DriverOutcome {
            artifacts: collect_artifacts(&config.install_prefix),
        })
    }

    fn command_lines(&self, config: &BuildConfiguration, build_dir: &Path) -> Vec<String> {
        vec![
            self.configure_process(config, build_dir).display_command(),
            self.build_process(build_dir).display_command(),
            self.install_process(config, build_dir).display_command(),
        ]
    }
}

fn locate_cmake(config: &DriverConfig) -> Option<PathBuf> {
    if let Some(ref cmake) = config.cmake {
        if cmake.exists() {
            return Some(cmake.clone());
        }
        tracing::warn!("Configured cmake not found: {}", cmake.display());
    }

    if let Ok(cmake) = std::env::var("CMAKE") {
        return Some(PathBuf::from(cmake));
    }

    find_cmake()
}

/// Parse the first line of `cmake --version` output.
///
/// Handles plain releases ("cmake version 3.20.5") as well as suffixed
/// builds ("cmake version 3.28.1-dirty").
fn parse_cmake_version(stdout: &str) -> Option<semver::Version> {
    for line in stdout.lines() {
        if let Some(rest) = line.strip_prefix("cmake version ") {
            let token = rest.trim().split('-').next().unwrap_or(rest);
            return parse_version_lenient(token);
        }
    }
    None
}

/// Platform-specific CMake install hint.
fn install_hint() -> String {
    #[cfg(target_os = "linux")]
    {
        "Install CMake: apt install cmake, dnf install cmake, or https://cmake.org/download/"
            .to_string()
    }
    #[cfg(target_os = "macos")]
    {
        "Install CMake: brew install cmake or https://cmake.org/download/".to_string()
    }
    #[cfg(target_os = "windows")]
    {
        "Install CMake: winget install cmake or https://cmake.org/download/".to_string()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        "Install CMake from https://cmake.org/download/".to_string()
    }
}

/// Walk the install prefix and classify everything found there.
fn collect_artifacts(prefix: &Path) -> Vec<Artifact> {
    let mut artifacts: Vec<Artifact> = WalkDir::new(prefix)
        .into_iter()
        .flatten()
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let path = entry.into_path();
            let kind = ArtifactKind::classify(&path);
            Artifact { path, kind }
        })
        .collect();

    artifacts.sort_by(|a, b| a.path.cmp(&b.path));
    artifacts
}
