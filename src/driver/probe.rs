//! Host environment probing.
//!
//! Answers "what would this machine build as": the host operating system
//! plus the first C++ compiler found on it, expressed as a [`PlatformSpec`]
//! ready for validation.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::core::{CompilerFamily, OperatingSystem, PlatformSpec};
use crate::util::process::{find_executable, ProcessBuilder};

/// Compiler binaries tried in order when `CXX` and `CC` are unset.
const COMPILER_CANDIDATES: &[&str] = &["c++", "g++", "clang++", "cc", "gcc", "clang", "cl"];

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+(?:\.\d+)?").unwrap());

/// Why the host could not be probed.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("unsupported host operating system `{0}`")]
    UnsupportedOs(String),

    #[error("no C++ compiler found on PATH (tried CXX, CC, {})", COMPILER_CANDIDATES.join(", "))]
    CompilerNotFound,

    #[error("could not determine the version of `{compiler}`")]
    VersionNotFound { compiler: String },
}

/// Probe the host operating system and compiler.
pub fn probe_host() -> Result<PlatformSpec, ProbeError> {
    let os = OperatingSystem::host()
        .ok_or_else(|| ProbeError::UnsupportedOs(std::env::consts::OS.to_string()))?;

    let compiler = find_compiler().ok_or(ProbeError::CompilerNotFound)?;
    let (family, version) = identify_compiler(&compiler)?;

    tracing::debug!(
        "Probed host: {} with {} {} at {}",
        os,
        family,
        version,
        compiler.display()
    );

    Ok(PlatformSpec::new(os, family, version.as_str()))
}

fn find_compiler() -> Option<PathBuf> {
    for var in ["CXX", "CC"] {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                return Some(PathBuf::from(value));
            }
        }
    }

    COMPILER_CANDIDATES
        .iter()
        .find_map(|name| find_executable(name))
}

/// Work out a compiler's family and version from its name and banner.
fn identify_compiler(compiler: &Path) -> Result<(CompilerFamily, String), ProbeError> {
    let name = compiler
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    let banner = version_banner(compiler, &name);

    let family = family_from_name(&name)
        .or_else(|| family_from_banner(&banner))
        .unwrap_or(CompilerFamily::Gcc);

    // Plain clang and Apple clang share a binary name, so the banner decides.
    let family = if family == CompilerFamily::Clang && banner.to_lowercase().contains("apple") {
        CompilerFamily::AppleClang
    } else {
        family
    };

    let version = VERSION_RE
        .find(&banner)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ProbeError::VersionNotFound {
            compiler: compiler.display().to_string(),
        })?;

    Ok((family, version))
}

/// Capture the compiler's version banner.
///
/// `cl.exe` has no `--version` flag and prints its banner to stderr when
/// run bare; everything else answers `--version` on stdout.
fn version_banner(compiler: &Path, name: &str) -> String {
    let proc = if name == "cl" {
        ProcessBuilder::new(compiler)
    } else {
        ProcessBuilder::new(compiler).arg("--version")
    };

    match proc.exec() {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            if stdout.trim().is_empty() {
                String::from_utf8_lossy(&output.stderr).into_owned()
            } else {
                stdout
            }
        }
        Err(_) => String::new(),
    }
}

fn family_from_name(name: &str) -> Option<CompilerFamily> {
    // clang++ contains "g++", so clang must be checked first
    if name.contains("clang") {
        Some(CompilerFamily::Clang)
    } else if name.contains("gcc") || name.contains("g++") {
        Some(CompilerFamily::Gcc)
    } else if name == "cl" {
        Some(CompilerFamily::Msvc)
    } else {
        None
    }
}

fn family_from_banner(banner: &str) -> Option<CompilerFamily> {
    let lower = banner.to_lowercase();
    if lower.contains("clang") {
        Some(CompilerFamily::Clang)
    } else if lower.contains("gcc") || lower.contains("free software foundation") {
        Some(CompilerFamily::Gcc)
    } else if lower.contains("microsoft") {
        Some(CompilerFamily::Msvc)
    } else {
        None
    }
}
