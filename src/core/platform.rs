//! Operating systems, compiler families, and candidate platform triples.

use serde::{Deserialize, Serialize};

use crate::util::version::parse_version_lenient;

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    Linux,
    Windows,
    /// macOS
    #[serde(alias = "osx", alias = "darwin")]
    Macos,
    #[serde(rename = "freebsd")]
    FreeBsd,
}

impl OperatingSystem {
    /// Get the OS name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingSystem::Linux => "linux",
            OperatingSystem::Windows => "windows",
            OperatingSystem::Macos => "macos",
            OperatingSystem::FreeBsd => "freebsd",
        }
    }

    /// Detect the operating system this process is running on.
    pub fn host() -> Option<OperatingSystem> {
        match std::env::consts::OS {
            "linux" => Some(OperatingSystem::Linux),
            "windows" => Some(OperatingSystem::Windows),
            "macos" => Some(OperatingSystem::Macos),
            "freebsd" => Some(OperatingSystem::FreeBsd),
            _ => None,
        }
    }
}

impl std::str::FromStr for OperatingSystem {
    type Err = OsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(OperatingSystem::Linux),
            "windows" => Ok(OperatingSystem::Windows),
            "macos" | "osx" | "darwin" => Ok(OperatingSystem::Macos),
            "freebsd" => Ok(OperatingSystem::FreeBsd),
            _ => Err(OsParseError(s.to_string())),
        }
    }
}

impl std::fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an invalid operating system name.
#[derive(Debug, Clone)]
pub struct OsParseError(pub String);

impl std::fmt::Display for OsParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid operating system '{}', valid values: linux, windows, macos, freebsd",
            self.0
        )
    }
}

impl std::error::Error for OsParseError {}

/// Compiler family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompilerFamily {
    Gcc,
    Clang,
    /// Apple's Clang fork, versioned independently of upstream Clang.
    AppleClang,
    Msvc,
}

impl CompilerFamily {
    /// Get the compiler family name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerFamily::Gcc => "gcc",
            CompilerFamily::Clang => "clang",
            CompilerFamily::AppleClang => "apple-clang",
            CompilerFamily::Msvc => "msvc",
        }
    }
}

impl std::str::FromStr for CompilerFamily {
    type Err = CompilerFamilyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gcc" => Ok(CompilerFamily::Gcc),
            "clang" => Ok(CompilerFamily::Clang),
            "apple-clang" | "appleclang" => Ok(CompilerFamily::AppleClang),
            "msvc" | "cl" => Ok(CompilerFamily::Msvc),
            _ => Err(CompilerFamilyParseError(s.to_string())),
        }
    }
}

impl std::fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an invalid compiler family name.
#[derive(Debug, Clone)]
pub struct CompilerFamilyParseError(pub String);

impl std::fmt::Display for CompilerFamilyParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid compiler '{}', valid values: gcc, clang, apple-clang, msvc",
            self.0
        )
    }
}

impl std::error::Error for CompilerFamilyParseError {}

/// A compiler version as reported by the outside world.
///
/// The raw string is preserved for display; comparison uses the lenient
/// semver parse. A version that does not parse still constructs (intake
/// never fails), but `parsed()` returns `None` and version checks against
/// it must fail closed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CompilerVersion {
    raw: String,
    parsed: Option<semver::Version>,
}

impl CompilerVersion {
    /// Create a version from its raw textual form.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = parse_version_lenient(&raw);
        CompilerVersion { raw, parsed }
    }

    /// The version exactly as supplied.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The semver interpretation, if one exists.
    pub fn parsed(&self) -> Option<&semver::Version> {
        self.parsed.as_ref()
    }
}

impl From<String> for CompilerVersion {
    fn from(raw: String) -> Self {
        CompilerVersion::new(raw)
    }
}

impl From<&str> for CompilerVersion {
    fn from(raw: &str) -> Self {
        CompilerVersion::new(raw)
    }
}

impl From<CompilerVersion> for String {
    fn from(version: CompilerVersion) -> String {
        version.raw
    }
}

impl std::fmt::Display for CompilerVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A candidate platform triple supplied by CI: `(os, compiler, version)`.
///
/// Parses from the CLI form `os:compiler:version` (e.g. `linux:gcc:9.0`)
/// and deserializes from `[[platform]]` entries in a platforms file, where
/// an optional `std` pins a requested C++ standard for that platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlatformSpec {
    pub os: OperatingSystem,
    pub compiler: CompilerFamily,
    pub version: CompilerVersion,
    #[serde(default)]
    pub std: Option<crate::core::standard::CxxStandard>,
}

impl PlatformSpec {
    /// Create a platform triple with no requested standard.
    pub fn new(
        os: OperatingSystem,
        compiler: CompilerFamily,
        version: impl Into<CompilerVersion>,
    ) -> Self {
        PlatformSpec {
            os,
            compiler,
            version: version.into(),
            std: None,
        }
    }

    /// Pin a requested C++ standard.
    pub fn with_std(mut self, std: crate::core::standard::CxxStandard) -> Self {
        self.std = Some(std);
        self
    }
}

impl std::str::FromStr for PlatformSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(os), Some(compiler), Some(version)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!(
                "invalid platform '{}'; expected os:compiler:version (e.g. linux:gcc:9.0)",
                s
            ));
        };

        if version.is_empty() {
            return Err(format!("invalid platform '{}'; version is empty", s));
        }

        Ok(PlatformSpec {
            os: os.parse().map_err(|e: OsParseError| e.to_string())?,
            compiler: compiler
                .parse()
                .map_err(|e: CompilerFamilyParseError| e.to_string())?,
            version: CompilerVersion::new(version),
            std: None,
        })
    }
}

impl std::fmt::Display for PlatformSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.os, self.compiler, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_parse() {
        assert_eq!("linux".parse::<OperatingSystem>().unwrap(), OperatingSystem::Linux);
        assert_eq!("Windows".parse::<OperatingSystem>().unwrap(), OperatingSystem::Windows);
        assert_eq!("osx".parse::<OperatingSystem>().unwrap(), OperatingSystem::Macos);
        assert!("solaris".parse::<OperatingSystem>().is_err());
    }

    #[test]
    fn test_compiler_family_parse() {
        assert_eq!("gcc".parse::<CompilerFamily>().unwrap(), CompilerFamily::Gcc);
        assert_eq!(
            "apple-clang".parse::<CompilerFamily>().unwrap(),
            CompilerFamily::AppleClang
        );
        assert_eq!("cl".parse::<CompilerFamily>().unwrap(), CompilerFamily::Msvc);
        assert!("icc".parse::<CompilerFamily>().is_err());

        let err = "icc".parse::<CompilerFamily>().unwrap_err().to_string();
        assert!(err.contains("valid values"));
    }

    #[test]
    fn test_compiler_version_lenient() {
        let v = CompilerVersion::new("7");
        assert_eq!(v.raw(), "7");
        assert_eq!(v.parsed(), Some(&semver::Version::new(7, 0, 0)));

        let v = CompilerVersion::new("10.2");
        assert_eq!(v.parsed(), Some(&semver::Version::new(10, 2, 0)));
    }

    #[test]
    fn test_compiler_version_unparseable() {
        let v = CompilerVersion::new("trunk");
        assert_eq!(v.raw(), "trunk");
        assert!(v.parsed().is_none());
        assert_eq!(v.to_string(), "trunk");
    }

    #[test]
    fn test_platform_spec_parse() {
        let spec: PlatformSpec = "linux:gcc:9.0".parse().unwrap();
        assert_eq!(spec.os, OperatingSystem::Linux);
        assert_eq!(spec.compiler, CompilerFamily::Gcc);
        assert_eq!(spec.version.raw(), "9.0");
        assert!(spec.std.is_none());

        let spec: PlatformSpec = "windows:msvc:19.2".parse().unwrap();
        assert_eq!(spec.os, OperatingSystem::Windows);
        assert_eq!(spec.compiler, CompilerFamily::Msvc);
    }

    #[test]
    fn test_platform_spec_parse_errors() {
        assert!("linux:gcc".parse::<PlatformSpec>().is_err());
        assert!("linux:gcc:".parse::<PlatformSpec>().is_err());
        assert!("plan9:gcc:9.0".parse::<PlatformSpec>().is_err());
        assert!("linux:icc:9.0".parse::<PlatformSpec>().is_err());
    }

    #[test]
    fn test_platform_spec_display_round_trip() {
        let spec: PlatformSpec = "macos:apple-clang:14.0".parse().unwrap();
        assert_eq!(spec.to_string(), "macos:apple-clang:14.0");
    }
}
