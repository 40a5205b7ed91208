//! Lenient semver parsing for compiler and tool versions.

use semver::Version;

/// Parse a version string, padding missing components with zeroes.
///
/// Toolchains report versions as bare majors ("7"), major.minor pairs
/// ("10.2"), or full triples; anything else is not a version.
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    let s = s.trim();

    if let Ok(v) = Version::parse(s) {
        return Some(v);
    }

    let numbers = s
        .split('.')
        .map(|part| part.parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;

    match numbers[..] {
        [major] => Some(Version::new(major, 0, 0)),
        [major, minor] => Some(Version::new(major, minor, 0)),
        _ => None,
    }
}
