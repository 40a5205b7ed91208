//! C++ standard levels and the set of levels a recipe accepts.

use serde::{Deserialize, Serialize};

/// A C++ standard level, with or without GNU extensions.
///
/// Tokens follow the usual settings convention: `17` is strict ISO C++17,
/// `gnu17` is C++17 plus GNU extensions. Variant order is year-major so the
/// derived `Ord` sorts `98 < gnu98 < 11 < ... < gnu23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CxxStandard {
    #[serde(rename = "98", alias = "c++98")]
    Cxx98,
    #[serde(rename = "gnu98", alias = "gnu++98")]
    Gnu98,
    #[serde(rename = "11", alias = "c++11")]
    Cxx11,
    #[serde(rename = "gnu11", alias = "gnu++11")]
    Gnu11,
    #[serde(rename = "14", alias = "c++14")]
    Cxx14,
    #[serde(rename = "gnu14", alias = "gnu++14")]
    Gnu14,
    #[serde(rename = "17", alias = "c++17")]
    Cxx17,
    #[serde(rename = "gnu17", alias = "gnu++17")]
    Gnu17,
    #[serde(rename = "20", alias = "c++20")]
    Cxx20,
    #[serde(rename = "gnu20", alias = "gnu++20")]
    Gnu20,
    #[serde(rename = "23", alias = "c++23")]
    Cxx23,
    #[serde(rename = "gnu23", alias = "gnu++23")]
    Gnu23,
}

impl CxxStandard {
    /// The standard's year digits, as CMake's `CMAKE_CXX_STANDARD` wants them.
    pub fn year(&self) -> &'static str {
        match self {
            CxxStandard::Cxx98 | CxxStandard::Gnu98 => "98",
            CxxStandard::Cxx11 | CxxStandard::Gnu11 => "11",
            CxxStandard::Cxx14 | CxxStandard::Gnu14 => "14",
            CxxStandard::Cxx17 | CxxStandard::Gnu17 => "17",
            CxxStandard::Cxx20 | CxxStandard::Gnu20 => "20",
            CxxStandard::Cxx23 | CxxStandard::Gnu23 => "23",
        }
    }

    /// Whether GNU extensions are enabled.
    pub fn gnu_extensions(&self) -> bool {
        matches!(
            self,
            CxxStandard::Gnu98
                | CxxStandard::Gnu11
                | CxxStandard::Gnu14
                | CxxStandard::Gnu17
                | CxxStandard::Gnu20
                | CxxStandard::Gnu23
        )
    }

    /// The canonical settings token, e.g. `17` or `gnu17`.
    pub fn as_str(&self) -> &'static str {
        match self {
            CxxStandard::Cxx98 => "98",
            CxxStandard::Gnu98 => "gnu98",
            CxxStandard::Cxx11 => "11",
            CxxStandard::Gnu11 => "gnu11",
            CxxStandard::Cxx14 => "14",
            CxxStandard::Gnu14 => "gnu14",
            CxxStandard::Cxx17 => "17",
            CxxStandard::Gnu17 => "gnu17",
            CxxStandard::Cxx20 => "20",
            CxxStandard::Gnu20 => "gnu20",
            CxxStandard::Cxx23 => "23",
            CxxStandard::Gnu23 => "gnu23",
        }
    }
}

impl std::fmt::Display for CxxStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CxxStandard {
    type Err = CxxStandardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "98" | "c++98" => Ok(CxxStandard::Cxx98),
            "gnu98" | "gnu++98" => Ok(CxxStandard::Gnu98),
            "11" | "c++11" => Ok(CxxStandard::Cxx11),
            "gnu11" | "gnu++11" => Ok(CxxStandard::Gnu11),
            "14" | "c++14" => Ok(CxxStandard::Cxx14),
            "gnu14" | "gnu++14" => Ok(CxxStandard::Gnu14),
            "17" | "c++17" => Ok(CxxStandard::Cxx17),
            "gnu17" | "gnu++17" => Ok(CxxStandard::Gnu17),
            "20" | "c++20" => Ok(CxxStandard::Cxx20),
            "gnu20" | "gnu++20" => Ok(CxxStandard::Gnu20),
            "23" | "c++23" => Ok(CxxStandard::Cxx23),
            "gnu23" | "gnu++23" => Ok(CxxStandard::Gnu23),
            _ => Err(CxxStandardParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid C++ standard token.
#[derive(Debug, Clone)]
pub struct CxxStandardParseError(pub String);

impl std::fmt::Display for CxxStandardParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid C++ standard '{}', valid values: 98, gnu98, 11, gnu11, 14, gnu14, 17, gnu17, 20, gnu20, 23, gnu23",
            self.0
        )
    }
}

impl std::error::Error for CxxStandardParseError {}

/// An ordered, duplicate-free set of accepted C++ standards.
///
/// Order is the recipe's declaration order; it is preserved so rejection
/// messages list the alternatives the way the recipe author wrote them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardSet {
    standards: Vec<CxxStandard>,
}

impl StandardSet {
    /// Build a set from declaration order, dropping duplicates.
    pub fn new(standards: impl IntoIterator<Item = CxxStandard>) -> Self {
        let mut seen = Vec::new();
        for std in standards {
            if !seen.contains(&std) {
                seen.push(std);
            }
        }
        StandardSet { standards: seen }
    }

    pub fn contains(&self, std: CxxStandard) -> bool {
        self.standards.contains(&std)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CxxStandard> {
        self.standards.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.standards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.standards.len()
    }
}

impl std::fmt::Display for StandardSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tokens: Vec<&str> = self.standards.iter().map(|s| s.as_str()).collect();
        write!(f, "{}", tokens.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_parse() {
        assert_eq!("17".parse::<CxxStandard>().unwrap(), CxxStandard::Cxx17);
        assert_eq!("gnu17".parse::<CxxStandard>().unwrap(), CxxStandard::Gnu17);
        assert_eq!("c++20".parse::<CxxStandard>().unwrap(), CxxStandard::Cxx20);
        assert!("26".parse::<CxxStandard>().is_err());
        assert!("seventeen".parse::<CxxStandard>().is_err());
    }

    #[test]
    fn test_standard_year_and_extensions() {
        assert_eq!(CxxStandard::Cxx17.year(), "17");
        assert_eq!(CxxStandard::Gnu17.year(), "17");
        assert!(!CxxStandard::Cxx17.gnu_extensions());
        assert!(CxxStandard::Gnu17.gnu_extensions());
        assert_eq!(CxxStandard::Gnu20.as_str(), "gnu20");
    }

    #[test]
    fn test_standard_order_is_year_major() {
        assert!(CxxStandard::Cxx98 < CxxStandard::Gnu98);
        assert!(CxxStandard::Gnu98 < CxxStandard::Cxx11);
        assert!(CxxStandard::Cxx17 < CxxStandard::Gnu20);
        assert!(CxxStandard::Gnu20 < CxxStandard::Cxx23);
    }

    #[test]
    fn test_standard_set_dedups_preserving_order() {
        let set = StandardSet::new([
            CxxStandard::Gnu17,
            CxxStandard::Cxx17,
            CxxStandard::Gnu17,
            CxxStandard::Cxx20,
        ]);
        assert_eq!(set.len(), 3);
        assert!(set.contains(CxxStandard::Cxx17));
        assert!(!set.contains(CxxStandard::Cxx14));
        assert_eq!(set.to_string(), "gnu17, 17, 20");
    }
}
