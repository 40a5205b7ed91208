//! Build options: the axes a recipe declares and the values a job picks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::platform::OperatingSystem;

/// A value an option can take.
///
/// Recipes mostly declare boolean axes (`shared`, `fPIC`), but free-form
/// text values are allowed so axes like `runtime = "static"` work too.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Text(String),
}

impl OptionValue {
    /// Render for a CMake cache definition: booleans become `ON`/`OFF`.
    pub fn as_define_value(&self) -> String {
        match self {
            OptionValue::Bool(true) => "ON".to_string(),
            OptionValue::Bool(false) => "OFF".to_string(),
            OptionValue::Text(s) => s.clone(),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// An option axis declared by a recipe.
///
/// `values` is the closed set of values the axis ranges over, in the order
/// the matrix should try them. `define` names the CMake cache variable the
/// chosen value lowers to; an axis without one participates in the matrix
/// but emits no definition. `absent_on` lists operating systems where the
/// axis does not exist at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionAxis {
    pub name: String,
    pub values: Vec<OptionValue>,
    pub default: OptionValue,
    #[serde(default)]
    pub define: Option<String>,
    #[serde(default)]
    pub absent_on: Vec<OperatingSystem>,
}

impl OptionAxis {
    /// Whether this axis exists on the given operating system.
    pub fn applies_to(&self, os: OperatingSystem) -> bool {
        !self.absent_on.contains(&os)
    }

    /// Whether the value is one the axis ranges over.
    pub fn accepts(&self, value: &OptionValue) -> bool {
        self.values.contains(value)
    }
}

/// The option assignment of one build job, keyed by axis name.
pub type OptionSet = BTreeMap<String, OptionValue>;

/// Parse a `name=value` assignment as given on the command line.
///
/// `true` and `false` become booleans; anything else is text.
pub fn parse_assignment(s: &str) -> Result<(String, OptionValue), String> {
    let Some((name, value)) = s.split_once('=') else {
        return Err(format!("invalid option '{}'; expected name=value", s));
    };
    if name.is_empty() {
        return Err(format!("invalid option '{}'; name is empty", s));
    }
    let value = match value {
        "true" => OptionValue::Bool(true),
        "false" => OptionValue::Bool(false),
        other => OptionValue::Text(other.to_string()),
    };
    Ok((name.to_string(), value))
}
