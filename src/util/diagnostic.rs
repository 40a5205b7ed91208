//! Terminal error blocks.
//!
//! A [`Diagnostic`] is one self-contained failure report: the message, the
//! facts behind it, and numbered ways out. Commands build one and [`emit`]
//! it to stderr instead of scattering eprintln calls.

use std::fmt;

/// Canned help footers appended to common failures.
pub mod suggestions {
    /// Suggestion when no recipe file is found.
    pub const NO_RECIPE: &str =
        "help: Create a Slipway.toml describing the package, or pass --recipe <path>";

    /// Suggestion when no platforms are given.
    pub const NO_PLATFORMS: &str =
        "help: Pass --platform os:compiler:version or --platforms-file <path>";

    /// Suggestion when an environment is rejected.
    pub const REJECTED_ENV: &str = "help: Run `slipway matrix` to see every environment's verdict";

    /// Suggestion when the build driver is unavailable.
    pub const DRIVER_MISSING: &str =
        "help: Install CMake 3.16 or newer and ensure it is on PATH";
}

/// One terminal error block: message, indented context, numbered fixes.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    message: String,
    context: Vec<String>,
    suggestions: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Append a context line shown under the message.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Append a suggested fix to the help footer.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Render for the terminal. `color` bolds the `error` and `help` heads.
    pub fn format(&self, color: bool) -> String {
        use std::fmt::Write;

        let paint = |head: &str, code: &str| -> String {
            if color {
                format!("\x1b[1;{}m{}\x1b[0m", code, head)
            } else {
                head.to_string()
            }
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}: {}", paint("error", "31"), self.message);

        for line in &self.context {
            let _ = writeln!(out, "  → {}", line);
        }

        if !self.suggestions.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}: consider:", paint("help", "32"));
            for (n, fix) in self.suggestions.iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", n + 1, fix);
            }
        }

        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Print a diagnostic block to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
