//! Terminal output for slipway commands.
//!
//! Every command routes user-facing output through one [`Shell`]: status
//! verbs on stderr, machine-readable rows on stdout. The streams never mix,
//! so `--format json` output stays parseable line by line.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

/// Column the status verb is right-aligned into.
const VERB_WIDTH: usize = 12;

const RESET: &str = "\x1b[0m";

/// How much human output to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// `--quiet`: errors only.
    Quiet,
    #[default]
    Normal,
    /// `--verbose`: every status line immediately, no progress bar.
    Verbose,
}

/// When to emit ANSI colors on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Color when stderr is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

/// Verbs the shell prints at the left margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Finished,
    Expanding,
    Validating,
    Resolving,
    Configuring,
    Building,
    Installing,
    Info,
    Skipped,
    Warning,
    Error,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Status::Finished => "Finished",
            Status::Expanding => "Expanding",
            Status::Validating => "Validating",
            Status::Resolving => "Resolving",
            Status::Configuring => "Configuring",
            Status::Building => "Building",
            Status::Installing => "Installing",
            Status::Info => "Info",
            Status::Skipped => "Skipped",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    /// Bold ANSI color for the verb: green for done, cyan for in-progress,
    /// blue for notes, yellow for warnings, red for errors.
    fn tint(self) -> &'static str {
        use Status::*;
        match self {
            Finished => "\x1b[1;32m",
            Expanding | Validating | Resolving | Configuring | Building | Installing => {
                "\x1b[1;36m"
            }
            Info => "\x1b[1;34m",
            Skipped | Warning => "\x1b[1;33m",
            Error => "\x1b[1;31m",
        }
    }
}

/// Sink for all command output.
///
/// Holds the resolved output flags once so call sites never re-check them:
/// [`Shell::status`] and friends write human lines to stderr,
/// [`Shell::json_event`] writes rows to stdout, and each is a no-op in the
/// other mode.
#[derive(Debug)]
pub struct Shell {
    verbosity: Verbosity,
    json: bool,
    colored: bool,
}

impl Shell {
    /// Build a shell from the global CLI flags. `json` wins over the human
    /// verbosity flags and never colors.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice, json: bool) -> Self {
        let verbosity = match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (_, true) => Verbosity::Verbose,
            _ => Verbosity::Normal,
        };

        let colored = !json
            && match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            };

        Shell {
            verbosity,
            json,
            colored,
        }
    }

    pub fn is_quiet(&self) -> bool {
        !self.json && self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        !self.json && self.verbosity == Verbosity::Verbose
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn use_color(&self) -> bool {
        self.colored
    }

    /// Print `{verb:>12} {message}` to stderr.
    ///
    /// Quiet mode drops everything but errors. JSON mode drops everything;
    /// rows go through [`Shell::json_event`] instead.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.json || (self.is_quiet() && status != Status::Error) {
            return;
        }

        eprintln!("{} {}", self.format_status(status), msg);
    }

    /// Print an informational line.
    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    /// Print a warning line.
    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Report a failure. Human mode prints an `error` status line; JSON mode
    /// emits a `{"reason":"error"}` row instead.
    pub fn error(&self, msg: impl Display) {
        if self.json {
            self.json_event(&serde_json::json!({
                "reason": "error",
                "message": msg.to_string(),
            }));
        } else {
            self.status(Status::Error, msg);
        }
    }

    /// Write one JSON row to stdout. Human mode drops it.
    pub fn json_event(&self, event: &serde_json::Value) {
        if self.json {
            println!("{}", event);
            let _ = io::stdout().flush();
        }
    }

    /// Right-align the verb and color it when enabled.
    fn format_status(&self, status: Status) -> String {
        let verb = format!("{:>width$}", status.label(), width = VERB_WIDTH);
        if self.colored {
            format!("{}{}{}", status.tint(), verb, RESET)
        } else {
            verb
        }
    }

    /// Progress over `total` units. Normal mode gets a bar, verbose mode raw
    /// counter lines, JSON mode a row per tick, quiet mode nothing.
    pub fn progress(self: &Arc<Self>, total: u64, msg: impl Display) -> Progress {
        Progress::new(Arc::clone(self), total, msg.to_string())
    }
}

/// Matrix-wide progress, backed by indicatif when the mode allows a bar.
pub struct Progress {
    shell: Arc<Shell>,
    bar: Option<ProgressBar>,
    done: u64,
    total: u64,
    message: String,
}

impl Progress {
    fn new(shell: Arc<Shell>, total: u64, message: String) -> Self {
        let wants_bar =
            total > 1 && !shell.is_quiet() && !shell.is_verbose() && !shell.is_json();

        let bar = wants_bar.then(|| {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template("{msg} [{bar:32}] {pos}/{len}")
                    .unwrap()
                    .progress_chars("=> "),
            );
            bar.set_message(message.clone());
            bar
        });

        Progress {
            shell,
            bar,
            done: 0,
            total,
            message,
        }
    }

    /// Advance by `delta` units.
    pub fn inc(&mut self, delta: u64) {
        self.done += delta;

        if let Some(ref bar) = self.bar {
            bar.inc(delta);
        } else if self.shell.is_json() {
            self.shell.json_event(&serde_json::json!({
                "reason": "progress",
                "current": self.done,
                "total": self.total,
                "message": self.message,
            }));
        } else if self.shell.is_verbose() {
            eprintln!("  {} [{}/{}]", self.message, self.done, self.total);
        }
    }

    /// Clear the bar, leaving stderr clean for the closing status line.
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_precedence() {
        let shell = Shell::from_flags(false, false, ColorChoice::Never, false);
        assert!(!shell.is_quiet());
        assert!(!shell.is_verbose());
        assert!(!shell.is_json());

        assert!(Shell::from_flags(true, false, ColorChoice::Never, false).is_quiet());
        assert!(Shell::from_flags(false, true, ColorChoice::Never, false).is_verbose());

        // JSON wins over the human verbosity flags.
        let shell = Shell::from_flags(true, true, ColorChoice::Never, true);
        assert!(shell.is_json());
        assert!(!shell.is_quiet());
        assert!(!shell.is_verbose());
    }

    #[test]
    fn test_json_mode_never_colors() {
        let shell = Shell::from_flags(false, false, ColorChoice::Always, true);
        assert!(!shell.use_color());
    }

    #[test]
    fn test_verb_column() {
        let shell = Shell::from_flags(false, false, ColorChoice::Never, false);

        assert_eq!(shell.format_status(Status::Configuring), " Configuring");

        let line = shell.format_status(Status::Finished);
        assert_eq!(line.len(), VERB_WIDTH);
        assert!(line.ends_with("Finished"));
    }

    #[test]
    fn test_colored_verb_wraps_reset() {
        let shell = Shell::from_flags(false, false, ColorChoice::Always, false);
        let line = shell.format_status(Status::Error);
        assert!(line.starts_with("\x1b[1;31m"));
        assert!(line.ends_with(RESET));
    }
}
