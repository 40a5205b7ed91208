//! Subprocess plumbing for external tools.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use anyhow::{bail, Context, Result};

/// A command line under construction for an external tool.
///
/// Thin wrapper over [`std::process::Command`] that can also render itself
/// back to a copy-pasteable string for logs and `--dry-run`.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessBuilder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ProcessBuilder {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments.
    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// The argument list so far, lossily decoded.
    pub fn get_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Run to completion with captured output and no stdin.
    pub fn exec(&self) -> Result<Output> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))
    }

    /// Run and turn a nonzero exit into an error carrying the tool's stderr.
    pub fn exec_and_check(&self) -> Result<Output> {
        let output = self.exec()?;
        if output.status.success() {
            return Ok(output);
        }

        bail!(
            "`{}` failed with exit code {:?}\n{}",
            self.display_command(),
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        )
    }

    /// Render the full command line for logs and dry runs.
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Locate a tool on PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Locate the cmake binary on PATH.
pub fn find_cmake() -> Option<PathBuf> {
    find_executable("cmake")
}
