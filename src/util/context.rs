//! Per-invocation context: where the command runs and where slipway keeps
//! its user-wide files.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::core::recipe::RECIPE_FILE_NAME;
use crate::util::config;
use crate::util::diagnostic::suggestions;

#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Directory the command was invoked from.
    cwd: PathBuf,

    /// User-wide slipway directory, normally `~/.slipway`.
    home: PathBuf,
}

impl GlobalContext {
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to resolve the working directory")?;
        let home = config::global_config_dir().unwrap_or_else(|| PathBuf::from(".slipway"));

        Ok(GlobalContext { cwd, home })
    }

    /// Same as [`new`](Self::new) but rooted at an explicit directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Path of the user-wide config file.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Locate `Slipway.toml` in the working directory or the nearest parent
    /// that has one.
    pub fn find_recipe(&self) -> Result<PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(RECIPE_FILE_NAME))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                anyhow!(
                    "no {} found in `{}` or any parent directory\n{}",
                    RECIPE_FILE_NAME,
                    self.cwd.display(),
                    suggestions::NO_RECIPE
                )
            })
    }
}
