//! Layered tool configuration.
//!
//! Two locations feed one [`Config`]: the user-wide file at
//! `~/.slipway/config.toml` and the per-project file at
//! `.slipway/config.toml` next to the recipe. Project values win. A missing
//! or malformed file never stops a command; it only costs a warning.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tool settings that are not part of any recipe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub build: BuildConfig,
    pub driver: DriverConfig,
}

/// `[build]` section: matrix-run defaults the CLI flags can override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Parallel matrix jobs; None lets rayon size the pool.
    pub jobs: Option<usize>,

    /// Keep building remaining environments after one fails.
    pub keep_going: bool,
}

/// `[driver]` section: where cmake lives and how it is invoked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Explicit cmake binary; None means `$CMAKE` then PATH.
    pub cmake: Option<PathBuf>,

    /// CMake generator, e.g. "Ninja".
    pub generator: Option<String>,

    /// CMake build type; the driver defaults to Release.
    pub build_type: Option<String>,
}

impl Config {
    /// Read and parse one config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        toml::from_str(&contents).with_context(|| format!("invalid config at {}", path.display()))
    }

    /// Read one config file, treating an absent or malformed file as empty.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.is_file() {
            return Config::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring config at {}: {:#}", path.display(), e);
                Config::default()
            }
        }
    }

    /// Apply `over` on top of this config. Fields set in `over` win.
    pub fn overlay(self, over: Config) -> Config {
        Config {
            build: BuildConfig {
                jobs: over.build.jobs.or(self.build.jobs),
                keep_going: self.build.keep_going || over.build.keep_going,
            },
            driver: DriverConfig {
                cmake: over.driver.cmake.or(self.driver.cmake),
                generator: over.driver.generator.or(self.driver.generator),
                build_type: over.driver.build_type.or(self.driver.build_type),
            },
        }
    }
}

/// The merged configuration for one invocation: defaults, then the global
/// file, then the project file.
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    Config::load_or_default(global_path).overlay(Config::load_or_default(project_path))
}

/// The user-wide slipway directory (`~/.slipway`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".slipway"))
}

/// The per-project config file under a recipe root.
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".slipway").join("config.toml")
}
