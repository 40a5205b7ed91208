//! Command implementations.

pub mod build;
pub mod check;
pub mod completions;
pub mod matrix;
pub mod resolve;

use std::path::Path;

use anyhow::{bail, Result};

use slipway::core::PlatformSpec;
use slipway::ops;
use slipway::util::diagnostic::suggestions;

/// Gather target platforms from repeated `--platform` flags and an optional
/// platforms file. Flag order is preserved, file entries follow.
fn collect_platforms(flags: &[PlatformSpec], file: Option<&Path>) -> Result<Vec<PlatformSpec>> {
    let mut platforms = flags.to_vec();

    if let Some(path) = file {
        platforms.extend(ops::load_platforms(path)?);
    }

    if platforms.is_empty() {
        bail!("no platforms given\n{}", suggestions::NO_PLATFORMS);
    }

    Ok(platforms)
}
