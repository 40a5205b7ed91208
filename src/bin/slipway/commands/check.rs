//! Implementation of `slipway check`.

use anyhow::{bail, Result};

use slipway::matrix::Verdict;
use slipway::ops::{self, CheckOptions};
use slipway::util::diagnostic::suggestions;
use slipway::util::shell::{ColorChoice, Shell, Status};
use slipway::{GlobalContext, OutputLayout, Recipe};

use crate::cli::{CheckArgs, GlobalArgs};

pub fn execute(args: CheckArgs, globals: &GlobalArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let recipe_path = match &globals.recipe {
        Some(path) => path.clone(),
        None => ctx.find_recipe()?,
    };
    let recipe = Recipe::load(&recipe_path)?;
    let layout = OutputLayout::new(recipe.root());

    let color = if globals.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let shell = Shell::from_flags(globals.quiet, globals.verbose, color, false);

    let opts = CheckOptions {
        platform: args.platform,
        host: args.host,
        standard: args.std,
        options: args.options,
    };

    let job = ops::check_environment(&recipe, &layout, &opts)?;
    match job.verdict() {
        Verdict::Accepted(_) => {
            shell.status(Status::Finished, format!("{} is compatible", job.label()));
            Ok(())
        }
        Verdict::Rejected(cause) => bail!(
            "environment {} rejected: {}\n{}",
            job.label(),
            cause,
            suggestions::REJECTED_ENV
        ),
        Verdict::Failed(cause) => bail!("{}: {}", job.label(), cause),
    }
}
