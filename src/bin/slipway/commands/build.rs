//! Implementation of `slipway build`.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Result};

use slipway::driver::CMakeDriver;
use slipway::ops::{self, RunOptions};
use slipway::util::config::{load_config, project_config_path};
use slipway::util::shell::{ColorChoice, Shell, Status};
use slipway::{GlobalContext, OutputLayout, Recipe};

use crate::cli::{BuildArgs, GlobalArgs, OutputFormat};

pub fn execute(args: BuildArgs, globals: &GlobalArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let recipe_path = match &globals.recipe {
        Some(path) => path.clone(),
        None => ctx.find_recipe()?,
    };
    let recipe = Recipe::load(&recipe_path)?;
    let layout = OutputLayout::new(recipe.root());

    let platforms = super::collect_platforms(&args.platforms, args.platforms_file.as_deref())?;

    let config = load_config(&ctx.config_path(), &project_config_path(recipe.root()));

    let mut driver = CMakeDriver::discover(&config.driver)?;
    if let Some(generator) = args.generator {
        driver = driver.with_generator(generator);
    }

    let color = if globals.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let json = args.format == OutputFormat::Json;
    let shell = Arc::new(Shell::from_flags(
        globals.quiet,
        globals.verbose,
        color,
        json,
    ));

    // CLI flags take precedence over config file values
    let opts = RunOptions {
        jobs: args.jobs.or(config.build.jobs),
        keep_going: args.keep_going || config.build.keep_going,
        dry_run: args.dry_run,
    };

    let started = Instant::now();
    let report = ops::run_matrix(&recipe, &layout, &platforms, &driver, &shell, &opts)?;

    if args.dry_run {
        return Ok(());
    }

    shell.status(
        Status::Finished,
        format!(
            "{} built, {} skipped, {} failed in {:.2}s",
            report.built(),
            report.skipped(),
            report.failed(),
            started.elapsed().as_secs_f64()
        ),
    );

    if !report.success() {
        bail!("{} environment(s) failed to build", report.failed());
    }

    Ok(())
}
