//! Implementation of `slipway resolve`.

use anyhow::{bail, Result};

use slipway::matrix::Verdict;
use slipway::ops::{self, CheckOptions};
use slipway::util::diagnostic::suggestions;
use slipway::{BuildConfiguration, GlobalContext, OutputLayout, Recipe};

use crate::cli::{GlobalArgs, OutputFormat, ResolveArgs};

pub fn execute(args: ResolveArgs, globals: &GlobalArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let recipe_path = match &globals.recipe {
        Some(path) => path.clone(),
        None => ctx.find_recipe()?,
    };
    let recipe = Recipe::load(&recipe_path)?;
    let layout = OutputLayout::new(recipe.root());

    let opts = CheckOptions {
        platform: args.platform,
        host: args.host,
        standard: args.std,
        options: args.options,
    };

    let job = ops::check_environment(&recipe, &layout, &opts)?;
    let config = match job.verdict() {
        Verdict::Accepted(config) => config,
        Verdict::Rejected(cause) => bail!(
            "environment {} rejected: {}\n{}",
            job.label(),
            cause,
            suggestions::REJECTED_ENV
        ),
        Verdict::Failed(cause) => bail!("{}: {}", job.label(), cause),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Human => print_configuration(&job.label(), config),
    }

    Ok(())
}

fn print_configuration(label: &str, config: &BuildConfiguration) {
    println!("environment    {}", label);
    println!("package        {} {}", config.package, config.version);
    println!("source dir     {}", config.source_dir.display());
    println!("install prefix {}", config.install_prefix.display());
    println!("license file   {}", config.license_file.display());

    println!("definitions");
    for (key, value) in &config.definitions {
        println!("    {}={}", key, value);
    }

    if config.libraries.is_empty() {
        println!("libraries      (none)");
    } else {
        println!("libraries      {}", config.libraries.join(" "));
    }
}
