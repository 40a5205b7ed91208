//! Implementation of `slipway matrix`.

use anyhow::{bail, Result};

use slipway::matrix::Verdict;
use slipway::ops::{self, job_event};
use slipway::util::diagnostic::emit;
use slipway::util::shell::{ColorChoice, Shell, Status};
use slipway::{GlobalContext, OutputLayout, Recipe};

use crate::cli::{GlobalArgs, MatrixArgs, OutputFormat};

pub fn execute(args: MatrixArgs, globals: &GlobalArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let recipe_path = match &globals.recipe {
        Some(path) => path.clone(),
        None => ctx.find_recipe()?,
    };
    let recipe = Recipe::load(&recipe_path)?;
    let layout = OutputLayout::new(recipe.root());

    let platforms = super::collect_platforms(&args.platforms, args.platforms_file.as_deref())?;

    let json = args.format == OutputFormat::Json;
    let color = if globals.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let shell = Shell::from_flags(globals.quiet, globals.verbose, color, json);

    let summary = ops::expand_matrix(&recipe, &layout, &platforms);

    for job in &summary.jobs {
        if json {
            shell.json_event(&job_event(job));
            continue;
        }
        match job.verdict() {
            Verdict::Accepted(_) => println!("accepted  {}", job.label()),
            Verdict::Rejected(cause) => println!("rejected  {}: {}", job.label(), cause),
            Verdict::Failed(cause) => {
                let diag = cause
                    .to_diagnostic()
                    .with_context(format!("while resolving {}", job.label()));
                emit(&diag, shell.use_color());
            }
        }
    }

    if !json {
        shell.status(
            Status::Finished,
            format!(
                "{} accepted, {} rejected of {} environments",
                summary.accepted(),
                summary.rejected(),
                summary.jobs.len()
            ),
        );
    }

    // Rejections are expected screening output; only resolution failures
    // make the command fail.
    if summary.has_failures() {
        bail!("{} environment(s) failed to resolve", summary.failed());
    }

    Ok(())
}
