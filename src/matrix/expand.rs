//! Build-matrix expansion: platforms crossed with option axes.

use std::collections::HashSet;

use crate::core::environment::TargetEnvironment;
use crate::core::options::{OptionAxis, OptionSet};
use crate::core::platform::PlatformSpec;
use crate::core::recipe::Recipe;
use crate::core::resolved::{BuildConfiguration, OutputLayout};
use crate::matrix::resolve::{ConfigurationResolver, ResolutionError};
use crate::matrix::validate::{CompatibilityValidator, Incompatibility};

/// The outcome of evaluating one environment.
#[derive(Debug, Clone)]
pub enum Verdict {
    /// The environment is compatible and resolved to a build plan.
    Accepted(BuildConfiguration),
    /// The environment cannot build this package.
    Rejected(Incompatibility),
    /// The environment passed validation but could not be lowered.
    Failed(ResolutionError),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }
}

/// One cell of the expanded build matrix, with its verdict.
#[derive(Debug, Clone)]
pub struct BuildJob {
    environment: TargetEnvironment,
    verdict: Verdict,
}

impl BuildJob {
    pub fn environment(&self) -> &TargetEnvironment {
        &self.environment
    }

    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// The environment's stable label.
    pub fn label(&self) -> String {
        self.environment.label()
    }
}

/// Validate and resolve one environment into a job.
///
/// Validation runs first; only compatible environments are lowered.
pub fn evaluate_environment(
    recipe: &Recipe,
    layout: &OutputLayout,
    env: TargetEnvironment,
) -> BuildJob {
    if let Err(why) = CompatibilityValidator::new(recipe).validate(&env) {
        return BuildJob {
            environment: env,
            verdict: Verdict::Rejected(why),
        };
    }

    let verdict = match ConfigurationResolver::new(recipe, layout).resolve(&env) {
        Ok(config) => Verdict::Accepted(config),
        Err(e) => Verdict::Failed(e),
    };
    BuildJob {
        environment: env,
        verdict,
    }
}

/// Expands platform triples into the full build matrix.
pub struct MatrixExpander<'a> {
    recipe: &'a Recipe,
    layout: &'a OutputLayout,
}

impl<'a> MatrixExpander<'a> {
    /// Create a new expander for a recipe and output layout.
    pub fn new(recipe: &'a Recipe, layout: &'a OutputLayout) -> Self {
        MatrixExpander { recipe, layout }
    }

    /// Expand platforms into one job per matrix cell.
    ///
    /// Jobs come out platform-major: every option combination of the first
    /// platform precedes any of the second. Within a platform the axes
    /// cross in declaration order with the first axis varying slowest.
    /// Axes absent on a platform's operating system are dropped before
    /// the product, so the matrix shrinks there instead of repeating
    /// equivalent cells. Incompatible environments still produce jobs,
    /// carrying a [`Verdict::Rejected`].
    pub fn expand(&self, platforms: &[PlatformSpec]) -> Vec<BuildJob> {
        let mut jobs = Vec::new();
        let mut seen = HashSet::new();

        for spec in platforms {
            let axes: Vec<&OptionAxis> = self.recipe.axes_for(spec.os).collect();
            let mut assignment = OptionSet::new();
            self.combine(spec, &axes, &mut assignment, &mut seen, &mut jobs);
        }

        tracing::debug!(
            platforms = platforms.len(),
            jobs = jobs.len(),
            "expanded build matrix"
        );
        jobs
    }

    fn combine(
        &self,
        spec: &PlatformSpec,
        axes: &[&OptionAxis],
        assignment: &mut OptionSet,
        seen: &mut HashSet<String>,
        jobs: &mut Vec<BuildJob>,
    ) {
        let Some((axis, rest)) = axes.split_first() else {
            let env = TargetEnvironment::new(spec.os, spec.compiler, spec.version.clone())
                .with_standard(spec.std)
                .with_options(assignment.clone());
            if seen.insert(env.label()) {
                jobs.push(evaluate_environment(self.recipe, self.layout, env));
            }
            return;
        };

        for value in &axis.values {
            assignment.insert(axis.name.clone(), value.clone());
            self.combine(spec, rest, assignment, seen, jobs);
        }
        assignment.remove(&axis.name);
    }
}
