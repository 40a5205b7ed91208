//! Implementation of `slipway build`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use crate::core::{BuildConfiguration, OutputLayout, PlatformSpec, Recipe};
use crate::driver::{BuildDriver, DriverAvailability};
use crate::matrix::{BuildJob, Verdict};
use crate::ops::expand::{expand_matrix, MatrixSummary};
use crate::util::diagnostic::suggestions;
use crate::util::shell::{Shell, Status};

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Number of environments built in parallel
    pub jobs: Option<usize>,

    /// Keep building remaining environments after a failure
    pub keep_going: bool,

    /// Print the commands without running them
    pub dry_run: bool,
}

/// Outcome of one environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Built and installed
    Built,
    /// Commands printed, nothing run
    Planned,
    /// Screened out or abandoned after an earlier failure
    Skipped,
    /// A driver phase failed
    Failed,
}

/// Per-job outcomes for a whole matrix run, in matrix order.
#[derive(Debug)]
pub struct RunReport {
    pub results: Vec<(String, JobStatus)>,
}

impl RunReport {
    fn collect(summary: &MatrixSummary, mut statuses: HashMap<String, JobStatus>) -> Self {
        let results = summary
            .jobs
            .iter()
            .map(|job| {
                let label = job.label();
                let status = statuses.remove(&label).unwrap_or(JobStatus::Skipped);
                (label, status)
            })
            .collect();
        RunReport { results }
    }

    pub fn built(&self) -> usize {
        self.count(JobStatus::Built)
    }

    pub fn planned(&self) -> usize {
        self.count(JobStatus::Planned)
    }

    pub fn skipped(&self) -> usize {
        self.count(JobStatus::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(JobStatus::Failed)
    }

    pub fn success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, status: JobStatus) -> usize {
        self.results.iter().filter(|(_, s)| *s == status).count()
    }
}

/// Expand the matrix and drive every accepted environment through the
/// configure, build, and install phases.
///
/// Rejected environments are reported and skipped. With `keep_going` unset,
/// a failure stops environments that have not started yet; in-flight ones
/// run to completion.
pub fn run_matrix(
    recipe: &Recipe,
    layout: &OutputLayout,
    platforms: &[PlatformSpec],
    driver: &dyn BuildDriver,
    shell: &Arc<Shell>,
    opts: &RunOptions,
) -> Result<RunReport> {
    let summary = expand_matrix(recipe, layout, platforms);

    let mut statuses: HashMap<String, JobStatus> = HashMap::new();
    let mut queue: Vec<(&BuildJob, &BuildConfiguration)> = Vec::new();

    for job in &summary.jobs {
        match job.verdict() {
            Verdict::Accepted(config) => queue.push((job, config)),
            Verdict::Rejected(cause) => {
                shell.status(Status::Skipped, format!("{} ({})", job.label(), cause));
                statuses.insert(job.label(), JobStatus::Skipped);
            }
            Verdict::Failed(cause) => {
                shell.error(format!("{}: {}", job.label(), cause));
                statuses.insert(job.label(), JobStatus::Failed);
            }
        }
    }

    if queue.is_empty() {
        shell.warn("nothing to build: no environment was accepted");
        return Ok(RunReport::collect(&summary, statuses));
    }

    if opts.dry_run {
        for (job, config) in &queue {
            let build_dir = layout.build_dir(&job.label());
            shell.note(format!("would build {}", job.label()));
            for line in driver.command_lines(config, &build_dir) {
                println!("{}", line);
            }
            statuses.insert(job.label(), JobStatus::Planned);
        }
        return Ok(RunReport::collect(&summary, statuses));
    }

    match driver.availability()? {
        DriverAvailability::Available { version } => {
            tracing::debug!("Using {} {}", driver.name(), version);
        }
        unusable => bail!(
            "{}\n{}",
            unusable.error_message().unwrap_or_default(),
            suggestions::DRIVER_MISSING
        ),
    }

    if let Some(jobs) = opts.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok(); // Ignore if already set
    }

    let progress = Mutex::new(shell.progress(queue.len() as u64, "Building matrix"));
    let stop = AtomicBool::new(false);

    let outcomes: Vec<(String, JobStatus)> = queue
        .par_iter()
        .map(|(job, config)| {
            let label = job.label();

            if stop.load(Ordering::Relaxed) {
                return (label, JobStatus::Skipped);
            }

            match build_one(driver, layout, job, config, shell) {
                Ok(()) => {
                    if let Ok(mut progress) = progress.lock() {
                        progress.inc(1);
                    }
                    (label, JobStatus::Built)
                }
                Err(e) => {
                    shell.error(format!("{}: {:#}", label, e));
                    if !opts.keep_going {
                        stop.store(true, Ordering::Relaxed);
                    }
                    (label, JobStatus::Failed)
                }
            }
        })
        .collect();

    if let Ok(progress) = progress.lock() {
        progress.finish();
    }

    statuses.extend(outcomes);
    Ok(RunReport::collect(&summary, statuses))
}

fn build_one(
    driver: &dyn BuildDriver,
    layout: &OutputLayout,
    job: &BuildJob,
    config: &BuildConfiguration,
    shell: &Arc<Shell>,
) -> Result<()> {
    let label = job.label();
    let build_dir = layout.build_dir(&label);
    std::fs::create_dir_all(&build_dir)
        .with_context(|| format!("failed to create {}", build_dir.display()))?;

    shell.status(Status::Configuring, &label);
    driver.configure(config, &build_dir)?;

    shell.status(Status::Building, &label);
    driver.build(&build_dir)?;

    shell.status(Status::Installing, &label);
    let outcome = driver.install(config, &build_dir)?;

    shell.status(
        Status::Finished,
        format!("{} ({} artifacts)", label, outcome.artifacts.len()),
    );
    shell.json_event(&serde_json::json!({
        "reason": "built",
        "label": label,
        "artifacts": outcome.artifacts.len(),
    }));

    Ok(())
}
