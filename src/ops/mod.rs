//! High-level operations.
//!
//! This module contains the implementation of Slipway commands.

pub mod check;
pub mod expand;
pub mod run;

pub use check::{check_environment, CheckOptions};
pub use expand::{expand_matrix, job_event, load_platforms, MatrixSummary};
pub use run::{run_matrix, JobStatus, RunOptions, RunReport};
