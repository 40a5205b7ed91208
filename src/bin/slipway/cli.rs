//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use slipway::core::options::parse_assignment;
use slipway::core::{CxxStandard, OptionValue, PlatformSpec};

/// Slipway - validate and build CMake package matrices
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub globals: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress status output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to the recipe (defaults to Slipway.toml, searched upward)
    #[arg(long, global = true, value_name = "PATH")]
    pub recipe: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check one environment against the recipe
    Check(CheckArgs),

    /// Resolve one environment to its build configuration
    Resolve(ResolveArgs),

    /// Expand the build matrix and report every environment's verdict
    Matrix(MatrixArgs),

    /// Build every accepted environment in the matrix
    Build(BuildArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct CheckArgs {
    /// Target platform as os:compiler:version
    #[arg(long, value_name = "SPEC", required_unless_present = "host")]
    pub platform: Option<PlatformSpec>,

    /// Probe the host toolchain instead of naming a platform
    #[arg(long, conflicts_with = "platform")]
    pub host: bool,

    /// Requested C++ standard (e.g. 17, gnu17)
    #[arg(long = "std", value_name = "STD")]
    pub std: Option<CxxStandard>,

    /// Set a package option, e.g. -o shared=true (repeatable)
    #[arg(
        short = 'o',
        long = "option",
        value_name = "NAME=VALUE",
        value_parser = parse_assignment
    )]
    pub options: Vec<(String, OptionValue)>,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Target platform as os:compiler:version
    #[arg(long, value_name = "SPEC", required_unless_present = "host")]
    pub platform: Option<PlatformSpec>,

    /// Probe the host toolchain instead of naming a platform
    #[arg(long, conflicts_with = "platform")]
    pub host: bool,

    /// Requested C++ standard (e.g. 17, gnu17)
    #[arg(long = "std", value_name = "STD")]
    pub std: Option<CxxStandard>,

    /// Set a package option, e.g. -o shared=true (repeatable)
    #[arg(
        short = 'o',
        long = "option",
        value_name = "NAME=VALUE",
        value_parser = parse_assignment
    )]
    pub options: Vec<(String, OptionValue)>,

    /// Output format
    #[arg(long, value_enum, value_name = "FORMAT", default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct MatrixArgs {
    /// Target platform as os:compiler:version (repeatable)
    #[arg(long = "platform", value_name = "SPEC")]
    pub platforms: Vec<PlatformSpec>,

    /// TOML file listing target platforms
    #[arg(long, value_name = "PATH")]
    pub platforms_file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, value_name = "FORMAT", default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Target platform as os:compiler:version (repeatable)
    #[arg(long = "platform", value_name = "SPEC")]
    pub platforms: Vec<PlatformSpec>,

    /// TOML file listing target platforms
    #[arg(long, value_name = "PATH")]
    pub platforms_file: Option<PathBuf>,

    /// Number of environments built in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Keep building remaining environments after a failure
    #[arg(long)]
    pub keep_going: bool,

    /// Print driver commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// CMake generator passed through to the driver
    #[arg(long, value_name = "NAME")]
    pub generator: Option<String>,

    /// Output format
    #[arg(long, value_enum, value_name = "FORMAT", default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

/// Output format for commands that can emit machine-readable data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Human,
    /// One JSON object per line
    Json,
}
