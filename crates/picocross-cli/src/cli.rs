use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The picocross developers",
    version,
    about = "picocross - Doppler-broadened molecular absorption cross-sections from ExoMol line lists.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used by the streaming profile kernel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute a cross-section from a states file and a directory of transitions files.
    Compute(ComputeArgs),
    /// Print the partition function of a states file at one or more temperatures.
    Partition(PartitionArgs),
}

/// Profile evaluation strategy.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum KernelKind {
    /// Materialise the full lines x grid matrix for each chunk.
    Batch,
    /// Accumulate line by line into per-thread buffers.
    Streaming,
    /// Batch for small chunks, streaming above the element limit.
    Auto,
}

/// Arguments for the `compute` subcommand.
#[derive(Args, Debug)]
pub struct ComputeArgs {
    /// Path to the run configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Output CSV path, overriding `output` from the config file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Temperature in kelvin, overriding the config file.
    #[arg(short = 'T', long, value_name = "KELVIN")]
    pub temperature: Option<f64>,

    /// Profile kernel, overriding the config file.
    #[arg(long, value_enum, value_name = "KIND")]
    pub kernel: Option<KernelKind>,

    /// Transition rows read per chunk, overriding the config file.
    #[arg(long, value_name = "ROWS")]
    pub chunk_size: Option<usize>,

    /// Drop transitions whose upper level lies at or below the lower level.
    #[arg(long)]
    pub discard_non_physical: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S grid.points=20001
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `partition` subcommand.
#[derive(Args, Debug)]
pub struct PartitionArgs {
    /// Path to the ExoMol states file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub states: PathBuf,

    /// Temperatures in kelvin. Can be given multiple times.
    #[arg(short = 'T', long = "temperature", required = true, num_args(1..), value_name = "KELVIN")]
    pub temperatures: Vec<f64>,
}
