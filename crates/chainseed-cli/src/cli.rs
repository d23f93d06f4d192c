use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "chainseed - overlap-free initial configurations of points and self-avoiding chains in a periodic cubic box.",
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
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate one or more overlap-free configurations from a TOML system description.
    Generate(GenerateArgs),
    /// Check an extended XYZ configuration for overlaps and broken bonds.
    Check(CheckArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the system description in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Path for the output extended XYZ file.
    /// With several replicas, `_<n>` is appended to the file stem.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Seed for the random number generator. A random seed is drawn and logged if omitted.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Number of independent configurations to generate, each from its own random stream.
    #[arg(short = 'n', long, value_name = "INT")]
    pub replicas: Option<usize>,

    // --- Geometry Overrides ---
    /// Override the box edge length from the config file.
    #[arg(short = 'L', long, value_name = "FLOAT")]
    pub box_length: Option<f64>,

    /// Override the minimum distance between any two sites.
    #[arg(short = 'r', long, value_name = "FLOAT")]
    pub rmin: Option<f64>,

    /// Override the attempt budget used for every placement and chain restart.
    #[arg(long, value_name = "INT")]
    pub max_attempts: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S placement.rmin=0.9
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the extended XYZ configuration to check.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Minimum allowed distance between any two sites.
    #[arg(short = 'r', long, required = true, value_name = "FLOAT")]
    pub rmin: f64,

    /// Absolute tolerance on distances, relative tolerance on bond lengths.
    #[arg(long, value_name = "FLOAT", default_value_t = 1e-9)]
    pub tolerance: f64,

    /// Maximum number of violations to print.
    #[arg(long, value_name = "INT", default_value_t = 20)]
    pub max_report: usize,
}
