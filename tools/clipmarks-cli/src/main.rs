//! Clipmarks CLI: inspect, validate, and retime marker files.
//!
//! Usage:
//!   clipmarks info <FILE>                     Show settings and marker pairs
//!   clipmarks validate <FILE>                 Check pairs and speed maps
//!   clipmarks durations <FILE> [--fps N]      Compute exact output durations
//!   clipmarks sample <FILE> --pair N --time T Sample a pair's speed map
//!   clipmarks merge <FILE> [--list LIST]      Expand and time a merge list

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clipmarks_common::logging::init_logging;
use clipmarks_common::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "clipmarks",
    about = "Frame-accurate timing for variable-speed video clips",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the settings and marker pairs of a markers file
    Info {
        /// Path to the markers JSON file
        file: PathBuf,
    },

    /// Check that every marker pair and speed map is well formed
    Validate {
        /// Path to the markers JSON file
        file: PathBuf,
    },

    /// Compute the exact output duration of every marker pair
    Durations {
        /// Path to the markers JSON file
        file: PathBuf,

        /// Video frame rate (defaults to the configured frame rate)
        #[arg(long)]
        fps: Option<f64>,

        /// Print the per-segment breakdown
        #[arg(long)]
        breakdown: bool,

        /// Store the computed durations back into the file
        #[arg(long)]
        write: bool,
    },

    /// Sample the playback speed of a marker pair at a source time
    Sample {
        /// Path to the markers JSON file
        file: PathBuf,

        /// Marker pair number (1-based)
        #[arg(short, long)]
        pair: usize,

        /// Source time in seconds
        #[arg(short, long)]
        time: f64,

        /// Easing between speed points: linear or cubicInOut
        #[arg(long)]
        easing: Option<String>,

        /// Round the sampled speed to this multiple (0 disables)
        #[arg(long)]
        round: Option<f64>,
    },

    /// Expand a merge list and estimate each merged clip's duration
    Merge {
        /// Path to the markers JSON file
        file: PathBuf,

        /// Merge list to use instead of the one stored in the file
        #[arg(short, long)]
        list: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::try_load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::load(),
    };
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    init_logging(&logging);

    match cli.command {
        Commands::Info { file } => commands::info::run(file, &config),
        Commands::Validate { file } => commands::validate::run(file, &config),
        Commands::Durations {
            file,
            fps,
            breakdown,
            write,
        } => commands::durations::run(file, fps.unwrap_or(config.default_fps), breakdown, write),
        Commands::Sample {
            file,
            pair,
            time,
            easing,
            round,
        } => commands::sample::run(file, pair, time, easing, round, &config),
        Commands::Merge { file, list } => commands::merge::run(file, list),
    }
}
