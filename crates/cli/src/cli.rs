//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Race Telemetry - lap, sector and incident analysis for recorded car telemetry
#[derive(Parser, Debug)]
#[command(
    name = "race-telemetry",
    author,
    version,
    about = "Race telemetry reconstruction and analysis",
    long_about = "Reconstructs car trajectories from speed and acceleration telemetry.\n\n\
                  Detects laps, fuses a shared master track, times laps and sectors, \n\
                  and reports crashes, collisions and overtakes."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "RACE_TELEMETRY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "RACE_TELEMETRY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a telemetry bundle
    Analyze(AnalyzeArgs),

    /// Validate configuration file without analyzing
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Arguments for the `analyze` command
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Telemetry bundle (JSON: `{ "cars": [ { "id", "samples" } ] }`)
    #[arg(env = "RACE_TELEMETRY_INPUT")]
    pub telemetry: PathBuf,

    /// Engine configuration file (TOML or JSON); defaults apply when absent
    #[arg(short, long, env = "RACE_TELEMETRY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Persisted master track (`{ "master": [...] }`) used instead of fusion
    #[arg(long, env = "RACE_TELEMETRY_MASTER_TRACK")]
    pub master_track: Option<PathBuf>,

    /// Override the inferred race type
    #[arg(long, value_enum)]
    pub race_type: Option<RaceTypeArg>,

    /// Override the number of sectors per lap
    #[arg(long)]
    pub sectors: Option<usize>,

    /// Car whose speed colors the master track
    #[arg(long)]
    pub reference_car: Option<String>,

    /// List every detected event
    #[arg(long)]
    pub events: bool,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "RACE_TELEMETRY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "race.toml", env = "RACE_TELEMETRY_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; built-in defaults when absent
    #[arg(short, long, env = "RACE_TELEMETRY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON instead of TOML
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

/// Race type as accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaceTypeArg {
    /// Closed circuit, multiple laps
    #[value(alias = "circuit")]
    Lapped,
    /// Point to point
    Sprint,
}

impl From<RaceTypeArg> for contracts::RaceType {
    fn from(arg: RaceTypeArg) -> Self {
        match arg {
            RaceTypeArg::Lapped => contracts::RaceType::Lapped,
            RaceTypeArg::Sprint => contracts::RaceType::Sprint,
        }
    }
}
