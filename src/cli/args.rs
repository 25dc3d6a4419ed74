//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Telemetry feed watcher with threshold alerts
///
/// Polls a ThingSpeak-compatible channel, alerts when readings cross
/// configured thresholds, and prints recent readings.
#[derive(Parser, Debug)]
#[command(name = "sensorwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SENSORWATCH_CONFIG")]
    pub config: Option<String>,

    /// Feed channel id
    #[arg(long, global = true, env = "SENSORWATCH_CHANNEL")]
    pub channel: Option<String>,

    /// Read API key for private channels
    #[arg(long, global = true, env = "SENSORWATCH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Feed service base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the feed and raise alerts until interrupted
    Watch(WatchArgs),

    /// Show the latest reading
    Latest,

    /// Show recent readings
    Feed(FeedArgs),

    /// Evaluate the rules once against the latest reading
    Check,

    /// List configured alert rules
    Rules,

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the watch command
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Seconds between polls
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=86_400))]
    pub interval: Option<u64>,

    /// Seconds a channel stays quiet after an alert
    #[arg(long)]
    pub cooldown: Option<u64>,

    /// Notifications kept in history
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=10_000))]
    pub max_history: Option<u64>,
}

/// Arguments for the feed command
#[derive(Parser, Debug)]
pub struct FeedArgs {
    /// Number of entries to fetch
    #[arg(short = 'n', long, default_value = "20", value_parser = clap::value_parser!(u32).range(1..=8000))]
    pub results: u32,
}

/// Arguments for configuration commands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Destination (defaults to the per-user config path)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
