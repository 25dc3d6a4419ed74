//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod check;
pub mod config;
pub mod feed;
pub mod latest;
pub mod rules;
pub mod watch;

pub use check::run_check;
pub use config::run_config;
pub use feed::run_feed;
pub use latest::run_latest;
pub use rules::run_rules;
pub use watch::run_watch;

use crate::cli::Cli;
use crate::config::ConfigBuilder;
use crate::error::Result;

/// Configuration from file, environment and global flags
///
/// Subcommands layer their own overrides on top before building.
pub(crate) fn config_builder(cli: &Cli) -> Result<ConfigBuilder> {
    Ok(ConfigBuilder::new()
        .with_file(cli.config.as_deref())?
        .with_channel(cli.channel.clone())
        .with_api_key(cli.api_key.clone())
        .with_base_url(cli.base_url.clone()))
}
