//! Latest command implementation
//!
//! Shows the most recent entry of the channel.

use super::config_builder;
use crate::cli::output::{print_output, LatestReading};
use crate::cli::Cli;
use crate::error::Result;

/// Execute the latest command
pub async fn run_latest(cli: &Cli) -> Result<()> {
    let config = config_builder(cli)?.build();
    let client = config.feed.client()?;

    let sample = client.fetch_latest().await?;
    print_output(&LatestReading::new(client.channel_id(), sample), cli.format)?;
    Ok(())
}
