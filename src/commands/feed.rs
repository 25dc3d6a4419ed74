//! Feed command implementation
//!
//! Shows recent entries of the channel, oldest first.

use super::config_builder;
use crate::cli::args::FeedArgs;
use crate::cli::output::print_output;
use crate::cli::Cli;
use crate::error::Result;

/// Execute the feed command
pub async fn run_feed(cli: &Cli, args: &FeedArgs) -> Result<()> {
    let config = config_builder(cli)?.build();
    let client = config.feed.client()?;

    let page = client.fetch_recent(args.results).await?;
    if page.feeds.is_empty() {
        log::info!("Channel {} has no entries yet", client.channel_id());
    }
    print_output(&page, cli.format)?;
    Ok(())
}
