//! Check command implementation
//!
//! Evaluates the configured rules once against the latest entry without
//! dispatching notifications.

use super::config_builder;
use crate::cli::output::{print_output, CheckReport};
use crate::cli::Cli;
use crate::error::Result;

/// Execute the check command
pub async fn run_check(cli: &Cli) -> Result<()> {
    let config = config_builder(cli)?.build();
    config.validate()?;

    let rules = config.threshold_rules()?;
    let sample = config.feed.client()?.fetch_latest().await?;

    let report = CheckReport::new(&sample, &rules);
    log::debug!("{} of {} rules triggered", report.triggered(), rules.len());
    print_output(&report, cli.format)?;
    Ok(())
}
