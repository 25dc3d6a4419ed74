//! Rules command implementation

use super::config_builder;
use crate::cli::output::{print_output, RuleList};
use crate::cli::Cli;
use crate::error::Result;

/// Execute the rules command
pub fn run_rules(cli: &Cli) -> Result<()> {
    let config = config_builder(cli)?.build();
    let rules = config.threshold_rules()?;
    print_output(&RuleList { rules }, cli.format)?;
    Ok(())
}
