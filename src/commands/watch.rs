//! Watch command implementation
//!
//! Runs the poll scheduler until Ctrl+C, waits briefly for outstanding
//! webhook deliveries, then prints the notifications raised during the
//! session.

use super::config_builder;
use crate::alerts::{drain, Notifier};
use crate::cli::args::WatchArgs;
use crate::cli::output::{print_output, NotificationList};
use crate::cli::Cli;
use crate::error::Result;
use crate::services::{AlertPipeline, PollScheduler};
use std::sync::Arc;
use std::time::Duration;

/// Execute the watch command
pub async fn run_watch(cli: &Cli, args: &WatchArgs) -> Result<()> {
    let config = config_builder(cli)?
        .with_interval(args.interval)
        .with_cooldown(args.cooldown)
        .with_max_history(args.max_history.map(|m| m as usize))
        .build();
    config.validate()?;

    let client = config.feed.client()?;
    let notifier: Arc<dyn Notifier> = Arc::new(config.notify.notifiers()?);
    let pipeline = AlertPipeline::from_config(&config, Arc::new(client), Arc::clone(&notifier))?;

    let mut scheduler = PollScheduler::new(pipeline, config.polling.interval())?;
    let history = scheduler.history();
    let status = scheduler.status();

    scheduler.start()?;
    eprintln!(
        "Watching channel {} every {}s, cooldown {}s. Press Ctrl+C to stop.",
        config.feed.channel_id, config.polling.interval_seconds, config.polling.cooldown_seconds
    );

    tokio::signal::ctrl_c().await?;
    eprintln!();
    scheduler.stop().await?;

    let grace = Duration::from_secs(config.notify.webhook_timeout_seconds.max(1));
    if !drain(notifier.as_ref(), grace).await {
        log::warn!(
            "{} notification(s) still being delivered at exit; they may be lost",
            notifier.pending()
        );
    }

    let summary = status.borrow().clone();
    log::info!(
        "{} cycles, {} failed, {} notifications",
        summary.cycles,
        summary.failed_cycles,
        summary.notifications
    );
    if let Some(err) = &summary.last_error {
        log::warn!("Last poll failed: {}", err);
    }

    print_output(
        &NotificationList {
            notifications: history.snapshot(),
        },
        cli.format,
    )?;
    Ok(())
}
