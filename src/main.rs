//! sensorwatch - telemetry feed watcher
//!
//! A command-line tool that polls a sensor channel and raises alerts when
//! readings cross configured thresholds.

use clap::Parser;
use sensorwatch::cli::args::{generate_completions, Cli, Commands};
use sensorwatch::commands::{run_check, run_config, run_feed, run_latest, run_rules, run_watch};
use sensorwatch::error::{AppError, DomainError, FetchError};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    if let Err(e) = run(&cli).await {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), AppError> {
    match &cli.command {
        Commands::Watch(args) => run_watch(cli, args).await,

        Commands::Latest => run_latest(cli).await,

        Commands::Feed(args) => run_feed(cli, args).await,

        Commands::Check => run_check(cli).await,

        Commands::Rules => run_rules(cli),

        Commands::Config(args) => run_config(cli, &args.command),

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Domain(DomainError::EmptyChannelId) => {
            eprintln!();
            eprintln!("Hint: Pass --channel <ID> or set feed.channel_id in the config file.");
            eprintln!("      Run 'sensorwatch config init' to create one.");
        }
        AppError::Fetch(FetchError::NetworkFailure(_)) => {
            eprintln!();
            eprintln!("Hint: Check your network connection and the --base-url setting.");
        }
        AppError::Fetch(FetchError::UpstreamError { status: 401..=404, .. })
        | AppError::Fetch(FetchError::MalformedResponse(_)) => {
            eprintln!();
            eprintln!("Hint: Check the channel id. Private channels need --api-key.");
        }
        _ => {}
    }
}
