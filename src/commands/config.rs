//! Config command implementation
//!
//! Shows the effective configuration or writes a default file.

use super::config_builder;
use crate::cli::args::{ConfigCommands, OutputFormat};
use crate::cli::Cli;
use crate::config::{Config, ConfigFile};
use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};

/// Execute config commands
pub fn run_config(cli: &Cli, command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show_config(cli),
        ConfigCommands::Init { path, force } => {
            let path = path.clone().unwrap_or_else(ConfigFile::default_path);
            init_config(&path, *force)?;
            println!("Wrote default configuration to {}", path.display());
            Ok(())
        }
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let mut config = config_builder(cli)?.build();
    if config.feed.api_key.is_some() {
        config.feed.api_key = Some("********".to_string());
    }

    match cli.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&config).map_err(ConfigError::from)?;
            println!("{}", json);
        }
        OutputFormat::Table | OutputFormat::Compact => {
            let toml = toml::to_string_pretty(&config)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            print!("{}", toml);
        }
    }
    Ok(())
}

/// Write the default configuration to `path`
///
/// Refuses to replace an existing file unless `force` is set.
pub fn init_config(path: &Path, force: bool) -> Result<PathBuf> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            key: "path".to_string(),
            message: format!("{} already exists (use --force to overwrite)", path.display()),
        }
        .into());
    }

    ConfigFile::save(&Config::default(), path)?;
    log::info!("Saved default configuration to {}", path.display());
    Ok(path.to_path_buf())
}
