//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must exist. Without one, the default locations are
    /// searched and defaults are kept if none is found.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default(),
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override with CLI feed channel
    pub fn with_channel(mut self, channel_id: Option<String>) -> Self {
        if let Some(id) = channel_id {
            self.config.feed.channel_id = id;
        }
        self
    }

    /// Override with CLI/env read key
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key {
            self.config.feed.api_key = Some(key);
        }
        self
    }

    /// Override with CLI base URL
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.config.feed.base_url = url;
        }
        self
    }

    /// Override with CLI poll interval
    pub fn with_interval(mut self, seconds: Option<u64>) -> Self {
        if let Some(s) = seconds {
            self.config.polling.interval_seconds = s;
        }
        self
    }

    /// Override with CLI cooldown
    pub fn with_cooldown(mut self, seconds: Option<u64>) -> Self {
        if let Some(s) = seconds {
            self.config.polling.cooldown_seconds = s;
        }
        self
    }

    /// Override with CLI history size
    pub fn with_max_history(mut self, max: Option<usize>) -> Self {
        if let Some(m) = max {
            self.config.polling.max_history = m;
        }
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
