//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging.
//! Configuration is read once at startup and immutable afterwards.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::alerts::{self, AlertRuleConfig, NotificationManager, ThresholdRule, MAX_CAPACITY};
use crate::alerts::{LogNotifier, TerminalNotifier, WebhookNotifier};
use crate::error::{DomainError, Result};
use crate::services::MAX_POLL_INTERVAL;
use crate::telemetry::FeedClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public ThingSpeak API
pub const DEFAULT_BASE_URL: &str = "https://api.thingspeak.com";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telemetry feed settings
    pub feed: FeedConfig,
    /// Poll loop settings
    pub polling: PollingConfig,
    /// Notification channel settings
    pub notify: NotifyConfig,
    /// Threshold rules
    pub rules: Vec<AlertRuleConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            polling: PollingConfig::default(),
            notify: NotifyConfig::default(),
            rules: AlertRuleConfig::default_rules(),
        }
    }
}

impl Config {
    /// Check the configuration without contacting the feed
    pub fn validate(&self) -> Result<()> {
        if self.feed.channel_id.trim().is_empty() {
            return Err(DomainError::EmptyChannelId.into());
        }
        if self.polling.interval_seconds == 0 || self.polling.interval() > MAX_POLL_INTERVAL {
            return Err(DomainError::InvalidInterval.into());
        }
        if self.polling.max_history == 0 || self.polling.max_history > MAX_CAPACITY {
            return Err(DomainError::InvalidCapacity.into());
        }
        self.threshold_rules()?;
        Ok(())
    }

    /// Rules converted to their runtime form
    pub fn threshold_rules(&self) -> Result<Vec<ThresholdRule>> {
        alerts::to_rules(&self.rules)
    }
}

/// Telemetry feed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Feed service base URL
    pub base_url: String,
    /// Feed channel id
    pub channel_id: String,
    /// Read API key, absent for public channels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            channel_id: String::new(),
            api_key: None,
            timeout_seconds: 10,
        }
    }
}

impl FeedConfig {
    /// Build a feed client from this configuration
    pub fn client(&self) -> Result<FeedClient> {
        FeedClient::new(
            &self.base_url,
            &self.channel_id,
            self.api_key.clone(),
            Duration::from_secs(self.timeout_seconds.max(1)),
        )
    }
}

/// Poll loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between alerting polls
    pub interval_seconds: u64,
    /// Seconds a channel stays quiet after an alert
    pub cooldown_seconds: u64,
    /// Notifications kept in history
    pub max_history: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 10,
            cooldown_seconds: 300,
            max_history: 100,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }
}

/// Notification channel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Print alerts to the terminal
    pub terminal: bool,
    /// Write alerts through the logger
    pub log: bool,
    /// Push relay receiving alerts as JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Push relay timeout in seconds
    pub webhook_timeout_seconds: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            terminal: true,
            log: false,
            webhook_url: None,
            webhook_timeout_seconds: 5,
        }
    }
}

impl NotifyConfig {
    /// Build the notification fan-out for the enabled channels
    pub fn notifiers(&self) -> Result<NotificationManager> {
        let mut manager = NotificationManager::new();
        if self.terminal {
            manager.add_notifier(Box::new(TerminalNotifier::new()));
        }
        if self.log {
            manager.add_notifier(Box::new(LogNotifier));
        }
        if let Some(url) = &self.webhook_url {
            let timeout = Duration::from_secs(self.webhook_timeout_seconds.max(1));
            manager.add_notifier(Box::new(WebhookNotifier::new(url.clone(), timeout)?));
        }
        if manager.notifier_count() == 0 {
            log::warn!("No notification channels enabled; alerts are recorded in history only");
        }
        Ok(manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn configured() -> Config {
        let mut config = Config::default();
        config.feed.channel_id = "123456".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.feed.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.polling.interval(), Duration::from_secs(10));
        assert_eq!(config.polling.cooldown(), Duration::from_secs(300));
        assert_eq!(config.polling.max_history, 100);
        assert_eq!(config.rules.len(), 2);
    }

    #[test]
    fn test_validate_requires_channel() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(AppError::Domain(DomainError::EmptyChannelId))
        ));
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_interval_and_history() {
        let mut config = configured();
        config.polling.interval_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = configured();
        config.polling.max_history = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_interval_and_history() {
        let mut config = configured();
        config.polling.max_history = usize::MAX / 2;
        assert!(matches!(
            config.validate(),
            Err(AppError::Domain(DomainError::InvalidCapacity))
        ));

        let mut config = configured();
        config.polling.interval_seconds = u64::MAX / 2;
        assert!(matches!(
            config.validate(),
            Err(AppError::Domain(DomainError::InvalidInterval))
        ));

        let mut config = configured();
        config.polling.interval_seconds = MAX_POLL_INTERVAL.as_secs();
        config.polling.max_history = MAX_CAPACITY;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [feed]
            channel_id = "42"

            [polling]
            cooldown_seconds = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.feed.channel_id, "42");
        assert_eq!(config.feed.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.polling.cooldown_seconds, 60);
        assert_eq!(config.polling.interval_seconds, 10);
        assert_eq!(config.rules, AlertRuleConfig::default_rules());
    }

    #[test]
    fn test_rules_from_toml() {
        let config: Config = toml::from_str(
            r#"
            [feed]
            channel_id = "42"

            [[rules]]
            channel = "temperature"
            field = "field3"
            condition = { less_than = 5.0 }
            severity = "info"
            "#,
        )
        .unwrap();

        let rules = config.threshold_rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].channel, "temperature");
        assert!(rules[0].matches(4.0));
    }

    #[test]
    fn test_notifiers_from_config() {
        let notify = NotifyConfig {
            terminal: true,
            log: true,
            webhook_url: Some("http://127.0.0.1:9/push".to_string()),
            webhook_timeout_seconds: 1,
        };
        assert_eq!(notify.notifiers().unwrap().notifier_count(), 3);

        let silent = NotifyConfig {
            terminal: false,
            ..NotifyConfig::default()
        };
        assert_eq!(silent.notifiers().unwrap().notifier_count(), 0);
    }
}
