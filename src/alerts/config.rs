//! Alert rule configuration
//!
//! TOML-friendly form of threshold rules, converted to [`ThresholdRule`]
//! at startup.

use super::types::{AlertSeverity, Comparator, ThresholdRule};
use crate::error::{ConfigError, DomainError, Result};
use serde::{Deserialize, Serialize};

/// Alert rule configuration (TOML-friendly format)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRuleConfig {
    /// Signal channel name, used as cooldown key
    pub channel: String,
    /// Feed field holding the channel's value
    pub field: String,
    /// Condition
    pub condition: ConditionConfig,
    /// Severity level (string form)
    #[serde(default = "default_severity")]
    pub severity: String,
    /// Title template
    #[serde(default = "default_title")]
    pub title: String,
    /// Body template
    #[serde(default = "default_body")]
    pub body: String,
    /// Whether rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_severity() -> String {
    "warning".to_string()
}

fn default_title() -> String {
    "{channel} alert".to_string()
}

fn default_body() -> String {
    "{channel} reading {value} is {condition}".to_string()
}

impl AlertRuleConfig {
    /// Rules shipped with a fresh configuration
    pub fn default_rules() -> Vec<Self> {
        vec![
            Self {
                channel: "gas".to_string(),
                field: "field1".to_string(),
                condition: ConditionConfig::GreaterThan(20.0),
                severity: "critical".to_string(),
                title: "Gas level alert".to_string(),
                body: "Gas concentration {value} exceeds {threshold}".to_string(),
                enabled: true,
            },
            Self {
                channel: "vibration".to_string(),
                field: "field2".to_string(),
                condition: ConditionConfig::GreaterOrEqual(1.0),
                severity: "warning".to_string(),
                title: "Vibration detected".to_string(),
                body: "Vibration level {value} reached {threshold}".to_string(),
                enabled: true,
            },
        ]
    }

    /// Convert to ThresholdRule
    pub fn to_rule(&self) -> Result<ThresholdRule> {
        if self.channel.trim().is_empty() {
            return Err(ConfigError::MissingField("rules.channel".to_string()).into());
        }
        if self.field.trim().is_empty() {
            return Err(ConfigError::MissingField("rules.field".to_string()).into());
        }

        let (comparator, threshold) = self.condition.to_parts();
        if !threshold.is_finite() {
            return Err(DomainError::InvalidThreshold {
                channel: self.channel.clone(),
                value: threshold,
            }
            .into());
        }

        let mut rule = ThresholdRule::new(
            self.channel.trim(),
            self.field.trim(),
            comparator,
            threshold,
            self.parse_severity()?,
        )
        .with_templates(self.title.clone(), self.body.clone());

        if !self.enabled {
            rule = rule.disabled();
        }

        Ok(rule)
    }

    fn parse_severity(&self) -> Result<AlertSeverity> {
        match self.severity.to_lowercase().as_str() {
            "info" => Ok(AlertSeverity::Info),
            "warning" => Ok(AlertSeverity::Warning),
            "critical" => Ok(AlertSeverity::Critical),
            "emergency" => Ok(AlertSeverity::Emergency),
            _ => Err(ConfigError::InvalidValue {
                key: "severity".to_string(),
                message: format!("Unknown severity level: {}", self.severity),
            })?,
        }
    }
}

/// Convert a list of rule configs, rejecting duplicate channels
pub fn to_rules(configs: &[AlertRuleConfig]) -> Result<Vec<ThresholdRule>> {
    let mut rules: Vec<ThresholdRule> = Vec::with_capacity(configs.len());
    for config in configs {
        let rule = config.to_rule()?;
        if rules.iter().any(|r| r.channel == rule.channel) {
            return Err(ConfigError::InvalidValue {
                key: "rules.channel".to_string(),
                message: format!("Duplicate channel: {}", rule.channel),
            }
            .into());
        }
        rules.push(rule);
    }
    Ok(rules)
}

/// Condition configuration (TOML-friendly format)
///
/// Written as an inline table, e.g. `condition = { greater_than = 20.0 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionConfig {
    GreaterThan(f64),
    GreaterOrEqual(f64),
    LessThan(f64),
    LessOrEqual(f64),
}

impl ConditionConfig {
    fn to_parts(self) -> (Comparator, f64) {
        match self {
            Self::GreaterThan(v) => (Comparator::GreaterThan, v),
            Self::GreaterOrEqual(v) => (Comparator::GreaterOrEqual, v),
            Self::LessThan(v) => (Comparator::LessThan, v),
            Self::LessOrEqual(v) => (Comparator::LessOrEqual, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn gas_config() -> AlertRuleConfig {
        AlertRuleConfig {
            channel: "gas".to_string(),
            field: "field1".to_string(),
            condition: ConditionConfig::GreaterThan(20.0),
            severity: "critical".to_string(),
            title: default_title(),
            body: default_body(),
            enabled: true,
        }
    }

    #[test]
    fn test_default_rules_keep_comparators() {
        let rules = to_rules(&AlertRuleConfig::default_rules()).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].comparator, Comparator::GreaterThan);
        assert_eq!(rules[1].comparator, Comparator::GreaterOrEqual);
    }

    #[test]
    fn test_to_rule() {
        let rule = gas_config().to_rule().unwrap();
        assert_eq!(rule.channel, "gas");
        assert_eq!(rule.field, "field1");
        assert_eq!(rule.threshold, 20.0);
        assert_eq!(rule.severity, AlertSeverity::Critical);
        assert!(rule.enabled);
    }

    #[test]
    fn test_parse_severity_case_insensitive() {
        let mut config = gas_config();
        config.severity = "Emergency".to_string();
        assert_eq!(config.parse_severity().unwrap(), AlertSeverity::Emergency);

        config.severity = "loud".to_string();
        assert!(matches!(
            config.parse_severity(),
            Err(AppError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let mut config = gas_config();
        config.condition = ConditionConfig::GreaterThan(f64::INFINITY);
        assert!(matches!(
            config.to_rule(),
            Err(AppError::Domain(DomainError::InvalidThreshold { .. }))
        ));
    }

    #[test]
    fn test_duplicate_channel_rejected() {
        let configs = vec![gas_config(), gas_config()];
        assert!(to_rules(&configs).is_err());
    }

    #[test]
    fn test_condition_toml_form() {
        #[derive(Deserialize)]
        struct Wrapper {
            condition: ConditionConfig,
        }

        let parsed: Wrapper = toml::from_str("condition = { greater_or_equal = 1.5 }").unwrap();
        assert_eq!(parsed.condition, ConditionConfig::GreaterOrEqual(1.5));
    }
}
