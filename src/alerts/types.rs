//! Alert system domain types
//!
//! Defines threshold rules, comparators, candidates and notification records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert severity levels, used as notification priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Informational, no action needed
    Info,
    /// Attention recommended
    Warning,
    /// Action required soon
    Critical,
    /// Immediate action required
    Emergency,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
            Self::Emergency => "EMERGENCY",
        })
    }
}

/// Comparison applied between a measured value and a threshold
///
/// Rules keep their own comparator: a `>` rule and a `>=` rule on
/// different channels behave differently exactly at the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// value > threshold
    GreaterThan,
    /// value >= threshold
    GreaterOrEqual,
    /// value < threshold
    LessThan,
    /// value <= threshold
    LessOrEqual,
}

impl Comparator {
    /// Whether `value` crosses `threshold`
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::GreaterOrEqual => value >= threshold,
            Self::LessThan => value < threshold,
            Self::LessOrEqual => value <= threshold,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Threshold rule for one signal channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    /// Signal channel name (cooldown key), e.g. "gas"
    pub channel: String,
    /// Feed field carrying the channel, e.g. "field1"
    pub field: String,
    /// Comparison against the threshold
    pub comparator: Comparator,
    /// Threshold value
    pub threshold: f64,
    /// Notification title template
    pub title: String,
    /// Notification body template
    pub body: String,
    /// Notification priority
    pub severity: AlertSeverity,
    /// Whether the rule is evaluated
    pub enabled: bool,
}

impl ThresholdRule {
    /// Create a new rule with generic title/body templates
    pub fn new(
        channel: impl Into<String>,
        field: impl Into<String>,
        comparator: Comparator,
        threshold: f64,
        severity: AlertSeverity,
    ) -> Self {
        Self {
            channel: channel.into(),
            field: field.into(),
            comparator,
            threshold,
            title: "{channel} alert".to_string(),
            body: "{channel} reading {value} is {condition}".to_string(),
            severity,
            enabled: true,
        }
    }

    /// Set the title and body templates
    pub fn with_templates(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.title = title.into();
        self.body = body.into();
        self
    }

    /// Disable the rule
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether `value` triggers this rule
    pub fn matches(&self, value: f64) -> bool {
        self.enabled && self.comparator.holds(value, self.threshold)
    }

    /// Human-readable condition, e.g. "> 20"
    pub fn condition(&self) -> String {
        format!("{} {}", self.comparator, self.threshold)
    }

    /// Render a template for a measured value
    ///
    /// Supported placeholders: `{channel}`, `{field}`, `{value}`,
    /// `{threshold}`, `{condition}`.
    pub fn render(&self, template: &str, value: f64) -> String {
        template
            .replace("{channel}", &self.channel)
            .replace("{field}", &self.field)
            .replace("{value}", &format_value(value))
            .replace("{threshold}", &format_value(self.threshold))
            .replace("{condition}", &self.condition())
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// A rule crossed by a sample, waiting for the cooldown gate
///
/// Borrows its rule; candidates live only for the cycle that produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertCandidate<'a> {
    pub rule: &'a ThresholdRule,
    /// Measured value
    pub value: f64,
    /// Timestamp of the sample that produced the candidate
    pub sampled_at: DateTime<Utc>,
}

impl<'a> AlertCandidate<'a> {
    pub fn channel(&self) -> &'a str {
        &self.rule.channel
    }

    pub fn threshold(&self) -> f64 {
        self.rule.threshold
    }

    pub fn severity(&self) -> AlertSeverity {
        self.rule.severity
    }

    /// Rendered notification title
    pub fn title(&self) -> String {
        self.rule.render(&self.rule.title, self.value)
    }

    /// Rendered notification body
    pub fn body(&self) -> String {
        self.rule.render(&self.rule.body, self.value)
    }
}

/// A notification produced for an admitted candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Monotonic sequence number within the process
    pub id: u64,
    pub channel: String,
    pub title: String,
    pub body: String,
    pub severity: AlertSeverity,
    /// Measured value that triggered the notification
    pub value: f64,
    pub threshold: f64,
    /// Timestamp of the triggering sample
    pub sampled_at: DateTime<Utc>,
    /// When the notification was emitted
    pub created_at: DateTime<Utc>,
    /// Whether the notification was handed to every notifier
    ///
    /// A webhook relay answers after this is set; its rejections are logged.
    pub dispatched: bool,
}

impl fmt::Display for NotificationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.created_at.format("%H:%M:%S"),
            self.severity,
            self.title,
            self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparator_boundaries() {
        assert!(!Comparator::GreaterThan.holds(20.0, 20.0));
        assert!(Comparator::GreaterThan.holds(20.1, 20.0));
        assert!(Comparator::GreaterOrEqual.holds(20.0, 20.0));
        assert!(!Comparator::GreaterOrEqual.holds(19.9, 20.0));
        assert!(Comparator::LessThan.holds(4.0, 5.0));
        assert!(!Comparator::LessThan.holds(5.0, 5.0));
        assert!(Comparator::LessOrEqual.holds(5.0, 5.0));
    }

    #[test]
    fn test_rule_disabled_never_matches() {
        let rule = ThresholdRule::new(
            "gas",
            "field1",
            Comparator::GreaterThan,
            20.0,
            AlertSeverity::Critical,
        )
        .disabled();
        assert!(!rule.matches(100.0));
    }

    #[test]
    fn test_render_templates() {
        let rule = ThresholdRule::new(
            "gas",
            "field1",
            Comparator::GreaterThan,
            20.0,
            AlertSeverity::Critical,
        )
        .with_templates(
            "Gas leak on {field}",
            "Gas at {value} ppm (limit {threshold}, {condition})",
        );

        assert_eq!(rule.render(&rule.title, 25.0), "Gas leak on field1");
        assert_eq!(
            rule.render(&rule.body, 25.5),
            "Gas at 25.5 ppm (limit 20.0, > 20)"
        );
    }

    #[test]
    fn test_candidate_accessors() {
        let rule = ThresholdRule::new(
            "vibration",
            "field2",
            Comparator::GreaterOrEqual,
            1.0,
            AlertSeverity::Warning,
        );
        let candidate = AlertCandidate {
            rule: &rule,
            value: 1.0,
            sampled_at: Utc::now(),
        };

        assert_eq!(candidate.channel(), "vibration");
        assert_eq!(candidate.threshold(), 1.0);
        assert_eq!(candidate.severity(), AlertSeverity::Warning);
        assert_eq!(candidate.title(), "vibration alert");
        assert_eq!(candidate.body(), "vibration reading 1.0 is >= 1");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(AlertSeverity::Info < AlertSeverity::Warning);
        assert!(AlertSeverity::Warning < AlertSeverity::Critical);
        assert!(AlertSeverity::Critical < AlertSeverity::Emergency);
    }
}
