//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::alerts::{NotificationRecord, ThresholdRule};
use crate::cli::args::OutputFormat;
use crate::domain::{FeedPage, Sample};
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

/// Latest reading of a channel
#[derive(Debug, Clone, Serialize)]
pub struct LatestReading {
    pub channel_id: String,
    pub sample: Sample,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maps_url: Option<String>,
}

impl LatestReading {
    pub fn new(channel_id: impl Into<String>, sample: Sample) -> Self {
        let maps_url = sample.location().map(|l| l.maps_url());
        Self {
            channel_id: channel_id.into(),
            sample,
            maps_url,
        }
    }
}

impl TableDisplay for LatestReading {
    fn to_table(&self) -> String {
        let mut output = format!("Channel {}: {}\n", self.channel_id, self.sample);
        for (name, value) in self.sample.data_fields() {
            output.push_str(&format!(
                "  {:<8} {}\n",
                name,
                value.as_deref().unwrap_or("-")
            ));
        }
        if let Some(url) = &self.maps_url {
            output.push_str(&format!("  Location: {}\n", url));
        }
        output
    }

    fn to_compact(&self) -> String {
        let fields = self
            .sample
            .data_fields()
            .into_iter()
            .map(|(name, value)| format!("{}={}", name, value.as_deref().unwrap_or("-")))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} {}", self.sample.created_at().to_rfc3339(), fields)
    }
}

impl TableDisplay for FeedPage {
    fn to_table(&self) -> String {
        let title = self
            .channel
            .name
            .clone()
            .unwrap_or_else(|| format!("Channel {}", self.channel.id));
        let mut output = format!("{} ({} entries)\n", title, self.feeds.len());

        let labels = self.channel.field_labels();
        if !labels.is_empty() {
            let legend = labels
                .iter()
                .map(|(field, label)| format!("{}={}", field, label))
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!("Fields: {}\n", legend));
        }
        output.push('\n');

        for sample in &self.feeds {
            let values = sample
                .data_fields()
                .into_iter()
                .map(|(_, value)| format!("{:>10}", value.as_deref().unwrap_or("-")))
                .collect::<String>();
            output.push_str(&format!(
                "{}{}\n",
                sample.created_at().format("%Y-%m-%d %H:%M:%S"),
                values
            ));
        }

        output
    }

    fn to_compact(&self) -> String {
        self.feeds
            .iter()
            .map(|s| s.created_at().to_rfc3339())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Configured rules for display
#[derive(Debug, Clone, Serialize)]
pub struct RuleList {
    pub rules: Vec<ThresholdRule>,
}

impl TableDisplay for RuleList {
    fn to_table(&self) -> String {
        let mut output = format!("Alert rules: {}\n\n", self.rules.len());
        for rule in &self.rules {
            output.push_str(&format!(
                "  {:<12} {:<8} {:<10} {:<9}{}\n",
                rule.channel,
                rule.field,
                rule.condition(),
                rule.severity,
                if rule.enabled { "" } else { " (disabled)" }
            ));
        }
        output
    }

    fn to_compact(&self) -> String {
        self.rules
            .iter()
            .map(|r| format!("{}:{}{}", r.channel, r.field, r.condition().replace(' ', "")))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Notifications raised during a session
#[derive(Debug, Clone, Serialize)]
pub struct NotificationList {
    pub notifications: Vec<NotificationRecord>,
}

impl TableDisplay for NotificationList {
    fn to_table(&self) -> String {
        if self.notifications.is_empty() {
            return "No notifications raised".to_string();
        }

        let mut output = format!("Notifications: {}\n\n", self.notifications.len());
        for record in &self.notifications {
            output.push_str(&format!(
                "  #{:<4} {} [{}] {}{}\n",
                record.id,
                record.created_at.format("%Y-%m-%d %H:%M:%S"),
                record.severity,
                record.title,
                if record.dispatched { "" } else { " (not delivered)" }
            ));
        }
        output
    }

    fn to_compact(&self) -> String {
        format!("{} notifications", self.notifications.len())
    }
}

/// Result of evaluating the rules once
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub sampled_at: chrono::DateTime<chrono::Utc>,
    pub results: Vec<RuleCheck>,
}

/// One rule's verdict against a sample
#[derive(Debug, Clone, Serialize)]
pub struct RuleCheck {
    pub channel: String,
    pub field: String,
    pub condition: String,
    pub value: Option<f64>,
    pub triggered: bool,
}

impl CheckReport {
    /// Evaluate every enabled rule against `sample`
    pub fn new(sample: &Sample, rules: &[ThresholdRule]) -> Self {
        let results = rules
            .iter()
            .filter(|rule| rule.enabled)
            .map(|rule| {
                let value = sample.numeric(&rule.field);
                RuleCheck {
                    channel: rule.channel.clone(),
                    field: rule.field.clone(),
                    condition: rule.condition(),
                    value,
                    triggered: value.is_some_and(|v| rule.matches(v)),
                }
            })
            .collect();

        Self {
            sampled_at: sample.created_at(),
            results,
        }
    }

    pub fn triggered(&self) -> usize {
        self.results.iter().filter(|r| r.triggered).count()
    }
}

impl TableDisplay for CheckReport {
    fn to_table(&self) -> String {
        let mut output = format!(
            "Sample at {}\n\n",
            self.sampled_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        for check in &self.results {
            let value = check
                .value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "  {:<12} {:<8} {:>10} {:<10} {}\n",
                check.channel,
                check.field,
                value,
                check.condition,
                if check.triggered { "ALERT" } else { "ok" }
            ));
        }
        output
    }

    fn to_compact(&self) -> String {
        format!("{} of {} rules triggered", self.triggered(), self.results.len())
    }
}
