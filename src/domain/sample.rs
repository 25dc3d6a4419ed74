//! Telemetry sample domain type
//!
//! A `Sample` is one entry of a feed channel: a creation timestamp and the
//! raw values of the feed fields (`field1`..`field8`, position fields, status).
//! The upstream service sends numbers as strings and omits or nulls fields
//! freely, so values are kept raw and parsed on demand.

use super::location::Location;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One telemetry reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    entry_id: Option<u64>,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

impl Sample {
    /// Create an empty sample taken at `created_at`
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            entry_id: None,
            fields: BTreeMap::new(),
        }
    }

    /// Set the upstream entry id
    pub fn with_entry_id(mut self, entry_id: u64) -> Self {
        self.entry_id = Some(entry_id);
        self
    }

    /// Set a raw field value
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// When the upstream feed recorded this entry
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Upstream entry sequence number, if present
    pub fn entry_id(&self) -> Option<u64> {
        self.entry_id
    }

    /// Raw value of a field
    pub fn raw(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Numeric value of a field
    ///
    /// Returns `None` when the field is absent, null, not a number or a
    /// numeric string, or not finite.
    pub fn numeric(&self, field: &str) -> Option<f64> {
        let value = match self.fields.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;

        value.is_finite().then_some(value)
    }

    /// Text value of a field (strings as-is, numbers formatted)
    pub fn text(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// All field names present in the sample, in sorted order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Numbered data fields (`field1`..`field8`) with their raw text
    pub fn data_fields(&self) -> Vec<(&str, Option<String>)> {
        self.fields
            .keys()
            .filter(|name| is_data_field(name))
            .map(|name| (name.as_str(), self.text(name)))
            .collect()
    }

    /// Position of the device when the entry was recorded
    pub fn location(&self) -> Option<Location> {
        Location::new(self.numeric("latitude")?, self.numeric("longitude")?)
    }
}

fn is_data_field(name: &str) -> bool {
    name.strip_prefix("field")
        .and_then(|n| n.parse::<u8>().ok())
        .is_some_and(|n| (1..=8).contains(&n))
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.created_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        if let Some(id) = self.entry_id {
            write!(f, " (entry {})", id)?;
        }
        Ok(())
    }
}
