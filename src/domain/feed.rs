//! Historical feed read model
//!
//! Returned by the `feeds.json` endpoint: channel metadata plus the most
//! recent entries, oldest first.

use super::sample::Sample;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Channel metadata as published by the feed service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Numeric channel id
    pub id: u64,
    /// Channel name
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Last entry id written to the channel
    #[serde(default)]
    pub last_entry_id: Option<u64>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl ChannelInfo {
    /// Human labels for the numbered fields, e.g. `("field1", "Gas")`
    pub fn field_labels(&self) -> Vec<(&str, &str)> {
        self.extra
            .iter()
            .filter(|(name, _)| name.starts_with("field"))
            .filter_map(|(name, value)| value.as_str().map(|label| (name.as_str(), label)))
            .collect()
    }

    /// Label for one field, if the channel defines it
    pub fn label(&self, field: &str) -> Option<&str> {
        self.extra.get(field).and_then(Value::as_str)
    }
}

/// One page of historical entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPage {
    pub channel: ChannelInfo,
    #[serde(default)]
    pub feeds: Vec<Sample>,
}

impl FeedPage {
    /// Most recent entry of the page
    pub fn latest(&self) -> Option<&Sample> {
        self.feeds.last()
    }

    /// Numeric series for one field, skipping entries without a value
    pub fn series(&self, field: &str) -> Vec<(chrono::DateTime<chrono::Utc>, f64)> {
        self.feeds
            .iter()
            .filter_map(|s| s.numeric(field).map(|v| (s.created_at(), v)))
            .collect()
    }
}
