//! HTTP client for the channel feed service
//!
//! Talks to a ThingSpeak-compatible API:
//! `GET {base}/channels/{id}/feeds/last.json` for the latest entry and
//! `GET {base}/channels/{id}/feeds.json?results=N` for recent history.

use super::traits::TelemetrySource;
use crate::domain::{FeedPage, Sample};
use crate::error::{AppError, DomainError, FetchError};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Upper bound the service accepts for `results`
pub const MAX_RESULTS: u32 = 8000;

/// Feed service client bound to one channel
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    base_url: Url,
    channel_id: String,
    api_key: Option<String>,
}

impl FeedClient {
    /// Create a client for `channel_id` on the service at `base_url`
    ///
    /// An absent `api_key` means the channel is public.
    pub fn new(
        base_url: &str,
        channel_id: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let channel_id = channel_id.trim();
        if channel_id.is_empty() {
            return Err(DomainError::EmptyChannelId.into());
        }

        let base_url = Url::parse(base_url)
            .map_err(|e| DomainError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(DomainError::InvalidUrl(base_url.to_string()).into());
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sensorwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::NetworkFailure(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            channel_id: channel_id.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Channel this client reads
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Whether requests carry a read key
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch the latest entry of the channel
    pub async fn fetch_latest(&self) -> Result<Sample, FetchError> {
        let url = self.endpoint(&["feeds", "last.json"], None);
        log::debug!("Fetching latest entry of channel {}", self.channel_id);
        self.get_json(url).await
    }

    /// Fetch up to `results` recent entries, oldest first
    pub async fn fetch_recent(&self, results: u32) -> Result<FeedPage, FetchError> {
        let results = results.clamp(1, MAX_RESULTS);
        let url = self.endpoint(&["feeds.json"], Some(results));
        log::debug!(
            "Fetching {} recent entries of channel {}",
            results,
            self.channel_id
        );
        self.get_json(url).await
    }

    fn endpoint(&self, tail: &[&str], results: Option<u32>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("channels")
                .push(&self.channel_id)
                .extend(tail);
        }

        {
            let mut query = url.query_pairs_mut();
            if let Some(key) = &self.api_key {
                query.append_pair("api_key", key);
            }
            if let Some(n) = results {
                query.append_pair("results", &n.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }

        let body = response.text().await?;
        parse_body(&body)
    }
}

/// Parse a response body that must be a JSON object of shape `T`
fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(FetchError::MalformedResponse("empty response body".to_string()));
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    // The service answers `-1` for channels it will not disclose
    if !value.is_object() {
        return Err(FetchError::MalformedResponse(format!(
            "expected a JSON object, got `{}`",
            truncate(body, 64)
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| FetchError::MalformedResponse(format!("unexpected shape: {}", e)))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[async_trait]
impl TelemetrySource for FeedClient {
    async fn latest(&self) -> Result<Sample, FetchError> {
        self.fetch_latest().await
    }

    fn describe(&self) -> String {
        format!("{} channel {}", self.base_url, self.channel_id)
    }
}
