//! Trait definitions for telemetry sources

use crate::domain::Sample;
use crate::error::FetchError;
use async_trait::async_trait;

/// Source of the most recent telemetry sample
///
/// Implementations perform one read per call and never retry; retry policy
/// belongs to the caller.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetch the latest entry of the feed
    async fn latest(&self) -> Result<Sample, FetchError>;

    /// Identifier used in log lines
    fn describe(&self) -> String;
}
