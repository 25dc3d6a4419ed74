//! Telemetry feed access
//!
//! The [`TelemetrySource`] trait abstracts the feed service so the alerting
//! pipeline can be driven by mocks in tests and by [`FeedClient`] in production.

pub mod client;
pub mod traits;

pub use client::FeedClient;
pub use traits::TelemetrySource;
