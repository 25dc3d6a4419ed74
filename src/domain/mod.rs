//! Domain models for sensorwatch
//!
//! This module contains the telemetry read model shared by the fetcher,
//! the alerting pipeline and the CLI output.

pub mod feed;
pub mod location;
pub mod sample;

pub use feed::{ChannelInfo, FeedPage};
pub use location::Location;
pub use sample::Sample;
