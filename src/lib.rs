//! sensorwatch - telemetry feed watcher library
//!
//! This library polls a ThingSpeak-compatible channel feed, evaluates
//! threshold rules against each reading and dispatches rate-limited
//! notifications.
//!
//! # Modules
//!
//! - [`alerts`]: Rules, evaluation, cooldown gate and notification dispatch
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Feed data model
//! - [`error`]: Error types
//! - [`services`]: Alert pipeline and poll scheduler
//! - [`telemetry`]: Feed service client

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
