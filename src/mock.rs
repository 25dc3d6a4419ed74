//! Mock implementations for testing
//!
//! Provides a scripted telemetry source and recording notifiers so the
//! alerting pipeline can be exercised without a network or a display.

use crate::alerts::{AlertSeverity, Notifier, NotificationRecord};
use crate::domain::Sample;
use crate::error::{DispatchError, FetchError};
use crate::telemetry::TelemetrySource;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Scripted telemetry source
///
/// Returns queued responses in order; once the queue is empty it keeps
/// returning the fallback.
#[derive(Debug)]
pub struct MockSource {
    responses: Mutex<VecDeque<Result<Sample, FetchError>>>,
    fallback: Result<Sample, FetchError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Source that answers every call with `fallback`
    pub fn new(fallback: Result<Sample, FetchError>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Source that always fails with a network error
    pub fn failing() -> Self {
        Self::new(Err(FetchError::NetworkFailure("mock offline".to_string())))
    }

    /// Queue a response ahead of the fallback
    pub fn push(&self, response: Result<Sample, FetchError>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Sleep (on the tokio clock) before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches started
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TelemetrySource for MockSource {
    async fn latest(&self) -> Result<Sample, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let queued = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        queued.unwrap_or_else(|| self.fallback.clone())
    }

    fn describe(&self) -> String {
        "mock source".to_string()
    }
}

/// Notifier that records everything it is asked to show
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<(String, String, AlertSeverity)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications shown so far, in order
    pub fn shown(&self) -> Vec<(String, String, AlertSeverity)> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, title: &str, body: &str, severity: AlertSeverity) -> Result<(), DispatchError> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((title.to_string(), body.to_string(), severity));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Notifier that always fails
#[derive(Debug, Default)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn show(&self, _title: &str, _body: &str, _severity: AlertSeverity) -> Result<(), DispatchError> {
        Err(DispatchError::DispatchFailure {
            notifier: self.name().to_string(),
            message: "mock platform rejected notification".to_string(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Fixed timestamp used by mock samples
pub fn sample_time(offset_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + offset_secs, 0)
        .single()
        .unwrap_or_default()
}

/// Sample with a gas reading in `field1`
pub fn gas_sample(offset_secs: i64, gas: f64) -> Sample {
    Sample::new(sample_time(offset_secs)).with_field("field1", gas.to_string())
}

/// Minimal notification record with the given id
pub fn record(id: u64) -> NotificationRecord {
    NotificationRecord {
        id,
        channel: "gas".to_string(),
        title: format!("alert {}", id),
        body: "body".to_string(),
        severity: AlertSeverity::Warning,
        value: 25.0,
        threshold: 20.0,
        sampled_at: sample_time(0),
        created_at: sample_time(0),
        dispatched: true,
    }
}
