//! Alert pipeline
//!
//! One cycle: fetch the latest sample, evaluate the rules, pass each
//! candidate through the cooldown gate and emit the admitted ones.

use crate::alerts::{
    evaluate, Admission, CooldownGate, HistoryReader, NotificationEmitter, NotificationHistory,
    NotificationRecord, Notifier, ThresholdRule,
};
use crate::config::Config;
use crate::domain::Sample;
use crate::error::{FetchError, Result};
use crate::telemetry::TelemetrySource;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::time::Instant;

/// What one cycle did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleOutcome {
    /// Timestamp of the evaluated sample
    pub sampled_at: Option<DateTime<Utc>>,
    /// Rules crossed by the sample
    pub candidates: usize,
    /// Candidates held back by the cooldown gate
    pub suppressed: usize,
    /// Notifications emitted, in rule order
    pub notifications: Vec<NotificationRecord>,
}

/// Fetch, evaluate, gate, emit
pub struct AlertPipeline {
    source: Arc<dyn TelemetrySource>,
    rules: Vec<ThresholdRule>,
    gate: CooldownGate,
    emitter: NotificationEmitter,
}

impl AlertPipeline {
    /// Create a new pipeline
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        rules: Vec<ThresholdRule>,
        gate: CooldownGate,
        emitter: NotificationEmitter,
    ) -> Self {
        Self {
            source,
            rules,
            gate,
            emitter,
        }
    }

    /// Assemble a pipeline from configuration
    pub fn from_config(
        config: &Config,
        source: Arc<dyn TelemetrySource>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let rules = config.threshold_rules()?;
        let history = NotificationHistory::new(config.polling.max_history)?;

        Ok(Self::new(
            source,
            rules,
            CooldownGate::new(config.polling.cooldown()),
            NotificationEmitter::new(notifier, history),
        ))
    }

    /// Fetch the latest sample from the source
    pub async fn fetch(&self) -> std::result::Result<Sample, FetchError> {
        self.source.latest().await
    }

    /// Evaluate a sample and emit notifications for admitted candidates
    pub fn process(&mut self, sample: &Sample, now: Instant) -> CycleOutcome {
        let candidates = evaluate(sample, &self.rules);
        let mut outcome = CycleOutcome {
            sampled_at: Some(sample.created_at()),
            candidates: candidates.len(),
            ..CycleOutcome::default()
        };

        for candidate in &candidates {
            match self.gate.admit(candidate, now) {
                Admission::Admitted => {
                    log::info!(
                        "{} {} {} (value {})",
                        candidate.channel(),
                        candidate.rule.comparator,
                        candidate.threshold(),
                        candidate.value
                    );
                    outcome.notifications.push(self.emitter.emit(candidate));
                }
                Admission::Suppressed { remaining } => {
                    log::debug!(
                        "Suppressed {} alert, cooldown ends in {:?}",
                        candidate.channel(),
                        remaining
                    );
                    outcome.suppressed += 1;
                }
            }
        }

        outcome
    }

    /// Run one full cycle now
    pub async fn poll_once(&mut self) -> std::result::Result<CycleOutcome, FetchError> {
        let sample = self.fetch().await?;
        Ok(self.process(&sample, Instant::now()))
    }

    /// Configured rules
    pub fn rules(&self) -> &[ThresholdRule] {
        &self.rules
    }

    /// Read-only notification history
    pub fn history(&self) -> HistoryReader {
        self.emitter.history()
    }

    /// Describe the telemetry source for logs
    pub fn source_description(&self) -> String {
        self.source.describe()
    }
}
