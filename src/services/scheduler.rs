//! Poll scheduler
//!
//! Drives the alert pipeline on a fixed period from a single tokio task.
//!
//! ```text
//!   Stopped --start()--> Running --stop()/drop--> Stopped
//! ```
//!
//! Cycles never overlap. A tick missed while a cycle is still running fires
//! once when that cycle ends; any further missed ticks are skipped and the
//! schedule realigns to the period. A failed cycle is logged and recorded in
//! [`PollStatus`]; the next tick runs as usual.

use super::pipeline::AlertPipeline;
use crate::alerts::HistoryReader;
use crate::error::{DomainError, SchedulerError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Default period between alerting polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Longest poll period accepted from configuration
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Scheduler lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    #[default]
    Stopped,
    Running,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Observable polling status
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PollStatus {
    pub state: SchedulerState,
    /// Cycles started, successful or not
    pub cycles: u64,
    /// Cycles whose fetch failed
    pub failed_cycles: u64,
    /// Notifications emitted since start
    pub notifications: u64,
    /// Error of the most recent cycle, cleared by the next success
    pub last_error: Option<String>,
    /// Timestamp of the most recently evaluated sample
    pub last_sample_at: Option<DateTime<Utc>>,
}

impl PollStatus {
    /// Whether the most recent cycle failed
    pub fn is_degraded(&self) -> bool {
        self.last_error.is_some()
    }
}

struct RunningTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<AlertPipeline>,
}

/// Poll scheduler
pub struct PollScheduler {
    interval: Duration,
    pipeline: Option<AlertPipeline>,
    history: HistoryReader,
    status: Arc<watch::Sender<PollStatus>>,
    running: Option<RunningTask>,
}

impl PollScheduler {
    /// Create a stopped scheduler for `pipeline`
    pub fn new(pipeline: AlertPipeline, interval: Duration) -> Result<Self, DomainError> {
        if interval.is_zero() {
            return Err(DomainError::InvalidInterval);
        }

        let (status, _) = watch::channel(PollStatus::default());
        Ok(Self {
            interval,
            history: pipeline.history(),
            pipeline: Some(pipeline),
            status: Arc::new(status),
            running: None,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> SchedulerState {
        if self.running.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    /// Poll period
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Subscribe to status updates
    pub fn status(&self) -> watch::Receiver<PollStatus> {
        self.status.subscribe()
    }

    /// Read-only notification history
    pub fn history(&self) -> HistoryReader {
        self.history.clone()
    }

    /// Start polling: one cycle immediately, then every interval
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        if self.running.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;
        let pipeline = self
            .pipeline
            .take()
            .ok_or_else(|| SchedulerError::TaskFailed("pipeline unavailable".to_string()))?;

        log::info!(
            "Polling {} every {:?}",
            pipeline.source_description(),
            self.interval
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.status
            .send_modify(|status| status.state = SchedulerState::Running);

        let handle = runtime.spawn(run_loop(
            pipeline,
            self.interval,
            shutdown_rx,
            Arc::clone(&self.status),
        ));

        self.running = Some(RunningTask {
            shutdown: shutdown_tx,
            handle,
        });
        Ok(())
    }

    /// Stop polling and wait for the polling task to finish
    ///
    /// A fetch still in flight is abandoned and its result discarded.
    pub async fn stop(&mut self) -> Result<(), SchedulerError> {
        let task = self.running.take().ok_or(SchedulerError::NotRunning)?;
        let _ = task.shutdown.send(true);

        let result = task.handle.await;
        self.status
            .send_modify(|status| status.state = SchedulerState::Stopped);

        let pipeline = result.map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;
        self.pipeline = Some(pipeline);
        log::info!("Polling stopped");
        Ok(())
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.running.take() {
            // The loop exits at its next await point; the pipeline goes with it
            let _ = task.shutdown.send(true);
        }
    }
}

async fn run_loop(
    mut pipeline: AlertPipeline,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    status: Arc<watch::Sender<PollStatus>>,
) -> AlertPipeline {
    let mut ticker = interval_at(Instant::now(), period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        let started = Instant::now();
        status.send_modify(|s| s.cycles += 1);

        let fetched = tokio::select! {
            biased;
            _ = shutdown.changed() => {
                log::debug!("Stop requested during fetch; discarding its result");
                break;
            }
            result = pipeline.fetch() => result,
        };

        match fetched {
            Ok(sample) => {
                let outcome = pipeline.process(&sample, Instant::now());
                status.send_modify(|s| {
                    s.notifications += outcome.notifications.len() as u64;
                    s.last_sample_at = outcome.sampled_at;
                    s.last_error = None;
                });
            }
            Err(e) => {
                log::warn!("Poll cycle failed ({}): {}", e.kind(), e);
                status.send_modify(|s| {
                    s.failed_cycles += 1;
                    s.last_error = Some(e.to_string());
                });
            }
        }

        if started.elapsed() > period {
            log::debug!("Cycle took {:?}, longer than the poll interval", started.elapsed());
        }
    }

    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{
        AlertSeverity, Comparator, CooldownGate, NotificationEmitter, NotificationHistory,
        ThresholdRule,
    };
    use crate::error::FetchError;
    use crate::mock::{gas_sample, MockSource, RecordingNotifier};
    use tokio::time::sleep;

    fn pipeline(source: Arc<MockSource>, cooldown: Duration) -> AlertPipeline {
        pipeline_with(source, Arc::new(RecordingNotifier::new()), cooldown)
    }

    fn pipeline_with(
        source: Arc<MockSource>,
        notifier: Arc<RecordingNotifier>,
        cooldown: Duration,
    ) -> AlertPipeline {
        AlertPipeline::new(
            source,
            vec![ThresholdRule::new(
                "gas",
                "field1",
                Comparator::GreaterThan,
                20.0,
                AlertSeverity::Critical,
            )],
            CooldownGate::new(cooldown),
            NotificationEmitter::new(notifier, NotificationHistory::default()),
        )
    }

    fn scheduler(source: Arc<MockSource>, cooldown: Duration) -> PollScheduler {
        PollScheduler::new(pipeline(source, cooldown), Duration::from_secs(10)).unwrap()
    }

    #[test]
    fn test_zero_interval_rejected() {
        let source = Arc::new(MockSource::failing());
        let result = PollScheduler::new(pipeline(source, Duration::from_secs(1)), Duration::ZERO);
        assert!(matches!(result, Err(DomainError::InvalidInterval)));
    }

    #[test]
    fn test_start_requires_runtime() {
        let source = Arc::new(MockSource::failing());
        let mut scheduler = scheduler(source, Duration::from_secs(300));
        assert!(matches!(
            scheduler.start(),
            Err(SchedulerError::TaskFailed(_))
        ));
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_periodically() {
        let source = Arc::new(MockSource::new(Ok(gas_sample(0, 10.0))));
        let mut scheduler = scheduler(source.clone(), Duration::from_secs(300));

        scheduler.start().unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Running);

        sleep(Duration::from_secs(25)).await;
        assert_eq!(source.calls(), 3);
        assert_eq!(scheduler.status().borrow().cycles, 3);

        scheduler.stop().await.unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(scheduler.status().borrow().state, SchedulerState::Stopped);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_and_stop() {
        let source = Arc::new(MockSource::failing());
        let mut scheduler = scheduler(source, Duration::from_secs(300));

        assert_eq!(scheduler.stop().await, Err(SchedulerError::NotRunning));
        scheduler.start().unwrap();
        assert_eq!(scheduler.start(), Err(SchedulerError::AlreadyRunning));
        scheduler.stop().await.unwrap();
        assert_eq!(scheduler.stop().await, Err(SchedulerError::NotRunning));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_cycle_does_not_stop_polling() {
        let source = Arc::new(MockSource::new(Ok(gas_sample(0, 25.0))));
        source.push(Err(FetchError::NetworkFailure("timeout".to_string())));
        let mut scheduler = scheduler(source.clone(), Duration::from_secs(300));
        let status = scheduler.status();

        scheduler.start().unwrap();
        sleep(Duration::from_secs(5)).await;
        assert!(status.borrow().is_degraded());
        assert!(scheduler.history().is_empty());

        sleep(Duration::from_secs(10)).await;
        assert_eq!(source.calls(), 2);
        {
            let current = status.borrow();
            assert_eq!(current.cycles, 2);
            assert_eq!(current.failed_cycles, 1);
            assert!(!current.is_degraded());
            assert_eq!(current.notifications, 1);
        }
        assert_eq!(scheduler.history().len(), 1);

        scheduler.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_spans_cycles() {
        let source = Arc::new(MockSource::new(Ok(gas_sample(0, 25.0))));
        let mut scheduler = scheduler(source.clone(), Duration::from_secs(295));

        scheduler.start().unwrap();
        sleep(Duration::from_secs(35)).await;
        assert_eq!(source.calls(), 4);
        assert_eq!(scheduler.history().len(), 1);

        // Cycle at t=300 is the first past the 295s window
        sleep(Duration::from_secs(270)).await;
        assert_eq!(scheduler.history().len(), 2);

        scheduler.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_skips_ticks() {
        let source = Arc::new(
            MockSource::new(Ok(gas_sample(0, 10.0))).with_delay(Duration::from_secs(15)),
        );
        let mut scheduler = scheduler(source.clone(), Duration::from_secs(300));

        scheduler.start().unwrap();
        // Fetch 1 runs 0..15; the late tick fires at 15, the one at 20 is
        // skipped while fetch 2 runs 15..30
        sleep(Duration::from_secs(14)).await;
        assert_eq!(source.calls(), 1);
        sleep(Duration::from_secs(4)).await;
        assert_eq!(source.calls(), 2);
        sleep(Duration::from_secs(11)).await;
        assert_eq!(source.calls(), 2);
        sleep(Duration::from_secs(2)).await;
        assert_eq!(source.calls(), 3);

        scheduler.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_discards_in_flight_fetch() {
        let source = Arc::new(
            MockSource::new(Ok(gas_sample(0, 25.0))).with_delay(Duration::from_secs(15)),
        );
        let mut scheduler = scheduler(source.clone(), Duration::from_secs(300));

        scheduler.start().unwrap();
        sleep(Duration::from_secs(5)).await;
        scheduler.stop().await.unwrap();

        sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls(), 1);
        assert!(scheduler.history().is_empty());
        assert_eq!(scheduler.status().borrow().notifications, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_keeps_cooldown_state() {
        let source = Arc::new(MockSource::new(Ok(gas_sample(0, 25.0))));
        let mut scheduler = scheduler(source.clone(), Duration::from_secs(300));

        scheduler.start().unwrap();
        sleep(Duration::from_secs(1)).await;
        scheduler.stop().await.unwrap();
        assert_eq!(scheduler.history().len(), 1);

        scheduler.start().unwrap();
        sleep(Duration::from_secs(1)).await;
        scheduler.stop().await.unwrap();
        assert_eq!(source.calls(), 2);
        assert_eq!(scheduler.history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_while_fetching_stops_polling() {
        let source = Arc::new(
            MockSource::new(Ok(gas_sample(0, 25.0))).with_delay(Duration::from_secs(15)),
        );
        let notifier = Arc::new(RecordingNotifier::new());
        let mut scheduler = PollScheduler::new(
            pipeline_with(source.clone(), notifier.clone(), Duration::from_secs(300)),
            Duration::from_secs(10),
        )
        .unwrap();
        let history = scheduler.history();

        scheduler.start().unwrap();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(source.calls(), 1);
        drop(scheduler);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 1);
        assert!(history.is_empty());
        assert_eq!(notifier.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_stops_and_restarts() {
        let source = Arc::new(MockSource::new(Ok(gas_sample(0, 25.0))));
        let mut scheduler = PollScheduler::new(
            pipeline(source.clone(), Duration::from_secs(300)),
            Duration::from_secs(u64::MAX / 2),
        )
        .unwrap();

        scheduler.start().unwrap();
        sleep(Duration::from_secs(1)).await;
        assert_eq!(scheduler.stop().await, Ok(()));
        assert_eq!(source.calls(), 1);

        scheduler.start().unwrap();
        sleep(Duration::from_secs(1)).await;
        assert_eq!(scheduler.stop().await, Ok(()));
        assert_eq!(source.calls(), 2);
        assert_eq!(scheduler.history().len(), 1);
    }
}
