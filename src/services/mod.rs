//! Service layer for the alerting poll loop
//!
//! The pipeline performs one fetch/evaluate/gate/emit cycle; the scheduler
//! runs it on a fixed period and owns its lifecycle.

pub mod pipeline;
pub mod scheduler;

pub use pipeline::{AlertPipeline, CycleOutcome};
pub use scheduler::{
    PollScheduler, PollStatus, SchedulerState, DEFAULT_POLL_INTERVAL, MAX_POLL_INTERVAL,
};
