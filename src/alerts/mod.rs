//! Alert and notification system
//!
//! Threshold evaluation, per-channel cooldown, notification dispatch and
//! the bounded notification history.

mod config;
mod cooldown;
mod emitter;
mod evaluator;
mod history;
mod notifier;
mod types;

pub use config::{to_rules, AlertRuleConfig, ConditionConfig};
pub use cooldown::{Admission, CooldownGate, DEFAULT_COOLDOWN};
pub use emitter::NotificationEmitter;
pub use evaluator::evaluate;
pub use history::{HistoryReader, NotificationHistory, DEFAULT_CAPACITY, MAX_CAPACITY};
pub use notifier::{
    drain, LogNotifier, NotificationManager, Notifier, TerminalNotifier, WebhookNotifier,
};
pub use types::{AlertCandidate, AlertSeverity, Comparator, NotificationRecord, ThresholdRule};
