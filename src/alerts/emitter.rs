//! Notification emitter
//!
//! Turns admitted candidates into notifications, dispatches them and
//! records them in the bounded history.

use super::history::{HistoryReader, NotificationHistory};
use super::notifier::Notifier;
use super::types::{AlertCandidate, NotificationRecord};
use chrono::Utc;
use std::sync::Arc;

/// Notification emitter
pub struct NotificationEmitter {
    notifier: Arc<dyn Notifier>,
    history: NotificationHistory,
    next_id: u64,
}

impl NotificationEmitter {
    /// Create an emitter dispatching through `notifier`
    pub fn new(notifier: Arc<dyn Notifier>, history: NotificationHistory) -> Self {
        Self {
            notifier,
            history,
            next_id: 1,
        }
    }

    /// Emit a notification for an admitted candidate
    ///
    /// Dispatch failures are logged and reflected in the record's
    /// `dispatched` flag; the record is added to the history either way.
    pub fn emit(&mut self, candidate: &AlertCandidate<'_>) -> NotificationRecord {
        let title = candidate.title();
        let body = candidate.body();

        let dispatched = match self.notifier.show(&title, &body, candidate.severity()) {
            Ok(()) => true,
            Err(e) => {
                log::warn!(
                    "Notification for {} not delivered via {}: {}",
                    candidate.channel(),
                    self.notifier.name(),
                    e
                );
                false
            }
        };

        let record = NotificationRecord {
            id: self.next_id,
            channel: candidate.channel().to_string(),
            title,
            body,
            severity: candidate.severity(),
            value: candidate.value,
            threshold: candidate.threshold(),
            sampled_at: candidate.sampled_at,
            created_at: Utc::now(),
            dispatched,
        };
        self.next_id += 1;

        self.history.push(record.clone());
        record
    }

    /// Read-only handle on the history
    pub fn history(&self) -> HistoryReader {
        self.history.reader()
    }
}
