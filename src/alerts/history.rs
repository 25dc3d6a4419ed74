//! Bounded notification history
//!
//! Most-recent-first list of emitted notifications. One writer (the
//! emitter) and any number of read-only [`HistoryReader`] handles.

use super::types::NotificationRecord;
use crate::error::DomainError;
use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};

/// Default number of records kept
pub const DEFAULT_CAPACITY: usize = 100;

/// Largest accepted history capacity
pub const MAX_CAPACITY: usize = 10_000;

type Shared = Arc<RwLock<VecDeque<NotificationRecord>>>;

/// Writable history, owned by the notification emitter
#[derive(Debug)]
pub struct NotificationHistory {
    records: Shared,
    capacity: usize,
}

impl NotificationHistory {
    /// Create an empty history holding at most `capacity` records
    ///
    /// `capacity` must be in `1..=MAX_CAPACITY`.
    pub fn new(capacity: usize) -> Result<Self, DomainError> {
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(DomainError::InvalidCapacity);
        }
        Ok(Self {
            records: Arc::new(RwLock::new(VecDeque::with_capacity(
                capacity.min(DEFAULT_CAPACITY),
            ))),
            capacity,
        })
    }

    /// Prepend a record, evicting the oldest beyond capacity
    pub fn push(&mut self, record: NotificationRecord) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.push_front(record);
        records.truncate(self.capacity);
    }

    /// Read-only handle sharing this history
    pub fn reader(&self) -> HistoryReader {
        HistoryReader {
            records: Arc::clone(&self.records),
            capacity: self.capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for NotificationHistory {
    fn default() -> Self {
        Self {
            records: Arc::new(RwLock::new(VecDeque::with_capacity(DEFAULT_CAPACITY))),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Read-only view of the notification history
#[derive(Debug, Clone)]
pub struct HistoryReader {
    records: Shared,
    capacity: usize,
}

impl HistoryReader {
    /// Copy of all records, most recent first
    pub fn snapshot(&self) -> Vec<NotificationRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Most recent record
    pub fn latest(&self) -> Option<NotificationRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .front()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
