use crate::snapshot::Snapshot;
use std::collections::VecDeque;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history capacity must be >= 1, got {0}")]
    InvalidCapacity(usize),
    #[error("default read limit must be >= 1, got {0}")]
    InvalidDefaultLimit(usize),
}

/// Bounded, time-ordered ring of recent snapshots. The collector is the
/// only writer; any number of API handlers read concurrently. All access
/// goes through `append`/`read`, so no caller ever sees the deque while
/// an append is in flight or its length above capacity.
pub struct HistoryStore {
    capacity: usize,
    default_limit: usize,
    entries: RwLock<VecDeque<Snapshot>>,
}

impl HistoryStore {
    pub fn new(capacity: usize, default_limit: usize) -> Result<Self, HistoryError> {
        if capacity == 0 {
            return Err(HistoryError::InvalidCapacity(capacity));
        }
        if default_limit == 0 {
            return Err(HistoryError::InvalidDefaultLimit(default_limit));
        }
        Ok(Self {
            capacity,
            default_limit,
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends one snapshot at the tail, evicting from the head until the
    /// length is back at capacity. Insertion order is time order.
    pub async fn append(&self, snapshot: Snapshot) {
        let mut entries = self.entries.write().await;
        entries.push_back(snapshot);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Returns the most recent `min(limit, len)` snapshots, oldest first,
    /// as an independent copy. `None` means the configured default limit.
    pub async fn read(&self, limit: Option<usize>) -> Vec<Snapshot> {
        let entries = self.entries.read().await;
        let limit = limit.unwrap_or(self.default_limit);
        let take = limit.min(entries.len());
        entries.iter().skip(entries.len() - take).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
