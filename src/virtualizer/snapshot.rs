//! Scroll and measurement snapshots that survive remounts.
//!
//! Snapshots live in a [`SnapshotStore`] keyed by list id. The store can be
//! written into and read back from a JSON history-state value so a host can
//! stash it alongside its navigation entry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::MeasurementCache;

/// Default quiet period before a snapshot is persisted.
pub const DEFAULT_SNAPSHOT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Saved scroll position and measurements for one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualizerSnapshot {
    /// Number of data items loaded when the snapshot was taken.
    pub count: usize,
    /// Scroll offset in pixels.
    pub scroll_offset: u32,
    /// Measured row sizes.
    pub measurements: MeasurementCache,
}

/// Errors raised while reading snapshots from history state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// The history value does not hold a snapshot map.
    #[error("malformed snapshot history state: {message}")]
    Malformed {
        /// Decoder message.
        message: String,
    },
}

/// Snapshots keyed by list id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotStore {
    entries: HashMap<String, VirtualizerSnapshot>,
}

impl SnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `snapshot` under `list_id`, replacing any previous one.
    pub fn save(&mut self, list_id: impl Into<String>, snapshot: VirtualizerSnapshot) {
        self.entries.insert(list_id.into(), snapshot);
    }

    /// Returns the snapshot for `list_id`.
    #[must_use]
    pub fn get(&self, list_id: &str) -> Option<&VirtualizerSnapshot> {
        self.entries.get(list_id)
    }

    /// Drops the snapshot for `list_id`.
    pub fn remove(&mut self, list_id: &str) -> Option<VirtualizerSnapshot> {
        self.entries.remove(list_id)
    }

    /// Serialises the store into a history-state value.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Malformed`] if serialisation fails.
    pub fn to_history_state(&self) -> Result<serde_json::Value, SnapshotError> {
        serde_json::to_value(self).map_err(|error| SnapshotError::Malformed {
            message: error.to_string(),
        })
    }

    /// Rebuilds a store from a history-state value.
    ///
    /// A JSON `null` yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Malformed`] when the value is not a snapshot
    /// map.
    pub fn from_history_state(value: serde_json::Value) -> Result<Self, SnapshotError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|error| SnapshotError::Malformed {
            message: error.to_string(),
        })
    }
}

/// Trailing-edge debounce for snapshot persistence.
///
/// Every [`schedule`](Self::schedule) call replaces the pending snapshot and
/// pushes the deadline out again, so a burst of scroll events persists once.
#[derive(Debug, Clone)]
pub struct SnapshotDebouncer {
    delay: Duration,
    pending: Option<(VirtualizerSnapshot, Instant)>,
}

impl Default for SnapshotDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_DEBOUNCE)
    }
}

impl SnapshotDebouncer {
    /// Creates a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Returns true when a snapshot is waiting to be persisted.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Queues `snapshot`, restarting the quiet period at `now`.
    pub fn schedule(&mut self, snapshot: VirtualizerSnapshot, now: Instant) {
        self.pending = Some((snapshot, now + self.delay));
    }

    /// Takes the pending snapshot if its quiet period has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<VirtualizerSnapshot> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => {
                self.pending.take().map(|(snapshot, _)| snapshot)
            }
            _ => None,
        }
    }

    /// Takes the pending snapshot regardless of the deadline.
    pub fn flush(&mut self) -> Option<VirtualizerSnapshot> {
        self.pending.take().map(|(snapshot, _)| snapshot)
    }
}
