//! Application telemetry events and sinks.
//!
//! Blogify records lightweight operational signals, such as page latency and
//! rolled-back optimistic mutations, to help debug feed behaviour. Events are
//! never transmitted anywhere.

use std::io;

use serde::{Deserialize, Serialize};

/// Why a list stopped requesting further pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The server returned an empty page.
    Exhausted,
    /// The request failed and the list failed closed.
    Failed,
}

/// A structured telemetry event emitted by Blogify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A page was appended to a list.
    PageLoaded {
        /// Logical list name (e.g. `home`, `comments:p1`).
        list: String,
        /// Page number that was loaded.
        page_number: u32,
        /// Number of items on the page.
        item_count: usize,
        /// Wall-clock time between request and completion.
        latency_ms: u64,
    },
    /// A list stopped paginating.
    PaginationStopped {
        /// Logical list name.
        list: String,
        /// Page number whose request ended pagination.
        page_number: u32,
        /// Whether the list ran out or the request failed.
        reason: StopReason,
    },
    /// An optimistic mutation was rolled back after the server rejected it.
    MutationRolledBack {
        /// Mutation name (e.g. `delete_comment`).
        operation: String,
        /// Identifier of the affected item.
        item_id: String,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Records telemetry events to stderr as JSON lines (JSONL).
///
/// This is intended for local debugging and is not transmitted anywhere.
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}

/// Recording sink for tests.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use std::sync::Mutex;

    use super::{TelemetryEvent, TelemetrySink};

    /// Sink that keeps every recorded event in memory.
    #[derive(Debug, Default)]
    pub struct RecordingTelemetrySink {
        events: Mutex<Vec<TelemetryEvent>>,
    }

    impl RecordingTelemetrySink {
        /// Returns a copy of the recorded events.
        #[must_use]
        pub fn events(&self) -> Vec<TelemetryEvent> {
            self.events
                .lock()
                .map(|events| events.clone())
                .unwrap_or_default()
        }
    }

    impl TelemetrySink for RecordingTelemetrySink {
        fn record(&self, event: TelemetryEvent) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event);
            }
        }
    }
}
