//! Response log
//!
//! An append-only, ordered record of the frames received from the device
//! during the current session. Entries carry the local wall-clock time at
//! which they were received and are rendered on demand, with or without the
//! `[HH:MM:SS.mmm]` prefix.
//!
//! The log is written by the backend worker and read by the UI through a
//! [`SharedLog`] handle. It grows without bound unless a cap is configured,
//! in which case the oldest entries are evicted first.

use crate::codec;
use chrono::{DateTime, Local};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

/// Log shared between the backend worker (writer) and the UI (reader)
pub type SharedLog = Arc<RwLock<LogBuffer>>;

/// One received frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Local time at which the frame was received
    pub received_at: DateTime<Local>,
    /// Raw frame bytes
    pub payload: Vec<u8>,
}

impl LogEntry {
    /// Render the entry for display
    pub fn format(&self, show_timestamp: bool) -> String {
        format_entry(self, show_timestamp)
    }
}

/// Render an entry as hex bytes, optionally prefixed with `[HH:MM:SS.mmm]`.
pub fn format_entry(entry: &LogEntry, show_timestamp: bool) -> String {
    let hex = codec::encode(&entry.payload);
    if show_timestamp {
        format!("[{}] {}", entry.received_at.format("%H:%M:%S%.3f"), hex)
    } else {
        hex
    }
}

/// Ordered buffer of received frames
#[derive(Debug, Default)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    max_entries: Option<usize>,
}

impl LogBuffer {
    /// Create an unbounded log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log that keeps at most `max_entries` entries (`None` = unbounded)
    pub fn with_capacity_limit(max_entries: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.map(|n| n.max(1)),
        }
    }

    /// Wrap a log in a [`SharedLog`] handle
    pub fn shared(self) -> SharedLog {
        Arc::new(RwLock::new(self))
    }

    /// Append a frame stamped with the current time
    pub fn append(&mut self, payload: Vec<u8>) {
        self.append_at(payload, Local::now());
    }

    /// Append a frame received at `received_at`.
    ///
    /// Stamps never go backwards: an earlier time than the last entry's is
    /// replaced by the last entry's time.
    pub fn append_at(&mut self, payload: Vec<u8>, received_at: DateTime<Local>) {
        let received_at = match self.entries.back() {
            Some(last) if received_at < last.received_at => last.received_at,
            _ => received_at,
        };

        if let Some(max) = self.max_entries {
            while self.entries.len() >= max {
                self.entries.pop_front();
            }
        }

        self.entries.push_back(LogEntry {
            received_at,
            payload,
        });
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Change the cap, evicting the oldest entries if needed
    pub fn set_capacity_limit(&mut self, max_entries: Option<usize>) {
        self.max_entries = max_entries.map(|n| n.max(1));
        if let Some(max) = self.max_entries {
            while self.entries.len() > max {
                self.entries.pop_front();
            }
        }
    }

    pub fn capacity_limit(&self) -> Option<usize> {
        self.max_entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in arrival order
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&LogEntry> {
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Render every entry, oldest first
    pub fn render(&self, show_timestamp: bool) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format_entry(e, show_timestamp))
            .collect()
    }
}
