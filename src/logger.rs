//! User-facing panel log.
//!
//! Every write appends a `[HH:MM:SS] message` line and moves the scroll
//! anchor to the newest entry. Retention is unbounded unless a capacity is
//! configured, in which case the oldest lines are dropped first.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
}

impl LogEntry {
    pub fn line(&self) -> String {
        format!("[{}] {}", self.timestamp, self.message)
    }
}

struct LogState {
    entries: VecDeque<LogEntry>,
    capacity: Option<usize>,
    scroll_to: Option<usize>,
    revision: u64,
}

/// Cheaply clonable handle; all clones append to the same log.
#[derive(Clone)]
pub struct Logger {
    state: Arc<Mutex<LogState>>,
}

impl Logger {
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            state: Arc::new(Mutex::new(LogState {
                entries: VecDeque::new(),
                capacity: capacity.filter(|cap| *cap > 0),
                scroll_to: None,
                revision: 0,
            })),
        }
    }

    pub fn log(&self, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
        };
        info!(target: "panel", "{}", entry.message);

        let mut state = self.lock();
        if let Some(capacity) = state.capacity {
            while state.entries.len() >= capacity {
                state.entries.pop_front();
            }
        }
        state.entries.push_back(entry);
        state.scroll_to = Some(state.entries.len() - 1);
        state.revision += 1;
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.scroll_to = None;
        state.revision += 1;
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().entries.iter().cloned().collect()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lock().entries.iter().map(LogEntry::line).collect()
    }

    /// Formatted lines together with the revision they were taken at.
    pub fn lines_with_revision(&self) -> (u64, Vec<String>) {
        let state = self.lock();
        (state.revision, state.entries.iter().map(LogEntry::line).collect())
    }

    /// Bumped on every write and clear.
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Index the display should be scrolled to (always the newest line).
    pub fn scroll_position(&self) -> Option<usize> {
        self.lock().scroll_to
    }

    fn lock(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}
