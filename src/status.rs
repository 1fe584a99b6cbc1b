use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

/// Default number of retained messages
pub const DEFAULT_CAPACITY: usize = 20;

/// Severity of a status message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

impl StatusKind {
    fn prefix(&self) -> &'static str {
        match self {
            StatusKind::Info => "[INFO]",
            StatusKind::Success => "[OK]",
            StatusKind::Error => "[FAIL]",
        }
    }
}

/// A user-visible message with the simulated time it was recorded at
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// Milliseconds of simulated time
    pub at_ms: u64,
    pub kind: StatusKind,
    pub message: String,
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.prefix(), self.message)
    }
}

/// Bounded status log, newest first
#[derive(Clone, Debug)]
pub struct StatusLog {
    capacity: usize,
    entries: VecDeque<StatusEntry>,
}

impl Default for StatusLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl StatusLog {
    pub fn new(capacity: usize) -> Self {
        StatusLog {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Record a message, dropping the oldest once full
    pub fn push(&mut self, at: Duration, kind: StatusKind, message: impl Into<String>) {
        self.entries.push_front(StatusEntry {
            at_ms: at.as_millis() as u64,
            kind,
            message: message.into(),
        });
        self.entries.truncate(self.capacity);
    }

    /// The most recent message
    pub fn current(&self) -> Option<&StatusEntry> {
        self.entries.front()
    }

    pub fn entries(&self) -> impl Iterator<Item = &StatusEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the retained entries, newest first
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }

    /// One-line count of retained messages by kind
    pub fn summary(&self) -> String {
        let mut info = 0;
        let mut success = 0;
        let mut error = 0;
        for entry in &self.entries {
            match entry.kind {
                StatusKind::Info => info += 1,
                StatusKind::Success => success += 1,
                StatusKind::Error => error += 1,
            }
        }
        format!(
            "{} messages ({} info, {} ok, {} failed)",
            self.entries.len(),
            info,
            success,
            error
        )
    }
}
